//! Per-attribute generators `R[attr] = S^{x_attr}` and the master-secret
//! generator `Z = S^{x_z}`.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};

use crate::error::CryptoError;
use crate::modulus::SecretKey;

/// Reject an empty attribute list or one with a repeated name.
///
/// Names are compared byte-for-byte: `"Name"` and `"name"` are different
/// attributes.
pub fn check_attribute_names<S: AsRef<str>>(names: &[S]) -> Result<(), CryptoError> {
    if names.is_empty() {
        return Err(CryptoError::AttributeDerivation(
            "attribute list is empty".into(),
        ));
    }
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if !seen.insert(name.as_ref()) {
            return Err(CryptoError::AttributeDerivation(format!(
                "duplicate attribute name: {}",
                name.as_ref()
            )));
        }
    }
    Ok(())
}

/// Derive `Z` and one `R` entry per attribute from the base generator `s`.
///
/// Exponents are reduced modulo the subgroup order `p'q'` from `secret`
/// and dropped once each power is computed. Values colliding with `1`,
/// `s` or an earlier output are resampled, up to `max_resamples` times per
/// value.
pub fn derive_keys<S, R>(
    s: &BigUint,
    n: &BigUint,
    secret: &SecretKey,
    attr_names: &[S],
    max_resamples: u32,
    rng: &mut R,
) -> Result<(BigUint, BTreeMap<String, BigUint>), CryptoError>
where
    S: AsRef<str>,
    R: RngCore + CryptoRng + ?Sized,
{
    check_attribute_names(attr_names)?;

    let one = BigUint::one();
    let two = BigUint::from(2u32);
    if *s < two || s >= n {
        return Err(CryptoError::GeneratorSelection(
            "base generator is outside [2, n)".into(),
        ));
    }

    let order = secret.group_order();
    let upper = n - 1u32;
    let mut seen: HashSet<BigUint> = HashSet::from([one, s.clone()]);

    let mut draw = |label: &str| -> Result<BigUint, CryptoError> {
        for _ in 0..max_resamples {
            let e = rng.gen_biguint_range(&two, &upper) % &order;
            if e < two {
                continue;
            }
            let value = s.modpow(&e, n);
            if seen.insert(value.clone()) {
                return Ok(value);
            }
            tracing::debug!(attribute = label, "derived generator collided, resampling");
        }
        Err(CryptoError::AttributeDerivation(format!(
            "no distinct generator for {} after {} resamples",
            label, max_resamples
        )))
    };

    let z = draw("master secret")?;

    let sorted: BTreeSet<&str> = attr_names.iter().map(|a| a.as_ref()).collect();
    let mut r = BTreeMap::new();
    for name in sorted {
        let value = draw(name)?;
        r.insert(name.to_string(), value);
    }

    Ok((z, r))
}
