use std::collections::{BTreeMap, HashSet};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;

use crate::error::CredentialError;
use crate::format::{decode_decimal, encode_decimal, WirePublicKey};
use crate::traits::CredDefPublicKey;

/// Public key of a CL credential definition: `{n, S, Z, R}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClPublicKey {
    n: BigUint,
    s: BigUint,
    z: BigUint,
    r: BTreeMap<String, BigUint>,
}

impl ClPublicKey {
    pub(crate) fn new(n: BigUint, s: BigUint, z: BigUint, r: BTreeMap<String, BigUint>) -> Self {
        Self { n, s, z, r }
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Generator of the quadratic-residue subgroup.
    pub fn s(&self) -> &BigUint {
        &self.s
    }

    /// Generator bound to the holder's master secret.
    pub fn z(&self) -> &BigUint {
        &self.z
    }

    /// Per-attribute generators.
    pub fn r(&self) -> &BTreeMap<String, BigUint> {
        &self.r
    }

    /// Structural checks that need no secret: `n` odd, every generator in
    /// `[2, n)`, coprime to `n`, and pairwise distinct.
    pub fn validate(&self) -> Result<(), CredentialError> {
        if self.n.is_even() || self.n <= BigUint::from(3u32) {
            return Err(CredentialError::InvalidPublicKey(
                "modulus must be an odd integer greater than 3".into(),
            ));
        }
        if self.r.is_empty() {
            return Err(CredentialError::InvalidPublicKey(
                "no attribute generators".into(),
            ));
        }

        let two = BigUint::from(2u32);
        let mut seen = HashSet::with_capacity(self.r.len() + 2);
        let labelled = [("S", &self.s), ("Z", &self.z)]
            .into_iter()
            .chain(self.r.iter().map(|(k, v)| (k.as_str(), v)));
        for (label, value) in labelled {
            if *value < two || *value >= self.n {
                return Err(CredentialError::InvalidPublicKey(format!(
                    "{} is outside [2, n)",
                    label
                )));
            }
            if !value.gcd(&self.n).is_one() {
                return Err(CredentialError::InvalidPublicKey(format!(
                    "{} shares a factor with n",
                    label
                )));
            }
            if !seen.insert(value) {
                return Err(CredentialError::InvalidPublicKey(format!(
                    "{} repeats another generator",
                    label
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn to_wire(&self) -> WirePublicKey {
        WirePublicKey {
            n: encode_decimal(&self.n),
            s: encode_decimal(&self.s),
            z: encode_decimal(&self.z),
            r: self
                .r
                .iter()
                .map(|(k, v)| (k.clone(), encode_decimal(v)))
                .collect(),
        }
    }

    pub(crate) fn from_wire(wire: &WirePublicKey) -> Result<Self, CredentialError> {
        let mut r = BTreeMap::new();
        for (attr, value) in &wire.r {
            r.insert(attr.clone(), decode_decimal(&format!("R[{}]", attr), value)?);
        }
        Ok(Self {
            n: decode_decimal("n", &wire.n)?,
            s: decode_decimal("S", &wire.s)?,
            z: decode_decimal("Z", &wire.z)?,
            r,
        })
    }
}

impl CredDefPublicKey for ClPublicKey {
    fn modulus(&self) -> &BigUint {
        &self.n
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.r.keys().map(String::as_str).collect()
    }

    fn attribute_generator(&self, name: &str) -> Option<&BigUint> {
        self.r.get(name)
    }

    fn to_json(&self) -> Result<String, CredentialError> {
        serde_json::to_string(&self.to_wire())
            .map_err(|e| CredentialError::Serialization(e.to_string()))
    }
}
