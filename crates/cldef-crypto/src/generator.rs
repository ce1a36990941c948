//! Quadratic-residue generators modulo `n`.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, RngCore};

use crate::error::CryptoError;
use crate::modulus::SecretKey;

/// Pick `S = r^2 mod n` for random `r` in `[2, n-1)`.
///
/// Resamples when `S` is 0, 1 or shares a factor with `n`; gives up with
/// [`CryptoError::GeneratorSelection`] after `max_resamples` tries.
pub fn select_generator<R>(
    n: &BigUint,
    max_resamples: u32,
    rng: &mut R,
) -> Result<BigUint, CryptoError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let two = BigUint::from(2u32);
    let upper = n - 1u32;
    if upper <= two {
        return Err(CryptoError::GeneratorSelection(format!(
            "modulus {} is too small",
            n
        )));
    }

    for _ in 0..max_resamples {
        let r = rng.gen_biguint_range(&two, &upper);
        let s = (&r * &r) % n;
        if s <= BigUint::one() || !s.gcd(n).is_one() {
            continue;
        }
        return Ok(s);
    }

    Err(CryptoError::GeneratorSelection(format!(
        "no usable generator after {} resamples",
        max_resamples
    )))
}

/// Euler's criterion modulo both factors: `v` is a quadratic residue mod
/// `n` iff `v^{p'} ≡ 1 (mod p)` and `v^{q'} ≡ 1 (mod q)`.
pub fn is_quadratic_residue(v: &BigUint, secret: &SecretKey) -> bool {
    let p = secret.p();
    let q = secret.q();
    v.modpow(secret.p_prime(), &p).is_one() && v.modpow(secret.q_prime(), &q).is_one()
}

/// Whether a quadratic residue `s` generates the whole subgroup of order
/// `p'q'`, i.e. neither `s^{p'}` nor `s^{q'}` is 1 mod `n`.
pub fn has_full_order(s: &BigUint, secret: &SecretKey) -> bool {
    let n = secret.modulus();
    !s.modpow(secret.p_prime(), &n).is_one() && !s.modpow(secret.q_prime(), &n).is_one()
}
