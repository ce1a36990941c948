//! Composite modulus `n = (2p'+1)(2q'+1)` and the issuer's secret factorization.

use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use rand::{CryptoRng, RngCore};

use crate::error::CryptoError;
use crate::primality::is_probable_prime;
use crate::safe_prime::SafePrimePair;

/// The public RSA-style modulus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Modulus(BigUint);

impl Modulus {
    pub fn value(&self) -> &BigUint {
        &self.0
    }

    pub fn bits(&self) -> u64 {
        self.0.bits()
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }
}

/// The factorization of the modulus, held only by the issuer.
///
/// Owns the [`SafePrimePair`] it was built from.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    pair: SafePrimePair,
}

impl SecretKey {
    pub fn p_prime(&self) -> &BigUint {
        self.pair.p_prime()
    }

    pub fn q_prime(&self) -> &BigUint {
        self.pair.q_prime()
    }

    /// `p = 2p' + 1`
    pub fn p(&self) -> BigUint {
        self.pair.p()
    }

    /// `q = 2q' + 1`
    pub fn q(&self) -> BigUint {
        self.pair.q()
    }

    /// Order `p'q'` of the quadratic-residue subgroup of `Z*_n`.
    pub fn group_order(&self) -> BigUint {
        self.pair.p_prime() * self.pair.q_prime()
    }

    /// Recompute `n` from the factors.
    pub fn modulus(&self) -> BigUint {
        self.p() * self.q()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Turn a safe-prime pair into `(n, secret key)`.
///
/// Supplied pairs may not have gone through the generator, so `p` and `q`
/// are re-tested here.
pub fn build<R>(
    pair: SafePrimePair,
    rounds: u32,
    rng: &mut R,
) -> Result<(Modulus, SecretKey), CryptoError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    let p = pair.p();
    let q = pair.q();
    if p == q {
        return Err(CryptoError::InvalidPrimePair("p and q must differ".into()));
    }
    if !is_probable_prime(&p, rounds, rng) {
        return Err(CryptoError::InvalidPrimePair(
            "p = 2p'+1 is not prime".into(),
        ));
    }
    if !is_probable_prime(&q, rounds, rng) {
        return Err(CryptoError::InvalidPrimePair(
            "q = 2q'+1 is not prime".into(),
        ));
    }

    // p-1 = 2p' and q-1 = 2q', so anything but 2 means p' and q' share a factor
    let gcd = (&p - 1u32).gcd(&(&q - 1u32));
    if gcd != BigUint::from(2u32) {
        return Err(CryptoError::InvalidPrimePair(format!(
            "gcd(p-1, q-1) = {}, expected 2",
            gcd
        )));
    }

    let n = &p * &q;
    tracing::debug!(bits = n.bits(), "modulus built");
    Ok((Modulus(n), SecretKey { pair }))
}
