//! Safe-prime pair generation and validation.
//!
//! The search dominates key-generation cost, so it only depends on a
//! caller-owned RNG and a [`GenerationBudget`]; callers can run the two
//! halves of a pair on separate workers.

use std::fmt;
use std::time::Instant;

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, ToPrimitive};
use rand::{CryptoRng, RngCore};

use cldef_core::KeyGenConfig;

use crate::budget::GenerationBudget;
use crate::error::CryptoError;
use crate::primality::{is_probable_prime, SMALL_PRIMES};

/// Two Sophie Germain primes `p'`, `q'` whose doubles plus one are prime.
///
/// `Debug` never prints the values.
#[derive(Clone, PartialEq, Eq)]
pub struct SafePrimePair {
    p_prime: BigUint,
    q_prime: BigUint,
}

impl SafePrimePair {
    /// Wrap a pair without checking it. See [`SafePrimeGenerator::check_pair`].
    pub fn new(p_prime: BigUint, q_prime: BigUint) -> Self {
        Self { p_prime, q_prime }
    }

    pub fn p_prime(&self) -> &BigUint {
        &self.p_prime
    }

    pub fn q_prime(&self) -> &BigUint {
        &self.q_prime
    }

    /// The safe prime `p = 2p' + 1`.
    pub fn p(&self) -> BigUint {
        safe_from_sophie_germain(&self.p_prime)
    }

    /// The safe prime `q = 2q' + 1`.
    pub fn q(&self) -> BigUint {
        safe_from_sophie_germain(&self.q_prime)
    }
}

impl fmt::Debug for SafePrimePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafePrimePair")
            .field("p_prime_bits", &self.p_prime.bits())
            .field("q_prime_bits", &self.q_prime.bits())
            .finish_non_exhaustive()
    }
}

fn safe_from_sophie_germain(x: &BigUint) -> BigUint {
    (x << 1u32) + BigUint::one()
}

/// Searches for, and validates, safe-prime pairs sized for one modulus.
#[derive(Debug, Clone)]
pub struct SafePrimeGenerator {
    prime_bits: usize,
    modulus_bits: usize,
    bit_tolerance: usize,
    rounds: u32,
    budget: GenerationBudget,
}

impl SafePrimeGenerator {
    /// Build a generator from a validated config. The config's timeout, if
    /// any, starts counting now.
    pub fn new(config: &KeyGenConfig) -> Result<Self, CryptoError> {
        config.validate()?;
        let mut budget = GenerationBudget::new(config.max_prime_attempts);
        if let Some(timeout) = config.timeout() {
            budget = budget.with_timeout(timeout);
        }
        Ok(Self {
            prime_bits: config.prime_bits(),
            modulus_bits: config.modulus_bits,
            bit_tolerance: config.bit_tolerance,
            rounds: config.primality_rounds,
            budget,
        })
    }

    /// Replace the attempt/time/cancellation budget.
    pub fn with_budget(mut self, budget: GenerationBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn budget(&self) -> &GenerationBudget {
        &self.budget
    }

    /// Bit-length of each generated `p'`.
    pub fn prime_bits(&self) -> usize {
        self.prime_bits
    }

    /// Find one Sophie Germain prime `p'` of [`Self::prime_bits`] bits.
    pub fn generate_safe_prime<R>(&self, rng: &mut R) -> Result<BigUint, CryptoError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let started = Instant::now();
        for attempt in 1..=self.budget.max_attempts {
            if let Err(e) = self.budget.check() {
                tracing::warn!(
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "safe prime search stopped"
                );
                return Err(e);
            }

            let candidate = self.sample_candidate(rng);
            if !survives_sieve(&candidate) {
                continue;
            }
            let safe = safe_from_sophie_germain(&candidate);
            // one cheap round on both before paying for the full test
            if !is_probable_prime(&candidate, 1, rng) || !is_probable_prime(&safe, 1, rng) {
                continue;
            }
            if is_probable_prime(&candidate, self.rounds, rng)
                && is_probable_prime(&safe, self.rounds, rng)
            {
                tracing::debug!(
                    bits = self.prime_bits,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "safe prime found"
                );
                return Ok(candidate);
            }
        }

        tracing::warn!(
            bits = self.prime_bits,
            max_attempts = self.budget.max_attempts,
            "safe prime attempt budget exhausted"
        );
        Err(CryptoError::PrimeGeneration(format!(
            "no {}-bit safe prime found in {} attempts",
            self.prime_bits, self.budget.max_attempts
        )))
    }

    /// Generate a pair of distinct Sophie Germain primes.
    pub fn generate<R>(&self, rng: &mut R) -> Result<SafePrimePair, CryptoError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let p_prime = self.generate_safe_prime(rng)?;
        loop {
            let q_prime = self.generate_safe_prime(rng)?;
            if q_prime != p_prime {
                return Ok(SafePrimePair::new(p_prime, q_prime));
            }
        }
    }

    /// Whether a caller-supplied pair is usable for this modulus size.
    pub fn validate<R>(&self, p_prime: &BigUint, q_prime: &BigUint, rng: &mut R) -> bool
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        self.check_pair(p_prime, q_prime, rng).is_ok()
    }

    /// Like [`Self::validate`], reporting why a pair is rejected.
    pub fn check_pair<R>(
        &self,
        p_prime: &BigUint,
        q_prime: &BigUint,
        rng: &mut R,
    ) -> Result<(), CryptoError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        if p_prime == q_prime {
            return Err(CryptoError::InvalidPrimePair(
                "p_prime and q_prime must be distinct".into(),
            ));
        }
        for (label, x) in [("p_prime", p_prime), ("q_prime", q_prime)] {
            if !is_probable_prime(x, self.rounds, rng) {
                return Err(CryptoError::InvalidPrimePair(format!("{} is not prime", label)));
            }
            if !is_probable_prime(&safe_from_sophie_germain(x), self.rounds, rng) {
                return Err(CryptoError::InvalidPrimePair(format!(
                    "2*{}+1 is not prime",
                    label
                )));
            }
        }
        let n = safe_from_sophie_germain(p_prime) * safe_from_sophie_germain(q_prime);
        let bits = n.bits();
        let floor = self.modulus_bits.saturating_sub(self.bit_tolerance);
        if bits < floor as u64 || bits > self.modulus_bits as u64 {
            return Err(CryptoError::InvalidPrimePair(format!(
                "modulus has {} bits, expected {}..={}",
                bits, floor, self.modulus_bits
            )));
        }
        Ok(())
    }

    /// Random odd candidate with its two top bits set, so that
    /// `(2p'+1)(2q'+1)` always has exactly `modulus_bits` bits.
    fn sample_candidate<R>(&self, rng: &mut R) -> BigUint
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let bits = self.prime_bits as u64;
        let mut candidate = rng.gen_biguint(bits - 2);
        candidate |= BigUint::from(3u32) << (bits - 2);
        candidate |= BigUint::one();
        candidate
    }
}

/// Reject `c` when `c` or `2c + 1` has a small odd factor.
///
/// `2c + 1 ≡ 0 (mod p)` exactly when `c ≡ (p - 1) / 2 (mod p)`.
fn survives_sieve(candidate: &BigUint) -> bool {
    SMALL_PRIMES[1..].iter().all(|&p| match (candidate % p).to_u32() {
        Some(r) => r != 0 && r != (p - 1) / 2,
        None => false,
    })
}
