//! Cldef Crypto: number theory behind CL credential definitions.
//!
//! Safe primes, the composite modulus, quadratic-residue generators and
//! per-attribute key derivation.

pub mod attribute_keys;
pub mod budget;
pub mod error;
pub mod generator;
pub mod hashing;
pub mod modulus;
pub mod primality;
pub mod safe_prime;

pub use attribute_keys::{check_attribute_names, derive_keys};
pub use budget::{CancellationFlag, GenerationBudget};
pub use error::CryptoError;
pub use generator::{has_full_order, is_quadratic_residue, select_generator};
pub use hashing::{fingerprint, hash};
pub use modulus::{build as build_modulus, Modulus, SecretKey};
pub use primality::is_probable_prime;
pub use safe_prime::{SafePrimeGenerator, SafePrimePair};
