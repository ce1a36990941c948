//! Scheme-independent capability interfaces.
//!
//! Callers program against these traits; each supported signature scheme
//! provides one concrete definition type and one public-key type.

use std::fmt;

use num_bigint::BigUint;

use cldef_crypto::{fingerprint, SecretKey};

use crate::error::CredentialError;
use crate::format::SerFmt;

/// Lifecycle state of a credential definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionState {
    /// Freshly generated (or loaded from FULL). Holds secret and public material.
    Generated,
    /// Loaded from a PUBLIC payload. Holds public material only.
    PublicOnly,
}

impl fmt::Display for DefinitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "Generated"),
            Self::PublicOnly => write!(f, "PublicOnly"),
        }
    }
}

/// Public verification key of a credential definition.
pub trait CredDefPublicKey: fmt::Debug + Send + Sync {
    /// The composite modulus `n`.
    fn modulus(&self) -> &BigUint;

    /// Attribute names bound into the key, sorted.
    fn attribute_names(&self) -> Vec<&str>;

    /// Generator bound to one attribute.
    fn attribute_generator(&self, name: &str) -> Option<&BigUint>;

    /// Canonical JSON encoding of the key alone.
    fn to_json(&self) -> Result<String, CredentialError>;

    /// Hex BLAKE3 digest of [`Self::to_json`].
    fn fingerprint(&self) -> Result<String, CredentialError> {
        Ok(fingerprint(self.to_json()?.as_bytes()))
    }
}

/// An issuer's key pair bound to a named, versioned attribute schema.
pub trait CredDef: Send + Sync {
    type PublicKey: CredDefPublicKey;

    fn name(&self) -> &str;

    fn version(&self) -> &str;

    fn state(&self) -> DefinitionState;

    /// Always available.
    fn public_key(&self) -> &Self::PublicKey;

    /// Fails with `SecretKeyUnavailable` in the `PublicOnly` state.
    fn secret_key(&self) -> Result<&SecretKey, CredentialError>;

    /// The secret key as a JSON object. Fails like [`Self::secret_key`].
    fn serialized_secret_key(&self) -> Result<String, CredentialError>;

    /// Serialize the definition in the selected format.
    fn get(&self, format: SerFmt) -> Result<String, CredentialError>;
}
