//! Serialization formats and the JSON wire layout.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use cldef_core::IssuerEndpoint;

use crate::error::CredentialError;

/// Which view of a definition to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerFmt {
    /// Name, version, schema, and public key. Safe to publish.
    Public,
    /// Everything in `Public` plus the secret key. Local storage only.
    Full,
}

impl SerFmt {
    /// Integer identifier used by callers that pass formats as numbers.
    pub fn to_i32(self) -> i32 {
        match self {
            Self::Public => 1,
            Self::Full => 2,
        }
    }

    pub fn includes_secret(self) -> bool {
        match self {
            Self::Public => false,
            Self::Full => true,
        }
    }
}

impl TryFrom<i32> for SerFmt {
    type Error = CredentialError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Public),
            2 => Ok(Self::Full),
            other => Err(CredentialError::UnsupportedFormat(other)),
        }
    }
}

impl fmt::Display for SerFmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "PUBLIC"),
            Self::Full => write!(f, "FULL"),
        }
    }
}

/// Top-level JSON object for both formats.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct WireDefinition {
    pub name: String,
    pub version: String,
    pub schema: Vec<String>,
    pub public_key: WirePublicKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_endpoint: Option<IssuerEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<WireSecretKey>,
}

/// Public key with integers as decimal strings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct WirePublicKey {
    pub n: String,
    #[serde(rename = "S")]
    pub s: String,
    #[serde(rename = "Z")]
    pub z: String,
    #[serde(rename = "R")]
    pub r: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(deny_unknown_fields)]
pub(crate) struct WireSecretKey {
    pub p_prime: String,
    pub q_prime: String,
}

impl fmt::Debug for WireSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WireSecretKey(<redacted>)")
    }
}

pub(crate) fn encode_decimal(value: &BigUint) -> String {
    value.to_str_radix(10)
}

/// Strict decimal parsing: ASCII digits only, no sign, no separators, no
/// leading zeros.
pub(crate) fn decode_decimal(field: &str, value: &str) -> Result<BigUint, CredentialError> {
    let malformed = || CredentialError::Deserialization(format!("{} is not a decimal integer", field));
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    if value.len() > 1 && value.starts_with('0') {
        return Err(CredentialError::Deserialization(format!(
            "{} has leading zeros",
            field
        )));
    }
    BigUint::from_str(value).map_err(|_| malformed())
}
