//! Cldef Core: configuration, shared types and errors for the
//! credential-definition key generator.

pub mod config;
pub mod error;
pub mod types;

pub use config::{KeyGenConfig, MIN_MODULUS_BITS};
pub use error::CoreError;
pub use types::IssuerEndpoint;
