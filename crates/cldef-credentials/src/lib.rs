//! Cldef Credentials: CL credential definitions bound to attribute schemas.
//!
//! Generation, PUBLIC/FULL encoding, off-thread workers and a registry.

pub mod definition;
pub mod error;
pub mod format;
pub mod public_key;
pub mod registry;
pub mod schema;
pub mod traits;
pub mod worker;

pub use definition::{ClCredentialDefinition, DefinitionBuilder};
pub use error::CredentialError;
pub use format::SerFmt;
pub use public_key::ClPublicKey;
pub use registry::DefinitionRegistry;
pub use schema::CredentialSchema;
pub use traits::{CredDef, CredDefPublicKey, DefinitionState};
pub use worker::generate_definition;
