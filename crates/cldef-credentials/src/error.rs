use cldef_core::CoreError;
use cldef_crypto::CryptoError;

/// Credential-definition errors.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Secret material requested from a public-only definition.
    #[error("secret key unavailable: definition holds public material only")]
    SecretKeyUnavailable,

    #[error("unsupported serialization format: {0}")]
    UnsupportedFormat(i32),

    /// Malformed or truncated serialized input.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("definition already registered: {0}")]
    DuplicateDefinition(String),

    #[error("definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("generation worker failed: {0}")]
    WorkerFailed(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("config error: {0}")]
    Config(#[from] CoreError),
}

impl CredentialError {
    /// Whether re-running generation can succeed without changing inputs.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Crypto(e) => e.is_retryable(),
            _ => false,
        }
    }
}
