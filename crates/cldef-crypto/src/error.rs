/// Errors raised while building credential-definition key material.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// No safe prime found within the attempt or time budget. Retryable.
    #[error("prime generation failed: {0}")]
    PrimeGeneration(String),

    #[error("generation cancelled")]
    Cancelled,

    /// Caller-supplied primes are unusable. Supply a different pair.
    #[error("invalid prime pair: {0}")]
    InvalidPrimePair(String),

    /// Degenerate group. Points at a broken environment or configuration.
    #[error("generator selection failed: {0}")]
    GeneratorSelection(String),

    /// Empty or duplicate attribute names.
    #[error("attribute derivation failed: {0}")]
    AttributeDerivation(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] cldef_core::CoreError),
}

impl CryptoError {
    /// Whether re-running generation can succeed without changing inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PrimeGeneration(_) | Self::Cancelled)
    }
}
