//! Key-generation configuration loading and validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Smallest modulus accepted by [`KeyGenConfig::validate`].
pub const MIN_MODULUS_BITS: usize = 64;

/// Parameters for credential-definition key generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyGenConfig {
    /// Bit-length of the composite modulus `n`.
    #[serde(default = "default_modulus_bits")]
    pub modulus_bits: usize,
    /// How many bits `n` may fall short of `modulus_bits`.
    #[serde(default = "default_bit_tolerance")]
    pub bit_tolerance: usize,
    /// Miller-Rabin rounds per primality test. Each round errs with
    /// probability at most 1/4.
    #[serde(default = "default_primality_rounds")]
    pub primality_rounds: u32,
    /// Candidate budget for each safe prime.
    #[serde(default = "default_max_prime_attempts")]
    pub max_prime_attempts: u64,
    /// Resample budget for generator selection and key derivation.
    #[serde(default = "default_max_generator_resamples")]
    pub max_generator_resamples: u32,
    /// Hard timeout for a whole generation run, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_modulus_bits() -> usize {
    2048
}
fn default_bit_tolerance() -> usize {
    1
}
fn default_primality_rounds() -> u32 {
    64
}
fn default_max_prime_attempts() -> u64 {
    1_000_000
}
fn default_max_generator_resamples() -> u32 {
    64
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            modulus_bits: default_modulus_bits(),
            bit_tolerance: default_bit_tolerance(),
            primality_rounds: default_primality_rounds(),
            max_prime_attempts: default_max_prime_attempts(),
            max_generator_resamples: default_max_generator_resamples(),
            timeout_secs: None,
        }
    }
}

impl KeyGenConfig {
    /// Config with a given modulus size and defaults elsewhere.
    pub fn with_modulus_bits(modulus_bits: usize) -> Self {
        Self {
            modulus_bits,
            ..Default::default()
        }
    }

    /// Bit-length of each Sophie Germain prime `p'`, `q'`.
    pub fn prime_bits(&self) -> usize {
        self.modulus_bits / 2 - 1
    }

    /// The configured hard timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Whether a modulus of `bits` bits satisfies the security parameter.
    pub fn accepts_modulus_bits(&self, bits: u64) -> bool {
        let target = self.modulus_bits as u64;
        let floor = target.saturating_sub(self.bit_tolerance as u64);
        bits >= floor && bits <= target
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.modulus_bits < MIN_MODULUS_BITS {
            return Err(CoreError::InvalidConfig(format!(
                "modulus_bits must be at least {}, got {}",
                MIN_MODULUS_BITS, self.modulus_bits
            )));
        }
        if self.modulus_bits % 2 != 0 {
            return Err(CoreError::InvalidConfig(format!(
                "modulus_bits must be even, got {}",
                self.modulus_bits
            )));
        }
        if self.primality_rounds == 0 {
            return Err(CoreError::InvalidConfig(
                "primality_rounds must be non-zero".into(),
            ));
        }
        if self.max_prime_attempts == 0 {
            return Err(CoreError::InvalidConfig(
                "max_prime_attempts must be non-zero".into(),
            ));
        }
        if self.max_generator_resamples == 0 {
            return Err(CoreError::InvalidConfig(
                "max_generator_resamples must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Load config from a TOML file, falling back to defaults for missing
    /// fields (or for a missing file). The result is validated.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str(&contents)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}
