//! Cooperative cancellation and time/attempt budgets for key generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::CryptoError;

/// A shared flag that asks a running generation to stop.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Limits applied to one safe-prime search.
#[derive(Debug, Clone)]
pub struct GenerationBudget {
    /// Maximum number of candidates sampled.
    pub max_attempts: u64,
    /// Hard wall-clock deadline.
    pub deadline: Option<Instant>,
    /// Cooperative cancellation.
    pub cancel: CancellationFlag,
}

impl GenerationBudget {
    pub fn new(max_attempts: u64) -> Self {
        Self {
            max_attempts,
            deadline: None,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fails once the run was cancelled or the deadline has passed.
    pub fn check(&self) -> Result<(), CryptoError> {
        if self.cancel.is_cancelled() {
            return Err(CryptoError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(CryptoError::PrimeGeneration(
                    "generation deadline exceeded".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_budget_passes() {
        let budget = GenerationBudget::new(10);
        assert!(budget.check().is_ok());
    }

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let flag = CancellationFlag::new();
        let budget = GenerationBudget::new(10).with_cancel(flag.clone());
        assert!(!flag.is_cancelled());
        flag.cancel();
        assert!(matches!(budget.check(), Err(CryptoError::Cancelled)));
    }

    #[test]
    fn test_expired_deadline() {
        let budget = GenerationBudget::new(10).with_timeout(Duration::ZERO);
        assert!(matches!(
            budget.check(),
            Err(CryptoError::PrimeGeneration(_))
        ));
    }

    #[test]
    fn test_cancel_wins_over_deadline() {
        let flag = CancellationFlag::new();
        flag.cancel();
        let budget = GenerationBudget::new(10)
            .with_timeout(Duration::ZERO)
            .with_cancel(flag);
        assert!(matches!(budget.check(), Err(CryptoError::Cancelled)));
    }
}
