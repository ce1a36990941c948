//! Off-thread generation for async callers.
//!
//! Prime search is CPU-bound and can run for minutes at production sizes,
//! so it never runs on the async executor. The two safe primes are searched
//! on separate blocking threads and the rest of the build follows on a
//! third.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::task::{JoinError, JoinHandle};

use cldef_crypto::{CancellationFlag, CryptoError, SafePrimeGenerator, SafePrimePair};

use crate::definition::{ClCredentialDefinition, DefinitionBuilder};
use crate::error::CredentialError;

/// Cancels the shared flag when the generation future is dropped early.
struct CancelOnDrop {
    flag: CancellationFlag,
    armed: bool,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.flag.cancel();
        }
    }
}

/// Build a definition on blocking worker threads.
///
/// Honours the builder's configured timeout: on expiry the blocking work is
/// cancelled and the call fails with `PrimeGeneration`. Dropping the
/// returned future cancels the work too. No partially built definition is
/// ever observable.
pub async fn generate_definition(
    builder: DefinitionBuilder,
) -> Result<ClCredentialDefinition, CredentialError> {
    builder.key_config().validate()?;
    let cancel = builder.cancel_flag().clone();
    let timeout = builder.key_config().timeout();
    let mut guard = CancelOnDrop {
        flag: cancel.clone(),
        armed: true,
    };

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, run(builder)).await {
            Ok(result) => result,
            Err(_) => {
                cancel.cancel();
                tracing::warn!(
                    timeout_secs = limit.as_secs(),
                    "credential definition generation timed out"
                );
                Err(CryptoError::PrimeGeneration(format!(
                    "generation timed out after {}s",
                    limit.as_secs()
                ))
                .into())
            }
        },
        None => run(builder).await,
    };

    guard.armed = false;
    result
}

async fn run(builder: DefinitionBuilder) -> Result<ClCredentialDefinition, CredentialError> {
    if builder.has_supplied_primes() {
        return flatten(tokio::task::spawn_blocking(move || builder.build()).await);
    }

    let generator = builder.prime_generator()?;
    let cancel = builder.cancel_flag().clone();
    let search = |generator: SafePrimeGenerator| -> JoinHandle<Result<BigUint, CryptoError>> {
        tokio::task::spawn_blocking(move || generator.generate_safe_prime(&mut StdRng::from_entropy()))
    };

    let p_search = search(generator.clone());
    let q_search = search(generator.clone());
    let searched = tokio::try_join!(async { flatten(p_search.await) }, async {
        flatten(q_search.await)
    });
    let (p_prime, mut q_prime) = match searched {
        Ok(pair) => pair,
        Err(e) => {
            // stop the other search
            cancel.cancel();
            return Err(e);
        }
    };
    while q_prime == p_prime {
        q_prime = flatten(search(generator.clone()).await)?;
    }
    tracing::debug!(bits = generator.prime_bits(), "safe prime pair found");

    let budget = generator.budget().clone();
    flatten(
        tokio::task::spawn_blocking(move || {
            builder.assemble(
                SafePrimePair::new(p_prime, q_prime),
                &budget,
                &mut StdRng::from_entropy(),
            )
        })
        .await,
    )
}

fn flatten<T, E>(joined: Result<Result<T, E>, JoinError>) -> Result<T, CredentialError>
where
    E: Into<CredentialError>,
{
    joined
        .map_err(|e| CredentialError::WorkerFailed(e.to_string()))?
        .map_err(Into::into)
}
