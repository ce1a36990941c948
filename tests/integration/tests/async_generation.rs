//! Integration test: off-thread generation through `generate_definition`.

use std::time::Duration;

use cldef_core::KeyGenConfig;
use cldef_credentials::{
    generate_definition, ClCredentialDefinition, CredDef, CredentialError, DefinitionState,
    SerFmt,
};
use cldef_crypto::{CancellationFlag, CryptoError};
use cldef_integration_tests::*;

#[tokio::test]
async fn test_async_generation_matches_sync() {
    let async_def = generate_definition(transcript_builder()).await.unwrap();
    let sync_def = transcript_definition();
    assert_eq!(async_def.state(), DefinitionState::Generated);
    assert_eq!(async_def.public_key().n(), sync_def.public_key().n());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_generations() {
    let config = KeyGenConfig::with_modulus_bits(128);
    let builders = ["1.0", "1.1", "1.2"].map(|version| {
        let schema =
            cldef_credentials::CredentialSchema::new("Transcript", version, ["gpa"]).unwrap();
        ClCredentialDefinition::builder(schema).config(config.clone())
    });
    let handles: Vec<_> = builders
        .into_iter()
        .map(|b| tokio::spawn(generate_definition(b)))
        .collect();

    let mut moduli = Vec::new();
    for handle in handles {
        let def = handle.await.unwrap().unwrap();
        assert_eq!(def.public_key().n().bits(), 128);
        moduli.push(def.public_key().n().clone());
    }
    moduli.sort();
    moduli.dedup();
    assert_eq!(moduli.len(), 3);
}

#[tokio::test]
async fn test_cancel_from_another_task() {
    let cancel = CancellationFlag::new();
    let builder = ClCredentialDefinition::builder(transcript_schema())
        .config(KeyGenConfig::with_modulus_bits(2048))
        .cancellation(cancel.clone());
    let generation = tokio::spawn(generate_definition(builder));

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    let result = generation.await.unwrap();
    assert!(matches!(
        result,
        Err(CredentialError::Crypto(CryptoError::Cancelled))
    ));
}

#[tokio::test]
async fn test_timeout_reports_prime_generation() {
    let config = KeyGenConfig {
        timeout_secs: Some(0),
        ..KeyGenConfig::with_modulus_bits(2048)
    };
    let builder = ClCredentialDefinition::builder(transcript_schema()).config(config);
    let err = generate_definition(builder).await.unwrap_err();
    assert!(matches!(
        err,
        CredentialError::Crypto(CryptoError::PrimeGeneration(_))
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_async_result_publishes() {
    let def = generate_definition(transcript_builder()).await.unwrap();
    let public = def.get(SerFmt::Public).unwrap();
    let loaded = ClCredentialDefinition::from_json(&public).unwrap();
    assert_eq!(loaded.public_key(), def.public_key());
}
