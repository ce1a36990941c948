//! Integration test: generate, inspect, publish and reload a definition
//! across cldef-core, cldef-crypto and cldef-credentials.

use std::collections::HashSet;

use cldef_core::{IssuerEndpoint, KeyGenConfig};
use cldef_credentials::{
    ClCredentialDefinition, CredDef, CredDefPublicKey, CredentialError, CredentialSchema,
    DefinitionRegistry, DefinitionState, SerFmt,
};
use cldef_crypto::{is_probable_prime, is_quadratic_residue, CryptoError};
use cldef_integration_tests::*;
use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;

// =========================================================================
// Issuer side: generation
// =========================================================================

#[test]
fn test_transcript_with_supplied_primes() {
    let def = transcript_definition();
    assert_eq!(def.state(), DefinitionState::Generated);
    assert_eq!(def.name(), "Transcript");
    assert_eq!(def.version(), "1.0");

    let pk = def.public_key();
    let p = big(SG_127[0]) * 2u32 + 1u32;
    let q = big(SG_127[1]) * 2u32 + 1u32;
    assert_eq!(pk.n(), &(p * q));
    assert_eq!(pk.modulus().bits(), 256);
    assert_eq!(pk.attribute_names(), vec!["gpa", "student_name"]);
    assert!(pk.attribute_generator("gpa").is_some());
    assert!(pk.attribute_generator("age").is_none());

    let sk = def.secret_key().expect("generated definition holds the secret");
    let mut values: Vec<&BigUint> = vec![pk.s(), pk.z()];
    values.extend(pk.r().values());
    for v in &values {
        assert!(is_quadratic_residue(v, sk));
    }
    assert_eq!(values.iter().collect::<HashSet<_>>().len(), values.len());
}

#[test]
fn test_same_primes_reproduce_modulus() {
    let a = transcript_definition();
    let b = transcript_definition();
    assert_eq!(a.public_key().n(), b.public_key().n());
}

#[test]
fn test_fresh_primes_give_fresh_moduli() {
    let build = || {
        ClCredentialDefinition::builder(transcript_schema())
            .config(KeyGenConfig::with_modulus_bits(128))
            .build()
            .expect("generation at 128 bits succeeds")
    };
    let a = build();
    let b = build();
    assert_ne!(a.public_key().n(), b.public_key().n());

    for def in [&a, &b] {
        let n = def.public_key().n();
        assert_eq!(n.bits(), 128);
        assert!(n.bit(0), "modulus must be odd");
        let sk = def.secret_key().unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(is_probable_prime(&sk.p(), 32, &mut rng));
        assert!(is_probable_prime(&sk.q(), 32, &mut rng));
    }
}

#[test]
fn test_larger_modulus() {
    let def = ClCredentialDefinition::builder(transcript_schema())
        .primes(big(SG_255[0]), big(SG_255[1]))
        .config(KeyGenConfig::with_modulus_bits(512))
        .build()
        .unwrap();
    assert_eq!(def.public_key().n().bits(), 512);
}

#[test]
fn test_schema_validated_before_primes() {
    let empty = CredentialSchema::new("Transcript", "1.0", Vec::<String>::new());
    assert!(matches!(
        empty,
        Err(CredentialError::Crypto(CryptoError::AttributeDerivation(_)))
    ));
    let duplicate = CredentialSchema::new("Transcript", "1.0", ["gpa", "gpa"]);
    assert!(matches!(
        duplicate,
        Err(CredentialError::Crypto(CryptoError::AttributeDerivation(_)))
    ));
    // exact comparison: differently cased names are distinct attributes
    assert!(CredentialSchema::new("Transcript", "1.0", ["gpa", "GPA"]).is_ok());
}

#[test]
fn test_bad_supplied_primes() {
    let not_safe = ClCredentialDefinition::builder(transcript_schema())
        .primes(big(NOT_SAFE_127), big(SG_127[1]))
        .config(KeyGenConfig::with_modulus_bits(256))
        .build();
    assert!(matches!(
        not_safe,
        Err(CredentialError::Crypto(CryptoError::InvalidPrimePair(_)))
    ));

    let wrong_size = ClCredentialDefinition::builder(transcript_schema())
        .primes(big(SG_63[0]), big(SG_63[1]))
        .config(KeyGenConfig::with_modulus_bits(256))
        .build();
    assert!(matches!(
        wrong_size,
        Err(CredentialError::Crypto(CryptoError::InvalidPrimePair(_)))
    ));
}

#[test]
fn test_attempt_budget_exhausted() {
    let config = KeyGenConfig {
        max_prime_attempts: 1,
        ..KeyGenConfig::with_modulus_bits(2048)
    };
    let result = ClCredentialDefinition::builder(transcript_schema())
        .config(config)
        .build();
    // a random 1023-bit candidate is almost never a safe prime
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        CredentialError::Crypto(CryptoError::PrimeGeneration(_))
    ));
    assert!(err.is_retryable());
}

// =========================================================================
// Publication and reload
// =========================================================================

#[test]
fn test_publish_and_reload_public() {
    let def = transcript_definition();
    let public = def.get(SerFmt::Public).unwrap();
    assert!(!public.contains("secretKey"));
    assert!(!public.contains(SG_127[0]));

    let loaded = ClCredentialDefinition::from_json(&public).unwrap();
    assert_eq!(loaded.state(), DefinitionState::PublicOnly);
    assert_eq!(loaded.public_key(), def.public_key());
    assert_eq!(loaded.get(SerFmt::Public).unwrap(), public);
    assert!(matches!(
        loaded.serialized_secret_key(),
        Err(CredentialError::SecretKeyUnavailable)
    ));
    assert!(matches!(
        loaded.get(SerFmt::Full),
        Err(CredentialError::SecretKeyUnavailable)
    ));
}

#[test]
fn test_full_backup_restores_issuer() {
    let def = transcript_definition();
    let full = def.get(SerFmt::Full).unwrap();
    let restored = ClCredentialDefinition::from_json(&full).unwrap();
    assert_eq!(restored, def);
    assert_eq!(
        restored.serialized_secret_key().unwrap(),
        def.serialized_secret_key().unwrap()
    );
}

#[test]
fn test_format_identifiers() {
    assert_eq!(SerFmt::try_from(1).unwrap(), SerFmt::Public);
    assert_eq!(SerFmt::try_from(2).unwrap(), SerFmt::Full);
    assert!(matches!(
        SerFmt::try_from(3),
        Err(CredentialError::UnsupportedFormat(3))
    ));
}

#[test]
fn test_endpoint_survives_reload() {
    let def = transcript_builder()
        .issuer_endpoint(IssuerEndpoint::new("issuer.example", 8443))
        .build()
        .unwrap();
    let loaded = ClCredentialDefinition::from_json(&def.get(SerFmt::Public).unwrap()).unwrap();
    assert_eq!(
        loaded.issuer_endpoint().map(ToString::to_string).as_deref(),
        Some("issuer.example:8443")
    );
}

#[test]
fn test_fingerprint_identifies_public_key() {
    let a = transcript_definition();
    let b = transcript_definition();
    let fa = a.public_key().fingerprint().unwrap();
    assert_eq!(fa.len(), 64);
    assert_eq!(fa, a.to_public_only().unwrap().public_key().fingerprint().unwrap());
    assert_ne!(fa, b.public_key().fingerprint().unwrap());
}

// =========================================================================
// Registry
// =========================================================================

#[test]
fn test_registry_publishes_versions() {
    let registry = DefinitionRegistry::new();
    registry.register(transcript_definition()).unwrap();
    let v2 = CredentialSchema::new("Transcript", "2.0", ["student_name", "gpa", "year"]).unwrap();
    registry
        .register(
            ClCredentialDefinition::builder(v2)
                .primes(big(SG_127[1]), big(SG_127[2]))
                .config(KeyGenConfig::with_modulus_bits(256))
                .build()
                .unwrap(),
        )
        .unwrap();

    assert_eq!(registry.versions("Transcript"), vec!["1.0", "2.0"]);
    let view = registry.publish_view("Transcript", "2.0").unwrap();
    let loaded = ClCredentialDefinition::from_json(&view).unwrap();
    assert_eq!(loaded.schema().len(), 3);
    assert!(matches!(
        registry.register(transcript_definition()),
        Err(CredentialError::DuplicateDefinition(_))
    ));
}
