//! Fixtures shared by the integration tests.
//!
//! The primes below are Sophie Germain primes with the top two bits set,
//! sized for 128-, 256- and 512-bit moduli.

use std::str::FromStr;

use cldef_core::KeyGenConfig;
use cldef_credentials::{ClCredentialDefinition, CredentialSchema, DefinitionBuilder};
use num_bigint::BigUint;

pub const SG_63: [&str; 3] = [
    "8891797508031526811",
    "7683401733514832771",
    "7304608974178711763",
];

pub const SG_127: [&str; 3] = [
    "149631614063016541803939888673682307869",
    "130340101721142160781601946511533828343",
    "137413645264473898156413024922213139381",
];

pub const SG_255: [&str; 3] = [
    "55333453163829378138430757733469819899666602583970508445616207591036513053803",
    "45975106343597130620872608778336611820936058551098896821002508002620073352643",
    "50725736751513515724472034462995187240855557167294061862303680607065573090769",
];

/// Prime, but `2p + 1` is composite.
pub const NOT_SAFE_127: &str = "140996352122204921551907501619231954947";

pub fn big(decimal: &str) -> BigUint {
    BigUint::from_str(decimal).expect("fixture is a decimal integer")
}

pub fn transcript_schema() -> CredentialSchema {
    CredentialSchema::new("Transcript", "1.0", ["student_name", "gpa"])
        .expect("transcript schema is valid")
}

/// Builder for the Transcript schema with the first two 127-bit fixture primes.
pub fn transcript_builder() -> DefinitionBuilder {
    ClCredentialDefinition::builder(transcript_schema())
        .primes(big(SG_127[0]), big(SG_127[1]))
        .config(KeyGenConfig::with_modulus_bits(256))
}

pub fn transcript_definition() -> ClCredentialDefinition {
    transcript_builder()
        .build()
        .expect("fixture definition builds")
}
