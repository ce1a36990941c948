//! CL credential definitions: generation, accessors, and PUBLIC/FULL encoding.

use std::sync::Arc;

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::{CryptoRng, RngCore, SeedableRng};

use cldef_core::{IssuerEndpoint, KeyGenConfig, MIN_MODULUS_BITS};
use cldef_crypto::{
    build_modulus, derive_keys, has_full_order, is_probable_prime, is_quadratic_residue,
    select_generator, CancellationFlag, CryptoError, GenerationBudget, SafePrimeGenerator,
    SafePrimePair, SecretKey,
};

use crate::error::CredentialError;
use crate::format::{decode_decimal, encode_decimal, SerFmt, WireDefinition, WireSecretKey};
use crate::public_key::ClPublicKey;
use crate::schema::CredentialSchema;
use crate::traits::{CredDef, CredDefPublicKey, DefinitionState};

/// A CL-signature credential definition.
///
/// Immutable once built. The secret key sits behind an `Arc`, so clones and
/// serialization calls share one copy of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClCredentialDefinition {
    schema: CredentialSchema,
    public_key: ClPublicKey,
    secret_key: Option<Arc<SecretKey>>,
    issuer_endpoint: Option<IssuerEndpoint>,
}

impl ClCredentialDefinition {
    /// Start building a definition for `schema`.
    pub fn builder(schema: CredentialSchema) -> DefinitionBuilder {
        DefinitionBuilder::new(schema)
    }

    pub fn schema(&self) -> &CredentialSchema {
        &self.schema
    }

    pub fn issuer_endpoint(&self) -> Option<&IssuerEndpoint> {
        self.issuer_endpoint.as_ref()
    }

    /// Shared handle to the secret key, for the signing side.
    pub fn shared_secret_key(&self) -> Result<Arc<SecretKey>, CredentialError> {
        self.secret_key
            .clone()
            .ok_or(CredentialError::SecretKeyUnavailable)
    }

    /// Lossy projection to the `PublicOnly` state: encode as PUBLIC and
    /// load the result back.
    pub fn to_public_only(&self) -> Result<Self, CredentialError> {
        Self::from_json(&self.get(SerFmt::Public)?)
    }

    /// Load a PUBLIC or FULL payload.
    ///
    /// PUBLIC yields a `PublicOnly` definition, FULL a `Generated` one. The
    /// public key is checked structurally and against the schema, and `n`
    /// must have at least [`MIN_MODULUS_BITS`] bits. For FULL, `p'` and `q'`
    /// must be Sophie Germain primes reproducing `n`, and every generator
    /// must be a quadratic residue.
    pub fn from_json(data: &str) -> Result<Self, CredentialError> {
        Self::load(data, None)
    }

    /// Like [`Self::from_json`], but `n` must also match the configured
    /// modulus size, and FULL primes are tested with the configured rounds.
    pub fn from_json_with_config(
        data: &str,
        config: &KeyGenConfig,
    ) -> Result<Self, CredentialError> {
        config.validate()?;
        Self::load(data, Some(config))
    }

    fn load(data: &str, config: Option<&KeyGenConfig>) -> Result<Self, CredentialError> {
        let wire: WireDefinition = serde_json::from_str(data)
            .map_err(|e| CredentialError::Deserialization(e.to_string()))?;

        let schema = CredentialSchema::new(&wire.name, &wire.version, wire.schema.iter().cloned())
            .map_err(|e| CredentialError::Deserialization(format!("schema: {}", e)))?;
        let public_key = ClPublicKey::from_wire(&wire.public_key)?;
        public_key
            .validate()
            .map_err(|e| CredentialError::Deserialization(e.to_string()))?;
        let bits = public_key.n().bits();
        if bits < MIN_MODULUS_BITS as u64 {
            return Err(CredentialError::Deserialization(format!(
                "publicKey.n has {} bits, minimum is {}",
                bits, MIN_MODULUS_BITS
            )));
        }
        if let Some(config) = config {
            if !config.accepts_modulus_bits(bits) {
                return Err(CredentialError::Deserialization(format!(
                    "publicKey.n has {} bits, expected {}",
                    bits, config.modulus_bits
                )));
            }
        }
        let key_attrs = public_key.attribute_names();
        if key_attrs != schema.attr_names() {
            return Err(CredentialError::Deserialization(
                "publicKey.R does not match schema".into(),
            ));
        }

        let secret_key = match &wire.secret_key {
            Some(sk) => {
                let rounds = config
                    .map(|c| c.primality_rounds)
                    .unwrap_or_else(|| KeyGenConfig::default().primality_rounds);
                Some(Arc::new(load_secret_key(sk, &public_key, rounds)?))
            }
            None => None,
        };

        let definition = Self {
            schema,
            public_key,
            secret_key,
            issuer_endpoint: wire.issuer_endpoint.clone(),
        };
        tracing::info!(
            name = definition.name(),
            version = definition.version(),
            state = %definition.state(),
            "credential definition loaded"
        );
        Ok(definition)
    }

    fn to_wire(&self, format: SerFmt) -> Result<WireDefinition, CredentialError> {
        let secret_key = match format {
            SerFmt::Public => None,
            SerFmt::Full => Some(wire_secret_key(self.secret_key()?)),
        };
        Ok(WireDefinition {
            name: self.schema.name().to_string(),
            version: self.schema.version().to_string(),
            schema: self.schema.attr_names().to_vec(),
            public_key: self.public_key.to_wire(),
            issuer_endpoint: self.issuer_endpoint.clone(),
            secret_key,
        })
    }
}

impl CredDef for ClCredentialDefinition {
    type PublicKey = ClPublicKey;

    fn name(&self) -> &str {
        self.schema.name()
    }

    fn version(&self) -> &str {
        self.schema.version()
    }

    fn state(&self) -> DefinitionState {
        if self.secret_key.is_some() {
            DefinitionState::Generated
        } else {
            DefinitionState::PublicOnly
        }
    }

    fn public_key(&self) -> &ClPublicKey {
        &self.public_key
    }

    fn secret_key(&self) -> Result<&SecretKey, CredentialError> {
        self.secret_key
            .as_deref()
            .ok_or(CredentialError::SecretKeyUnavailable)
    }

    fn serialized_secret_key(&self) -> Result<String, CredentialError> {
        let wire = wire_secret_key(self.secret_key()?);
        serde_json::to_string(&wire).map_err(|e| CredentialError::Serialization(e.to_string()))
    }

    fn get(&self, format: SerFmt) -> Result<String, CredentialError> {
        let wire = self.to_wire(format)?;
        serde_json::to_string(&wire).map_err(|e| CredentialError::Serialization(e.to_string()))
    }
}

fn wire_secret_key(secret: &SecretKey) -> WireSecretKey {
    WireSecretKey {
        p_prime: encode_decimal(secret.p_prime()),
        q_prime: encode_decimal(secret.q_prime()),
    }
}

fn load_secret_key(
    wire: &WireSecretKey,
    public_key: &ClPublicKey,
    rounds: u32,
) -> Result<SecretKey, CredentialError> {
    let p_prime = decode_decimal("p_prime", &wire.p_prime)?;
    let q_prime = decode_decimal("q_prime", &wire.q_prime)?;
    let mut rng = StdRng::from_entropy();
    for (label, x) in [("p_prime", &p_prime), ("q_prime", &q_prime)] {
        if !is_probable_prime(x, rounds, &mut rng) {
            return Err(CredentialError::Deserialization(format!(
                "secretKey.{} is not prime",
                label
            )));
        }
    }
    let pair = SafePrimePair::new(p_prime, q_prime);
    let (n, secret) = build_modulus(pair, rounds, &mut rng)
        .map_err(|e| CredentialError::Deserialization(format!("secretKey: {}", e)))?;
    if n.value() != public_key.n() {
        return Err(CredentialError::Deserialization(
            "secretKey does not factor publicKey.n".into(),
        ));
    }
    let generators = [public_key.s(), public_key.z()]
        .into_iter()
        .chain(public_key.r().values());
    for value in generators {
        if !is_quadratic_residue(value, &secret) {
            return Err(CredentialError::Deserialization(
                "publicKey holds a quadratic non-residue".into(),
            ));
        }
    }
    Ok(secret)
}

/// Step-by-step construction of a [`ClCredentialDefinition`].
///
/// Construction is all-or-nothing: `build` either returns a complete
/// `Generated` definition or an error.
#[derive(Debug, Clone)]
pub struct DefinitionBuilder {
    schema: CredentialSchema,
    primes: Option<SafePrimePair>,
    issuer_endpoint: Option<IssuerEndpoint>,
    config: KeyGenConfig,
    cancel: CancellationFlag,
}

impl DefinitionBuilder {
    pub fn new(schema: CredentialSchema) -> Self {
        Self {
            schema,
            primes: None,
            issuer_endpoint: None,
            config: KeyGenConfig::default(),
            cancel: CancellationFlag::new(),
        }
    }

    /// Use caller-supplied Sophie Germain primes instead of generating.
    pub fn primes(mut self, p_prime: BigUint, q_prime: BigUint) -> Self {
        self.primes = Some(SafePrimePair::new(p_prime, q_prime));
        self
    }

    pub fn issuer_endpoint(mut self, endpoint: IssuerEndpoint) -> Self {
        self.issuer_endpoint = Some(endpoint);
        self
    }

    pub fn config(mut self, config: KeyGenConfig) -> Self {
        self.config = config;
        self
    }

    /// Flag that stops generation when cancelled.
    pub fn cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn schema(&self) -> &CredentialSchema {
        &self.schema
    }

    pub fn key_config(&self) -> &KeyGenConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn has_supplied_primes(&self) -> bool {
        self.primes.is_some()
    }

    /// Build with a fresh, entropy-seeded RNG.
    pub fn build(self) -> Result<ClCredentialDefinition, CredentialError> {
        self.build_with_rng(&mut StdRng::from_entropy())
    }

    /// Build with a caller-provided RNG.
    pub fn build_with_rng<R>(mut self, rng: &mut R) -> Result<ClCredentialDefinition, CredentialError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let generator = self.prime_generator()?;
        let pair = match self.primes.take() {
            Some(pair) => {
                generator.check_pair(pair.p_prime(), pair.q_prime(), rng)?;
                pair
            }
            None => generator.generate(rng)?,
        };
        self.assemble(pair, generator.budget(), rng)
    }

    /// Prime search configured from this builder, sharing its cancel flag.
    pub(crate) fn prime_generator(&self) -> Result<SafePrimeGenerator, CredentialError> {
        let generator = SafePrimeGenerator::new(&self.config)?;
        let budget = generator.budget().clone().with_cancel(self.cancel.clone());
        Ok(generator.with_budget(budget))
    }

    /// Everything after the prime search: modulus, base generator, and
    /// per-attribute keys.
    pub(crate) fn assemble<R>(
        self,
        pair: SafePrimePair,
        budget: &GenerationBudget,
        rng: &mut R,
    ) -> Result<ClCredentialDefinition, CredentialError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        budget.check()?;
        let (modulus, secret) = build_modulus(pair, self.config.primality_rounds, rng)?;
        let n = modulus.into_inner();
        if !self.config.accepts_modulus_bits(n.bits()) {
            return Err(CryptoError::InvalidPrimePair(format!(
                "modulus has {} bits, expected {}",
                n.bits(),
                self.config.modulus_bits
            ))
            .into());
        }

        budget.check()?;
        let s = select_full_order_generator(&n, &secret, self.config.max_generator_resamples, rng)?;

        budget.check()?;
        let (z, r) = derive_keys(
            &s,
            &n,
            &secret,
            self.schema.attr_names(),
            self.config.max_generator_resamples,
            rng,
        )?;

        let definition = ClCredentialDefinition {
            schema: self.schema,
            public_key: ClPublicKey::new(n, s, z, r),
            secret_key: Some(Arc::new(secret)),
            issuer_endpoint: self.issuer_endpoint,
        };
        tracing::info!(
            name = definition.name(),
            version = definition.version(),
            attributes = definition.schema.len(),
            modulus_bits = definition.public_key.n().bits(),
            fingerprint = %definition.public_key.fingerprint().unwrap_or_default(),
            "credential definition generated"
        );
        Ok(definition)
    }
}

/// [`select_generator`] until the result generates the whole subgroup.
fn select_full_order_generator<R>(
    n: &BigUint,
    secret: &SecretKey,
    max_resamples: u32,
    rng: &mut R,
) -> Result<BigUint, CryptoError>
where
    R: RngCore + CryptoRng + ?Sized,
{
    for _ in 0..max_resamples {
        let s = select_generator(n, max_resamples, rng)?;
        if has_full_order(&s, secret) {
            return Ok(s);
        }
    }
    Err(CryptoError::GeneratorSelection(format!(
        "no full-order generator after {} resamples",
        max_resamples
    )))
}
