use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::definition::ClCredentialDefinition;
use crate::error::CredentialError;
use crate::format::SerFmt;
use crate::traits::CredDef;

/// In-memory registry of an issuer's credential definitions, keyed by
/// `(name, version)`.
///
/// Definitions are immutable, so lookups hand out shared `Arc`s and readers
/// never lock each other out. A schema change means a new version.
pub struct DefinitionRegistry {
    definitions: DashMap<(String, String), Arc<ClCredentialDefinition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
        }
    }

    /// Register a definition. Fails if `(name, version)` is taken.
    pub fn register(
        &self,
        definition: ClCredentialDefinition,
    ) -> Result<Arc<ClCredentialDefinition>, CredentialError> {
        let key = (definition.name().to_string(), definition.version().to_string());
        match self.definitions.entry(key) {
            Entry::Occupied(entry) => Err(CredentialError::DuplicateDefinition(format!(
                "{} {}",
                entry.key().0,
                entry.key().1
            ))),
            Entry::Vacant(entry) => {
                let definition = Arc::new(definition);
                tracing::info!(
                    name = definition.name(),
                    version = definition.version(),
                    state = %definition.state(),
                    "credential definition registered"
                );
                entry.insert(Arc::clone(&definition));
                Ok(definition)
            }
        }
    }

    pub fn get(&self, name: &str, version: &str) -> Option<Arc<ClCredentialDefinition>> {
        self.definitions
            .get(&(name.to_string(), version.to_string()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// PUBLIC encoding of a registered definition, for publication.
    pub fn publish_view(&self, name: &str, version: &str) -> Result<String, CredentialError> {
        self.get(name, version)
            .ok_or_else(|| CredentialError::DefinitionNotFound(format!("{} {}", name, version)))?
            .get(SerFmt::Public)
    }

    /// Drop a definition from the registry. Outstanding `Arc`s stay valid.
    pub fn remove(&self, name: &str, version: &str) -> Option<Arc<ClCredentialDefinition>> {
        self.definitions
            .remove(&(name.to_string(), version.to_string()))
            .map(|(_, definition)| definition)
    }

    /// Registered versions of one definition name, sorted.
    pub fn versions(&self, name: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .definitions
            .iter()
            .filter(|e| e.key().0 == name)
            .map(|e| e.key().1.clone())
            .collect();
        versions.sort();
        versions
    }

    pub fn count(&self) -> usize {
        self.definitions.len()
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
