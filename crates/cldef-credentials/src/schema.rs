use cldef_crypto::check_attribute_names;

use crate::error::CredentialError;

/// A named, versioned set of attribute names.
///
/// Attribute order is irrelevant; names are kept sorted. Validated on
/// construction, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSchema {
    name: String,
    version: String,
    attr_names: Vec<String>,
}

impl CredentialSchema {
    /// Fails with `AttributeDerivation` on an empty list or a repeated name
    /// (exact, case-sensitive comparison).
    pub fn new<I, S>(
        name: impl Into<String>,
        version: impl Into<String>,
        attr_names: I,
    ) -> Result<Self, CredentialError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut attr_names: Vec<String> = attr_names.into_iter().map(Into::into).collect();
        check_attribute_names(attr_names.as_slice())?;
        attr_names.sort();
        Ok(Self {
            name: name.into(),
            version: version.into(),
            attr_names,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Attribute names, sorted.
    pub fn attr_names(&self) -> &[String] {
        &self.attr_names
    }

    pub fn contains(&self, attr: &str) -> bool {
        self.attr_names
            .binary_search_by(|a| a.as_str().cmp(attr))
            .is_ok()
    }

    pub fn len(&self) -> usize {
        self.attr_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attr_names.is_empty()
    }
}
