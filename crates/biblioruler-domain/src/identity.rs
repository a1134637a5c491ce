//! Composite identifiers (`namespace:local_key`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the namespace and the backend-local key
pub const SEPARATOR: char = ':';

/// Identity of an entity across every source.
///
/// The namespace is fixed per adapter and entity class (`papers3`,
/// `zotero-note`, ...) and must not contain the separator; the local key is
/// the backend's native row identifier and may contain anything.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Identity {
    namespace: String,
    local_key: String,
}

impl Identity {
    /// Create an identity from a namespace and a local key
    pub fn new(namespace: impl Into<String>, local_key: impl Into<String>) -> Self {
        let namespace = namespace.into();
        debug_assert!(
            !namespace.contains(SEPARATOR),
            "namespace {namespace:?} contains the separator"
        );
        Self {
            namespace,
            local_key: local_key.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_key(&self) -> &str {
        &self.local_key
    }

    /// Identity in the same namespace with a different local key
    pub fn sibling(&self, local_key: impl Into<String>) -> Self {
        Self::new(self.namespace.clone(), local_key)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, SEPARATOR, self.local_key)
    }
}

/// Error returned when a string is not `namespace:local_key`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid identity [{0}]: expected namespace:key")]
pub struct IdentityParseError(pub String);

impl FromStr for Identity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(SEPARATOR) {
            Some((namespace, key)) if !namespace.is_empty() && !key.is_empty() => {
                Ok(Self::new(namespace, key))
            }
            _ => Err(IdentityParseError(s.to_string())),
        }
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.to_string()
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
