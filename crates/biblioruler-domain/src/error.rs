//! Error types for the canonical model

use crate::{Identity, ValidationError};
use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised by entity access and mutation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A closed-vocabulary field was assigned an unknown value
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The owning source never implemented this retrieval.
    ///
    /// This is a programming error, not missing data.
    #[error("Lazy loading not implemented for {capability} of {identity}")]
    LazyLoadNotImplemented {
        identity: Identity,
        capability: &'static str,
    },

    /// A field was read while the same entity was being materialized
    #[error("Re-entrant access to {identity} during materialization")]
    Reentrant { identity: Identity },

    /// A deferred field was accessed mutably without a value in it
    #[error("No value populated for {identity}")]
    Unpopulated { identity: Identity },

    /// The source could not produce the data for a deferred field
    #[error("Could not load {capability} of {identity}: {message}")]
    Load {
        identity: Identity,
        capability: &'static str,
        message: String,
    },

    /// Setting this parent would make a collection its own ancestor
    #[error("Setting parent of {child} to {parent} would create a cycle")]
    CollectionCycle { child: Identity, parent: Identity },

    /// A collection handle or key that the tree does not hold
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    /// Two collections with the same local key were inserted
    #[error("Duplicate collection: {0}")]
    DuplicateCollection(Identity),
}

impl ModelError {
    pub fn not_implemented(identity: &Identity, capability: &'static str) -> Self {
        ModelError::LazyLoadNotImplemented {
            identity: identity.clone(),
            capability,
        }
    }

    pub fn load(identity: &Identity, capability: &'static str, message: impl Into<String>) -> Self {
        ModelError::Load {
            identity: identity.clone(),
            capability,
            message: message.into(),
        }
    }

    /// Whether this is a contract violation rather than a data problem
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ModelError::LazyLoadNotImplemented { .. } | ModelError::Reentrant { .. }
        )
    }
}
