//! Validation of closed-vocabulary fields

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A field assignment rejected because the value is not in the vocabulary
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[error("{field} [{value}] is not allowed: {message}")]
pub struct ValidationError {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// The publication type vocabulary rejected `value`
    pub fn publication_type(value: &str) -> Self {
        Self::new(
            "type",
            value,
            "not a member of the publication type vocabulary",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_names_offending_value() {
        let err = ValidationError::publication_type("journal article");
        let message = err.to_string();
        assert!(message.contains("[journal article]"));
        assert!(message.starts_with("type"));
    }
}
