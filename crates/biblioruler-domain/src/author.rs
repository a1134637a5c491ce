//! Author representation

use crate::Identity;
use serde::{Deserialize, Serialize};

/// The author of a paper; either name part may be missing in the source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: Identity,
    pub firstname: Option<String>,
    pub surname: Option<String>,
}

impl Author {
    pub fn new(id: Identity, firstname: Option<String>, surname: Option<String>) -> Self {
        Self {
            id,
            firstname: firstname.filter(|s| !s.trim().is_empty()),
            surname: surname.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Format as "Surname, Firstname" for BibTeX
    pub fn to_bibtex_format(&self) -> String {
        match (&self.surname, &self.firstname) {
            (Some(surname), Some(first)) => format!("{}, {}", surname, first),
            (Some(surname), None) => surname.clone(),
            (None, Some(first)) => first.clone(),
            (None, None) => String::new(),
        }
    }

    /// Format as "Firstname Surname" for display
    pub fn display_name(&self) -> String {
        [self.firstname.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_anonymous(&self) -> bool {
        self.firstname.is_none() && self.surname.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(first: Option<&str>, last: Option<&str>) -> Author {
        Author::new(
            Identity::new("test", "a1"),
            first.map(String::from),
            last.map(String::from),
        )
    }

    #[test]
    fn test_bibtex_format() {
        assert_eq!(author(Some("Jane"), Some("Doe")).to_bibtex_format(), "Doe, Jane");
        assert_eq!(author(None, Some("Doe")).to_bibtex_format(), "Doe");
        assert_eq!(author(Some("Jane"), None).to_bibtex_format(), "Jane");
    }

    #[test]
    fn test_blank_parts_are_absent() {
        let a = author(Some("  "), Some("Doe"));
        assert!(a.firstname.is_none());
        assert_eq!(a.display_name(), "Doe");
        assert!(author(None, Some("")).is_anonymous());
    }
}
