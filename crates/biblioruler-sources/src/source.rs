//! The adapter contract shared by every source database

use crate::config::BiblioConfig;
use crate::error::{Result, SourceError};
use crate::{Mendeley, Papers3, Zotero};
use biblioruler_domain::{CollectionTree, Paper};
use std::fmt;
use std::str::FromStr;

/// Lazy sequence of the papers of a source, in summary-query order
pub struct Publications<'a> {
    inner: Box<dyn Iterator<Item = Result<Paper>> + 'a>,
}

impl<'a> Publications<'a> {
    pub fn new(inner: impl Iterator<Item = Result<Paper>> + 'a) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Iterator for Publications<'_> {
    type Item = Result<Paper>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// A connected, read-only reference-manager database
pub trait Source {
    /// Namespace of the papers this source produces
    fn namespace(&self) -> &'static str;

    /// Every paper, with row-level fields populated and sub-lists deferred
    fn publications(&self) -> Result<Publications<'_>>;

    /// Every collection, fully linked
    fn collections(&self) -> Result<CollectionTree>;

    /// The paper with this backend-local key
    fn publication(&self, local_key: &str) -> Result<Option<Paper>>;

    /// Papers whose DOI matches (case-insensitive)
    fn find_by_doi(&self, doi: &str) -> Result<Vec<Paper>>;

    /// Resolve an application URI (`papers3://...`, `zotero://...`)
    fn publication_by_uri(&self, uri: &str) -> Result<Option<Paper>> {
        tracing::warn!(uri, namespace = self.namespace(), "URI lookup not supported");
        Ok(None)
    }
}

/// The supported source databases
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Papers3,
    Zotero,
    Mendeley,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Papers3, SourceKind::Zotero, SourceKind::Mendeley];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Papers3 => "papers3",
            SourceKind::Zotero => "zotero",
            SourceKind::Mendeley => "mendeley",
        }
    }

    /// Connect the adapter for this kind with its section of `config`
    pub fn open(self, config: &BiblioConfig) -> Result<Box<dyn Source>> {
        Ok(match self {
            SourceKind::Papers3 => Box::new(Papers3::connect(&config.papers3)?),
            SourceKind::Zotero => Box::new(Zotero::connect(&config.zotero)?),
            SourceKind::Mendeley => Box::new(Mendeley::connect(&config.mendeley)?),
        })
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "papers3" => Ok(SourceKind::Papers3),
            "zotero" | "zotero5" => Ok(SourceKind::Zotero),
            "mendeley" => Ok(SourceKind::Mendeley),
            other => Err(SourceError::Config(format!(
                "Unknown source [{other}], expected one of papers3, zotero, mendeley"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_names() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
        assert_eq!("Zotero5".parse::<SourceKind>().unwrap(), SourceKind::Zotero);
        assert!("sente".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_open_without_path_is_config_error() {
        let err = SourceKind::Mendeley.open(&BiblioConfig::default()).err().unwrap();
        assert!(matches!(err, SourceError::Config(_)));
    }
}
