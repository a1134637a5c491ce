//! Configuration for the source adapters
//!
//! A `BiblioConfig` is read once from `~/.biblioruler/config.toml`, completed
//! with the locations discovered from each application's own preferences and
//! then handed to the adapter constructors.

use crate::discovery;
use crate::error::{Result, SourceError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-user configuration directory
pub const CONFIG_DIR: &str = ".biblioruler";

/// Configuration of every source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiblioConfig {
    pub papers3: Papers3Config,
    pub zotero: ZoteroConfig,
    pub mendeley: MendeleyConfig,
}

/// Papers3 library location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Papers3Config {
    /// Path to `Database.papersdb`
    pub dbpath: Option<PathBuf>,
    /// Directory that PDF paths are relative to
    pub filebase: Option<PathBuf>,
    /// Also load smart (non-editable) collections
    pub include_virtual: bool,
}

/// Zotero profile location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoteroConfig {
    /// Path to `zotero.sqlite`
    pub dbpath: Option<PathBuf>,
    /// Base directory of `attachments:` relative links
    pub filebase: Option<PathBuf>,
    /// Read a copy of the database so a running Zotero keeps its lock
    pub copy: bool,
}

/// Mendeley Desktop database location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MendeleyConfig {
    /// Path to `<account>@www.mendeley.com.sqlite`
    pub dbpath: Option<PathBuf>,
}

impl ZoteroConfig {
    /// Directory holding Zotero-managed `storage:` attachments
    pub fn storage_dir(&self) -> Option<PathBuf> {
        self.dbpath
            .as_deref()
            .and_then(Path::parent)
            .map(|dir| dir.join("storage"))
    }
}

impl BiblioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// `~/.biblioruler/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join("config.toml"))
    }

    /// Read `path`, or the default location when `None`.
    ///
    /// A missing file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let config = Self::from_toml(&text).map_err(|e| {
            SourceError::Config(format!("{}: {}", path.display(), e))
        })?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Fill paths the file left out from each application's preferences
    pub fn with_discovery(mut self) -> Self {
        let Some(home) = dirs::home_dir() else {
            return self;
        };

        if self.papers3.dbpath.is_none() || self.papers3.filebase.is_none() {
            if let Some(found) = discovery::papers3(&home) {
                self.papers3.dbpath.get_or_insert(found.dbpath);
                if let Some(filebase) = found.filebase {
                    self.papers3.filebase.get_or_insert(filebase);
                }
            }
        }

        if self.zotero.dbpath.is_none() || self.zotero.filebase.is_none() {
            if let Some(found) = discovery::zotero(&home) {
                self.zotero.dbpath.get_or_insert(found.dbpath);
                if let Some(filebase) = found.filebase {
                    self.zotero.filebase.get_or_insert(filebase);
                }
            }
        }

        if self.mendeley.dbpath.is_none() {
            if let Some(found) = discovery::mendeley(&home) {
                self.mendeley.dbpath = Some(found.dbpath);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BiblioConfig::from_toml(
            r#"
            [zotero]
            dbpath = "/data/zotero/zotero.sqlite"
            copy = true
            "#,
        )
        .unwrap();
        assert!(config.zotero.copy);
        assert!(config.zotero.filebase.is_none());
        assert_eq!(
            config.zotero.storage_dir(),
            Some(PathBuf::from("/data/zotero/storage"))
        );
        assert!(config.papers3.dbpath.is_none());
        assert!(!config.papers3.include_virtual);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = BiblioConfig::new();
        config.papers3.dbpath = Some(PathBuf::from("/lib/Database.papersdb"));
        config.papers3.include_virtual = true;
        let text = config.to_toml().unwrap();
        assert_eq!(BiblioConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = BiblioConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, BiblioConfig::default());
    }

    #[test]
    fn test_load_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[papers3\n").unwrap();
        let err = BiblioConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, SourceError::Config(ref msg) if msg.contains("config.toml")));
    }
}
