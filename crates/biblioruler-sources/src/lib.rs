//! # biblioruler-sources
//!
//! Read-only adapters for the Papers3, Zotero and Mendeley Desktop SQLite
//! databases. Each adapter maps its backend's schema onto the canonical
//! model of `biblioruler-domain`: summary rows are read eagerly, authors,
//! keywords, files, notes, annotations and collection members are queried
//! the first time they are accessed.
//!
//! ```ignore
//! use biblioruler_sources::{BiblioConfig, Source, SourceKind};
//!
//! let config = BiblioConfig::load(None)?.with_discovery();
//! let source = SourceKind::Zotero.open(&config)?;
//! for paper in source.publications()? {
//!     let paper = paper?;
//!     println!("{} {:?}", paper.id(), paper.title()?);
//! }
//! ```

pub mod config;
pub mod dates;
pub mod discovery;
pub mod error;
pub mod mendeley;
pub mod papers3;
pub mod source;
pub(crate) mod sqlite;
pub mod zotero;

pub use config::*;
pub use error::{Result, SourceError};
pub use mendeley::Mendeley;
pub use papers3::Papers3;
pub use source::*;
pub use zotero::Zotero;
