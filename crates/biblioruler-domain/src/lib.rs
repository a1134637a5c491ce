//! Canonical bibliographic model shared by every source and exporter
//!
//! This crate provides the backend-independent entities that the source
//! adapters populate and the exporters read:
//! - Paper: a publication with a closed CSL type vocabulary
//! - Author, Note, LinkedFile, Annotation
//! - CollectionTree: collections stored in an arena with parent/child links
//! - Identity: `namespace:local_key` identifiers
//! - Lazy: the once-only materialization cell behind every deferred field

pub mod annotation;
pub mod author;
pub mod collection;
pub mod error;
pub mod identity;
pub mod lazy;
pub mod linked_file;
pub mod note;
pub mod publication;
pub mod publication_type;
pub mod validation;

pub use annotation::*;
pub use author::*;
pub use collection::*;
pub use error::*;
pub use identity::*;
pub use lazy::*;
pub use linked_file::*;
pub use note::*;
pub use publication::*;
pub use publication_type::*;
pub use validation::*;
