//! # biblioruler-export
//!
//! Writers for the canonical model read from a source:
//! - `RdfExporter`: Zotero RDF/XML, optionally with annotations embedded
//!   into copies of the linked PDFs
//! - `BibtexExporter`: `.bib` records
//! - `JsonExporter`: a dump of every field, for inspection

pub mod bibtex;
pub mod embed;
pub mod error;
pub mod exporter;
pub mod json;
pub mod rdf;

pub use bibtex::{BibtexEntry, BibtexExporter};
pub use embed::{link_file, AnnotationEmbedder, FileLink};
pub use error::{EmbeddingError, ExportError, Result};
pub use exporter::{export_to_path, with_extension, ExportSummary, Exporter, ExporterKind};
pub use json::JsonExporter;
pub use rdf::RdfExporter;

#[cfg(feature = "pdfium")]
pub use embed::PdfiumEmbedder;
