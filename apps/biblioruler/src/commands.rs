//! Command implementations

use biblioruler_export::{export_to_path, with_extension, Exporter, ExporterKind, RdfExporter};
use biblioruler_sources::{BiblioConfig, SourceKind};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("sync from {source_name} to {destination} is not implemented")]
    SyncNotImplemented { source_name: String, destination: String },

    #[error("source and destination are the same ({0})")]
    SameLibrary(String),

    #[error("annotation embedding needs a build with the `pdfium` feature")]
    EmbeddingUnavailable,
}

pub fn export(
    config: &BiblioConfig,
    source: &str,
    exporter: &str,
    path: &Path,
    embed_annotations: bool,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let kind: SourceKind = source.parse()?;
    let format: ExporterKind = exporter.parse()?;
    tracing::info!(source = %kind, exporter = %format, "Configuring export");

    let source = kind.open(config)?;
    let exporter: Box<dyn Exporter> = match (format, embed_annotations) {
        (ExporterKind::ZoteroRdf, true) => Box::new(rdf_with_embedding(path)?),
        (_, true) => {
            tracing::warn!(exporter = %format, "Annotations are only embedded by the RDF exporter");
            format.create()
        }
        (_, false) => format.create(),
    };
    let written = export_to_path(exporter.as_ref(), source.as_ref(), path)?;
    Ok(written)
}

#[cfg(feature = "pdfium")]
fn rdf_with_embedding(path: &Path) -> Result<RdfExporter, CommandError> {
    match biblioruler_export::PdfiumEmbedder::new() {
        Ok(embedder) => Ok(RdfExporter::with_embedder(Box::new(embedder), with_extension(path, "files"))),
        Err(e) => {
            tracing::warn!(error = ?e, "pdfium unavailable, linking original files");
            Ok(RdfExporter::new())
        }
    }
}

#[cfg(not(feature = "pdfium"))]
fn rdf_with_embedding(path: &Path) -> Result<RdfExporter, CommandError> {
    tracing::debug!(files = %with_extension(path, "files").display(), "No embedder compiled in");
    Err(CommandError::EmbeddingUnavailable)
}

/// Placeholder for library synchronization; always fails
pub fn sync(source: &str, destination: &str) -> Result<(), CommandError> {
    if source == destination {
        return Err(CommandError::SameLibrary(source.to_string()));
    }
    Err(CommandError::SyncNotImplemented {
        source_name: source.to_string(),
        destination: destination.to_string(),
    })
}

/// One line per source with its database path and whether it is present
pub fn sources(config: &BiblioConfig, out: &mut dyn Write) -> std::io::Result<()> {
    for kind in SourceKind::ALL {
        let dbpath = match kind {
            SourceKind::Papers3 => config.papers3.dbpath.as_deref(),
            SourceKind::Zotero => config.zotero.dbpath.as_deref(),
            SourceKind::Mendeley => config.mendeley.dbpath.as_deref(),
        };
        match dbpath {
            Some(path) => {
                let status = if path.is_file() { "found" } else { "missing" };
                writeln!(out, "{:<10} {} ({status})", kind.as_str(), path.display())?
            }
            None => writeln!(out, "{:<10} not configured", kind.as_str())?,
        }
    }
    Ok(())
}
