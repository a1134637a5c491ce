//! The exporter contract and the file-level driver

use crate::bibtex::BibtexExporter;
use crate::error::{ExportError, Result};
use crate::json::JsonExporter;
use crate::rdf::RdfExporter;
use biblioruler_domain::CollectionTree;
use biblioruler_sources::{Publications, Source};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// What an export wrote
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub publications: usize,
    pub collections: usize,
}

/// Serializes the canonical model of one source
pub trait Exporter {
    /// File extension of the output, without the dot
    fn extension(&self) -> &'static str;

    /// Write every publication, then the collections, to `out`.
    ///
    /// A publication the source failed to produce aborts the export.
    fn write(
        &self,
        out: &mut dyn Write,
        publications: Publications<'_>,
        collections: &CollectionTree,
    ) -> Result<ExportSummary>;
}

/// Export `source` to `<path>.<extension>` and return the written path
pub fn export_to_path(exporter: &dyn Exporter, source: &dyn Source, path: &Path) -> Result<PathBuf> {
    let target = with_extension(path, exporter.extension());
    let collections = source.collections()?;
    let publications = source.publications()?;

    let mut out = BufWriter::new(File::create(&target)?);
    let summary = exporter.write(&mut out, publications, &collections)?;
    out.flush()?;

    tracing::info!(
        path = %target.display(),
        publications = summary.publications,
        collections = summary.collections,
        "Export written"
    );
    Ok(target)
}

/// `path` with `.ext` appended (any existing extension is kept)
pub fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// The available output formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExporterKind {
    ZoteroRdf,
    Bibtex,
    Json,
}

impl ExporterKind {
    pub const ALL: [ExporterKind; 3] = [ExporterKind::ZoteroRdf, ExporterKind::Bibtex, ExporterKind::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExporterKind::ZoteroRdf => "zotero_rdf",
            ExporterKind::Bibtex => "bibtex",
            ExporterKind::Json => "json",
        }
    }

    /// An exporter with default settings; RDF exports link the original files
    pub fn create(self) -> Box<dyn Exporter> {
        match self {
            ExporterKind::ZoteroRdf => Box::new(RdfExporter::new()),
            ExporterKind::Bibtex => Box::new(BibtexExporter::new()),
            ExporterKind::Json => Box::new(JsonExporter::new()),
        }
    }
}

impl fmt::Display for ExporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExporterKind {
    type Err = ExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zotero_rdf" | "rdf" => Ok(ExporterKind::ZoteroRdf),
            "bibtex" | "bib" => Ok(ExporterKind::Bibtex),
            "json" => Ok(ExporterKind::Json),
            _ => Err(ExportError::UnknownExporter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exporter_names() {
        assert_eq!("rdf".parse::<ExporterKind>().unwrap(), ExporterKind::ZoteroRdf);
        assert_eq!("BibTeX".parse::<ExporterKind>().unwrap(), ExporterKind::Bibtex);
        assert!(matches!(
            "endnote".parse::<ExporterKind>(),
            Err(ExportError::UnknownExporter(name)) if name == "endnote"
        ));
        for kind in ExporterKind::ALL {
            assert_eq!(kind.as_str().parse::<ExporterKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_extension_is_appended() {
        assert_eq!(with_extension(Path::new("/tmp/library"), "rdf"), PathBuf::from("/tmp/library.rdf"));
        assert_eq!(with_extension(Path::new("out.v2"), "bib"), PathBuf::from("out.v2.bib"));
    }
}
