//! JSON dump of the canonical model, for inspection

use crate::error::Result;
use crate::exporter::{ExportSummary, Exporter};
use biblioruler_domain::{Annotation, Author, CollectionTree, Identity, LinkedFile, Note, Paper, PaperRecord};
use biblioruler_sources::Publications;
use serde::Serialize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct FileDump<'a> {
    id: &'a Identity,
    path: Option<&'a Path>,
    mime_type: Option<&'a str>,
    title: Option<&'a str>,
    exists: bool,
    annotations: &'a [Annotation],
}

impl<'a> FileDump<'a> {
    fn new(file: &'a LinkedFile) -> Result<Self> {
        Ok(Self {
            id: file.id(),
            path: file.path(),
            mime_type: file.mime_type.as_deref(),
            title: file.title.as_deref(),
            exists: file.exists(),
            annotations: file.annotations()?,
        })
    }
}

#[derive(Serialize)]
struct PaperDump<'a> {
    id: &'a Identity,
    #[serde(flatten)]
    record: &'a PaperRecord,
    container: Option<&'a Identity>,
    authors: &'a [Author],
    keywords: &'a BTreeSet<String>,
    files: Vec<FileDump<'a>>,
    notes: &'a [Note],
}

impl<'a> PaperDump<'a> {
    fn new(paper: &'a Paper) -> Result<Self> {
        let record = paper.record()?;
        Ok(Self {
            id: paper.id(),
            record,
            container: record.container.as_deref().map(Paper::id),
            authors: paper.authors()?,
            keywords: paper.keywords()?,
            files: paper.files()?.iter().map(FileDump::new).collect::<Result<_>>()?,
            notes: paper.notes()?,
        })
    }
}

#[derive(Serialize)]
struct CollectionDump<'a> {
    id: &'a Identity,
    name: &'a str,
    path: Vec<&'a str>,
    parent: Option<&'a Identity>,
    is_virtual: bool,
    publications: Vec<&'a Identity>,
}

#[derive(Serialize)]
struct Document<'a> {
    publications: &'a [PaperDump<'a>],
    collections: &'a [CollectionDump<'a>],
}

/// Writes one JSON document `{"publications": [...], "collections": [...]}`
#[derive(Debug)]
pub struct JsonExporter {
    pretty: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn collections<'a>(&self, tree: &'a CollectionTree) -> Result<Vec<CollectionDump<'a>>> {
        let mut dumps = Vec::with_capacity(tree.len());
        for (id, collection) in tree.iter() {
            dumps.push(CollectionDump {
                id: collection.id(),
                name: &collection.name,
                path: tree.path(id),
                parent: tree.parent(id).and_then(|p| tree.get(p)).map(|p| p.id()),
                is_virtual: collection.is_virtual,
                publications: collection.publications()?.iter().map(Paper::id).collect(),
            });
        }
        Ok(dumps)
    }
}

impl Exporter for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(
        &self,
        out: &mut dyn Write,
        publications: Publications<'_>,
        collections: &CollectionTree,
    ) -> Result<ExportSummary> {
        let papers = publications.collect::<std::result::Result<Vec<_>, _>>()?;
        let dumps = papers.iter().map(PaperDump::new).collect::<Result<Vec<_>>>()?;
        let collection_dumps = self.collections(collections)?;

        let document = Document {
            publications: &dumps,
            collections: &collection_dumps,
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &document)?;
        } else {
            serde_json::to_writer(&mut *out, &document)?;
        }
        writeln!(out)?;

        Ok(ExportSummary {
            publications: dumps.len(),
            collections: collection_dumps.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblioruler_domain::{Collection, PublicationType};

    #[test]
    fn test_dump_shape() {
        let mut record = PaperRecord::new();
        record.set_kind(PublicationType::Book);
        record.title = Some("A Book".into());
        record.month = Some("Jun".into());
        record.year = Some("2004".into());
        let paper = Paper::detached(Identity::new("mendeley", "{D1}"), record);

        let mut tree = CollectionTree::new();
        tree.insert(Collection::detached(
            Identity::new("mendeley-collection", "1"),
            "Alpha",
            vec![paper.clone()],
        ))
        .unwrap();

        let mut out = Vec::new();
        let summary = JsonExporter::compact()
            .write(&mut out, Publications::new(vec![paper].into_iter().map(Ok)), &tree)
            .unwrap();
        assert_eq!(summary, ExportSummary { publications: 1, collections: 1 });

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let first = &value["publications"][0];
        assert_eq!(first["id"], "mendeley:{D1}");
        assert_eq!(first["type"], "book");
        assert_eq!(first["title"], "A Book");
        assert_eq!(first["year"], "2004");
        assert_eq!(value["collections"][0]["path"][0], "Alpha");
        assert_eq!(value["collections"][0]["publications"][0], "mendeley:{D1}");
    }
}
