//! Zotero RDF/XML writer
//!
//! The layout is the one Zotero itself imports: one `bib:*` element per
//! publication keyed by its identity, `z:Attachment` and `bib:Memo`
//! elements for files and notes, and one `z:Collection` per collection.
//! Containers are written once, after the publications, unless they are
//! publications of the source themselves.

use crate::embed::{link_file, AnnotationEmbedder, FileLink};
use crate::error::Result;
use crate::exporter::{ExportSummary, Exporter};
use biblioruler_domain::{Author, CollectionTree, Identity, LinkedFile, Note, Paper, PublicationType};
use biblioruler_sources::Publications;
use quick_xml::escape::escape;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;

const HEADER: &str = r#"<rdf:RDF
 xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
 xmlns:z="http://www.zotero.org/namespaces/export#"
 xmlns:dcterms="http://purl.org/dc/terms/"
 xmlns:bib="http://purl.org/net/biblio#"
 xmlns:foaf="http://xmlns.com/foaf/0.1/"
 xmlns:link="http://purl.org/rss/1.0/modules/link/"
 xmlns:dc="http://purl.org/dc/elements/1.1/"
 xmlns:vcard="http://nwalsh.com/rdf/vCard#"
 xmlns:prism="http://prismstandard.org/namespaces/1.2/basic/">
"#;

const FOOTER: &str = "</rdf:RDF>\n";

/// `bib:` class of a canonical type
pub fn bib_class(kind: Option<PublicationType>) -> &'static str {
    use PublicationType::*;
    match kind {
        Some(Book) => "Book",
        Some(Chapter | EntryDictionary | EntryEncyclopedia) => "BookSection",
        Some(Journal) => "Journal",
        Some(Proceedings) => "ConferenceProceedings",
        Some(Thesis) => "Thesis",
        Some(Report) => "Report",
        Some(Patent) => "Patent",
        Some(Manuscript) => "Manuscript",
        Some(PersonalCommunication) => "Letter",
        Some(Interview) => "Interview",
        Some(Legislation | Bill) => "Legislation",
        Some(LegalCase) => "Document",
        Some(Map) => "Map",
        Some(Graphic | Figure) => "Illustration",
        Some(MotionPicture | Broadcast | Song) => "Recording",
        Some(Dataset) => "Data",
        Some(Webpage | Post | PostWeblog) => "Document",
        _ => "Article",
    }
}

fn about(id: &Identity) -> String {
    format!("#{}", escape(&id.to_string()))
}

/// A line of `depth` two-space indents followed by `line`
fn line(out: &mut dyn Write, depth: usize, line: &str) -> std::io::Result<()> {
    writeln!(out, "{:width$}{}", "", line, width = depth * 2)
}

/// `<tag>escaped text</tag>` when `value` is present
fn text_element(out: &mut dyn Write, depth: usize, tag: &str, value: Option<&str>) -> std::io::Result<()> {
    match value {
        Some(value) => line(out, depth, &format!("<{tag}>{}</{tag}>", escape(value))),
        None => Ok(()),
    }
}

/// Writes Zotero RDF (`.rdf`) files
#[derive(Default)]
pub struct RdfExporter {
    embedder: Option<Box<dyn AnnotationEmbedder>>,
    files_dir: PathBuf,
}

impl RdfExporter {
    /// Link every file to its original location
    pub fn new() -> Self {
        Self::default()
    }

    /// Write annotated copies of PDFs into `files_dir` and link those
    pub fn with_embedder(embedder: Box<dyn AnnotationEmbedder>, files_dir: impl Into<PathBuf>) -> Self {
        Self {
            embedder: Some(embedder),
            files_dir: files_dir.into(),
        }
    }

    fn write_author(&self, out: &mut dyn Write, depth: usize, author: &Author) -> std::io::Result<()> {
        line(out, depth, "<rdf:li>")?;
        line(out, depth + 1, "<foaf:Person>")?;
        text_element(out, depth + 2, "foaf:surname", author.surname.as_deref())?;
        text_element(out, depth + 2, "foaf:givenname", author.firstname.as_deref())?;
        line(out, depth + 1, "</foaf:Person>")?;
        line(out, depth, "</rdf:li>")
    }

    fn write_paper(&self, out: &mut dyn Write, paper: &Paper) -> Result<()> {
        let record = paper.record()?;
        let class = bib_class(record.kind());
        line(out, 1, &format!("<bib:{class} rdf:about=\"{}\">", about(paper.id())))?;
        text_element(out, 2, "z:itemType", record.kind().map(|k| k.as_str()))?;
        if let Some(container) = record.container.as_deref() {
            line(out, 2, &format!("<dcterms:isPartOf rdf:resource=\"{}\"/>", about(container.id())))?;
        }

        let authors = paper.authors()?;
        if !authors.is_empty() {
            line(out, 2, "<bib:authors><rdf:Seq>")?;
            for author in authors {
                self.write_author(out, 3, author)?;
            }
            line(out, 2, "</rdf:Seq></bib:authors>")?;
        }

        text_element(out, 2, "dc:title", record.title.as_deref())?;
        text_element(out, 2, "dcterms:abstract", record.abstract_text.as_deref())?;
        let date = record.date();
        text_element(out, 2, "dc:date", Some(date.as_str()).filter(|d| !d.is_empty()))?;
        text_element(out, 2, "prism:volume", record.volume.as_deref())?;
        text_element(out, 2, "prism:number", record.number.as_deref())?;
        text_element(out, 2, "bib:pages", record.pages.as_deref())?;
        if let Some(doi) = record.doi.as_deref() {
            line(out, 2, &format!("<dc:identifier>DOI {}</dc:identifier>", escape(doi)))?;
        }
        if let Some(uri) = record.uri.as_deref() {
            line(out, 2, &format!("<dc:identifier><dcterms:URI><rdf:value>{}</rdf:value></dcterms:URI></dc:identifier>", escape(uri)))?;
        }
        if let Some(publisher) = record.publisher.as_deref() {
            line(
                out,
                2,
                &format!("<dc:publisher><foaf:Organization><foaf:name>{}</foaf:name></foaf:Organization></dc:publisher>", escape(publisher)),
            )?;
        }
        if let Some(created) = record.created_at {
            text_element(out, 2, "dcterms:dateSubmitted", Some(created.format("%Y-%m-%d %H:%M:%S").to_string().as_str()))?;
        }
        for keyword in paper.keywords()? {
            text_element(out, 2, "dc:subject", Some(keyword.as_str()))?;
        }

        let files = paper.files()?;
        for file in files {
            line(out, 2, &format!("<link:link rdf:resource=\"{}\"/>", about(file.id())))?;
        }
        let notes = paper.notes()?;
        for note in notes {
            line(out, 2, &format!("<dcterms:isReferencedBy rdf:resource=\"{}\"/>", about(&note.id)))?;
        }
        line(out, 1, &format!("</bib:{class}>"))?;

        for file in files {
            self.write_attachment(out, paper, file)?;
        }
        for note in notes {
            self.write_memo(out, note)?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_attachment(&self, out: &mut dyn Write, paper: &Paper, file: &LinkedFile) -> Result<()> {
        line(out, 1, &format!("<z:Attachment rdf:about=\"{}\">", about(file.id())))?;
        line(out, 2, "<z:itemType>attachment</z:itemType>")?;
        line(out, 2, &format!("<dcterms:isPartOf rdf:resource=\"{}\"/>", about(paper.id())))?;
        let link = link_file(file, self.embedder.as_deref(), &self.files_dir);
        if let Some(path) = link.path() {
            line(out, 2, &format!("<rdf:resource rdf:resource=\"{}\"/>", escape(&path.to_string_lossy())))?;
        }
        if matches!(link, FileLink::Embedded(_)) {
            text_element(out, 2, "dc:description", Some("Annotations embedded"))?;
        }
        text_element(out, 2, "dc:title", file.title.as_deref())?;
        text_element(out, 2, "link:type", file.mime_type.as_deref())?;
        line(out, 1, "</z:Attachment>")?;
        Ok(())
    }

    fn write_memo(&self, out: &mut dyn Write, note: &Note) -> Result<()> {
        line(out, 1, &format!("<bib:Memo rdf:about=\"{}\">", about(&note.id)))?;
        let value = note.html_content().unwrap_or_else(|| note.text());
        text_element(out, 2, "rdf:value", Some(value))?;
        line(out, 1, "</bib:Memo>")?;
        Ok(())
    }

    fn write_container(&self, out: &mut dyn Write, container: &Paper) -> Result<()> {
        let class = bib_class(container.kind()?);
        line(out, 1, &format!("<bib:{class} rdf:about=\"{}\">", about(container.id())))?;
        text_element(out, 2, "dc:title", container.title()?)?;
        line(out, 1, &format!("</bib:{class}>"))?;
        writeln!(out)?;
        Ok(())
    }

    fn write_collections(&self, out: &mut dyn Write, collections: &CollectionTree) -> Result<usize> {
        let mut count = 0;
        for (id, collection) in collections.iter() {
            line(out, 1, &format!("<z:Collection rdf:about=\"{}\">", about(collection.id())))?;
            text_element(out, 2, "dc:title", Some(collection.name.as_str()))?;
            for child in collections.children(id) {
                if let Some(child) = collections.get(*child) {
                    line(out, 2, &format!("<dcterms:hasPart rdf:resource=\"{}\"/>", about(child.id())))?;
                }
            }
            for member in collection.publications()? {
                line(out, 2, &format!("<dcterms:hasPart rdf:resource=\"{}\"/>", about(member.id())))?;
            }
            line(out, 1, "</z:Collection>")?;
            writeln!(out)?;
            count += 1;
        }
        Ok(count)
    }
}

impl Exporter for RdfExporter {
    fn extension(&self) -> &'static str {
        "rdf"
    }

    fn write(
        &self,
        out: &mut dyn Write,
        publications: Publications<'_>,
        collections: &CollectionTree,
    ) -> Result<ExportSummary> {
        let mut summary = ExportSummary::default();
        let mut written = HashSet::new();
        let mut containers: Vec<Paper> = Vec::new();
        let mut seen = HashSet::new();

        out.write_all(HEADER.as_bytes())?;
        writeln!(out)?;
        for paper in publications {
            let paper = paper?;
            self.write_paper(out, &paper)?;
            written.insert(paper.id().clone());
            if let Some(container) = paper.container()? {
                if seen.insert(container.id().clone()) {
                    containers.push(container.clone());
                }
            }
            summary.publications += 1;
        }

        for container in containers.iter().filter(|c| !written.contains(c.id())) {
            self.write_container(out, container)?;
        }
        summary.collections = self.write_collections(out, collections)?;
        out.write_all(FOOTER.as_bytes())?;
        Ok(summary)
    }
}
