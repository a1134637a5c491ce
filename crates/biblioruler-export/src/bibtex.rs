//! BibTeX writer
//!
//! One `@type{citekey,` record per publication. Every value is brace
//! delimited; free-text values have the BibTeX special characters escaped.

use crate::error::Result;
use crate::exporter::{ExportSummary, Exporter};
use biblioruler_domain::{CollectionTree, Identity, Paper, PublicationType};
use biblioruler_sources::Publications;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::io::Write;

lazy_static! {
    static ref CITEKEY_UNSAFE: Regex = Regex::new(r"[^A-Za-z0-9_:\-.]+").unwrap();
}

/// BibTeX entry type of a canonical type
pub fn entry_type(kind: Option<PublicationType>) -> &'static str {
    use PublicationType::*;
    match kind {
        Some(Article | ArticleJournal | ArticleMagazine | ArticleNewspaper | Review | ReviewBook) => "article",
        Some(Book) => "book",
        Some(Chapter | EntryDictionary | EntryEncyclopedia) => "incollection",
        Some(PaperConference) => "inproceedings",
        Some(Proceedings) => "proceedings",
        Some(Thesis) => "phdthesis",
        Some(Report) => "techreport",
        Some(Manuscript) => "unpublished",
        Some(Pamphlet) => "booklet",
        _ => "misc",
    }
}

/// Escape special BibTeX characters in a value
pub fn escape_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '#' | '$' | '%' | '&' | '_' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Citekey used when the source has none, e.g. `zotero:ABCD1234`
pub fn fallback_citekey(id: &Identity) -> String {
    CITEKEY_UNSAFE.replace_all(&id.to_string(), "_").into_owned()
}

/// A BibTeX record ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct BibtexEntry {
    pub entry_type: &'static str,
    pub cite_key: String,
    pub fields: Vec<(&'static str, String)>,
}

impl BibtexEntry {
    fn add_field(&mut self, key: &'static str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            let value = value.into();
            if !value.trim().is_empty() {
                self.fields.push((key, value));
            }
        }
    }

    /// Build the record of a paper, loading authors and keywords
    pub fn from_paper(paper: &Paper) -> Result<Self> {
        let record = paper.record()?;
        let kind = record.kind();
        let mut entry = BibtexEntry {
            entry_type: entry_type(kind),
            cite_key: record
                .citekey
                .clone()
                .unwrap_or_else(|| fallback_citekey(paper.id())),
            fields: Vec::new(),
        };

        let authors: Vec<String> = paper
            .authors()?
            .iter()
            .filter(|a| !a.is_anonymous())
            .map(|a| a.to_bibtex_format())
            .collect();
        if !authors.is_empty() {
            entry.add_field("author", Some(authors.join(" and ")));
        }
        entry.add_field("title", record.title.as_deref().map(escape_value));

        if let Some(container) = record.container.as_deref() {
            let field = match kind {
                Some(PublicationType::PaperConference | PublicationType::Chapter) => "booktitle",
                _ => "journal",
            };
            entry.add_field(field, container.title()?.map(escape_value));
        }

        entry.add_field("year", record.year.clone());
        entry.add_field("month", record.month.as_deref().map(str::to_lowercase));
        entry.add_field("volume", record.volume.clone());
        entry.add_field("number", record.number.clone());
        entry.add_field("pages", record.pages.clone());
        entry.add_field("publisher", record.publisher.as_deref().map(escape_value));
        entry.add_field("doi", record.doi.clone());
        entry.add_field("abstract", record.abstract_text.as_deref().map(escape_value));

        let keywords = paper.keywords()?;
        if !keywords.is_empty() {
            let joined = keywords.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
            entry.add_field("keywords", Some(escape_value(&joined)));
        }
        Ok(entry)
    }

    pub fn format(&self) -> String {
        let mut result = String::new();
        result.push('@');
        result.push_str(self.entry_type);
        result.push('{');
        result.push_str(&self.cite_key);
        result.push(',');
        result.push('\n');

        for (key, value) in &self.fields {
            result.push_str("    ");
            result.push_str(key);
            result.push_str(" = {");
            result.push_str(value);
            result.push_str("},\n");
        }

        result.push('}');
        result
    }
}

/// Writes `.bib` files
#[derive(Debug, Default)]
pub struct BibtexExporter;

impl BibtexExporter {
    pub fn new() -> Self {
        Self
    }
}

impl Exporter for BibtexExporter {
    fn extension(&self) -> &'static str {
        "bib"
    }

    fn write(
        &self,
        out: &mut dyn Write,
        publications: Publications<'_>,
        _collections: &CollectionTree,
    ) -> Result<ExportSummary> {
        let mut summary = ExportSummary::default();
        let mut keys = HashSet::new();
        for paper in publications {
            let paper = paper?;
            let mut entry = BibtexEntry::from_paper(&paper)?;
            if !keys.insert(entry.cite_key.clone()) {
                tracing::warn!(citekey = %entry.cite_key, paper = %paper.id(), "Duplicate citekey, using identity");
                entry.cite_key = fallback_citekey(paper.id());
                keys.insert(entry.cite_key.clone());
            }
            writeln!(out, "{}\n", entry.format())?;
            summary.publications += 1;
        }
        Ok(summary)
    }
}
