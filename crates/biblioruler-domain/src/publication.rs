//! Publication domain model
//!
//! A `Paper` is either built from a summary row (record populated, sub-lists
//! pending) or created as a placeholder holding only its identity. Every
//! non-identity field goes through a `Lazy` cell that calls back into the
//! owning source the first time it is read.

use crate::{Author, Identity, Lazy, LinkedFile, ModelError, Note, PublicationType};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

/// Callbacks into the source that owns a paper.
///
/// Every method defaults to `LazyLoadNotImplemented`, so a source only
/// implements the capabilities its schema supports.
pub trait PaperLoader {
    /// Fetch the summary fields of a placeholder paper
    fn load_record(&self, paper: &Identity) -> Result<PaperRecord, ModelError> {
        Err(ModelError::not_implemented(paper, "record"))
    }

    fn load_authors(&self, paper: &Identity) -> Result<Vec<Author>, ModelError> {
        Err(ModelError::not_implemented(paper, "authors"))
    }

    fn load_keywords(&self, paper: &Identity) -> Result<BTreeSet<String>, ModelError> {
        Err(ModelError::not_implemented(paper, "keywords"))
    }

    fn load_files(&self, paper: &Identity) -> Result<Vec<LinkedFile>, ModelError> {
        Err(ModelError::not_implemented(paper, "files"))
    }

    fn load_notes(&self, paper: &Identity) -> Result<Vec<Note>, ModelError> {
        Err(ModelError::not_implemented(paper, "notes"))
    }
}

/// The cheap, row-level fields of a paper
#[derive(Clone, Debug, Default, Serialize)]
pub struct PaperRecord {
    pub title: Option<String>,
    #[serde(rename = "type")]
    kind: Option<PublicationType>,
    pub citekey: Option<String>,
    pub abstract_text: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub doi: Option<String>,
    pub uri: Option<String>,
    pub volume: Option<String>,
    pub number: Option<String>,
    pub pages: Option<String>,
    pub publisher: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub read: bool,
    /// The bundle (journal issue, proceedings, book) this paper belongs to
    #[serde(skip)]
    pub container: Option<Box<Paper>>,
}

impl PaperRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> Option<PublicationType> {
        self.kind
    }

    pub fn set_kind(&mut self, kind: PublicationType) {
        self.kind = Some(kind);
    }

    /// Assign the type from its CSL name.
    ///
    /// Values outside the vocabulary are rejected and the previous type is
    /// kept.
    pub fn set_type(&mut self, value: &str) -> Result<(), ModelError> {
        let kind: PublicationType = value.parse()?;
        self.kind = Some(kind);
        Ok(())
    }

    /// Month and year joined by a space; absent parts are omitted
    pub fn date(&self) -> String {
        [self.month.as_deref(), self.year.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Load the summary fields of `id`; a container never keeps a container
fn fetch_record(loader: Option<&dyn PaperLoader>, id: &Identity, nested: bool) -> Result<PaperRecord, ModelError> {
    let loader = loader.ok_or_else(|| ModelError::not_implemented(id, "record"))?;
    let mut record = loader.load_record(id)?;
    if nested {
        record.container = None;
    } else if let Some(container) = record.container.as_mut() {
        container.nested = true;
    }
    Ok(record)
}

/// A publication (paper, book, thesis, etc.)
#[derive(Clone)]
pub struct Paper {
    id: Identity,
    /// Set on container placeholders; a container never has a container
    nested: bool,
    loader: Option<Rc<dyn PaperLoader>>,
    record: Lazy<PaperRecord>,
    authors: Lazy<Vec<Author>>,
    keywords: Lazy<BTreeSet<String>>,
    files: Lazy<Vec<LinkedFile>>,
    notes: Lazy<Vec<Note>>,
}

impl Paper {
    /// A placeholder knowing only its identity
    pub fn placeholder(id: Identity, loader: Rc<dyn PaperLoader>) -> Self {
        Self {
            id,
            nested: false,
            loader: Some(loader),
            record: Lazy::pending(),
            authors: Lazy::pending(),
            keywords: Lazy::pending(),
            files: Lazy::pending(),
            notes: Lazy::pending(),
        }
    }

    /// A placeholder for the bundle of another paper
    pub fn container_placeholder(id: Identity, loader: Rc<dyn PaperLoader>) -> Self {
        Self {
            nested: true,
            ..Self::placeholder(id, loader)
        }
    }

    /// A paper whose summary fields came from a row; sub-lists stay pending
    pub fn from_record(id: Identity, mut record: PaperRecord, loader: Rc<dyn PaperLoader>) -> Self {
        if let Some(container) = record.container.as_mut() {
            container.nested = true;
        }
        Self {
            record: Lazy::ready(record),
            ..Self::placeholder(id, loader)
        }
    }

    /// A fully populated paper with no source behind it
    pub fn detached(id: Identity, record: PaperRecord) -> Self {
        Self {
            id,
            nested: false,
            loader: None,
            record: Lazy::ready(record),
            authors: Lazy::ready(Vec::new()),
            keywords: Lazy::ready(BTreeSet::new()),
            files: Lazy::ready(Vec::new()),
            notes: Lazy::ready(Vec::new()),
        }
    }

    /// Identity never triggers loading
    pub fn id(&self) -> &Identity {
        &self.id
    }

    /// Whether the summary fields still have to be fetched
    pub fn is_placeholder(&self) -> bool {
        !self.record.is_populated()
    }

    fn loader(&self, capability: &'static str) -> Result<&dyn PaperLoader, ModelError> {
        self.loader
            .as_deref()
            .ok_or_else(|| ModelError::not_implemented(&self.id, capability))
    }

    /// Summary fields, materialized on first access
    pub fn record(&self) -> Result<&PaperRecord, ModelError> {
        self.record
            .get_or_load(&self.id, || fetch_record(self.loader.as_deref(), &self.id, self.nested))
    }

    /// Mutable summary fields, for population routines
    pub fn record_mut(&mut self) -> Result<&mut PaperRecord, ModelError> {
        let Paper {
            id,
            nested,
            loader,
            record,
            ..
        } = self;
        let id: &Identity = id;
        let loader = loader.as_deref();
        let nested = *nested;
        record.get_mut_or_load(id, || fetch_record(loader, id, nested))
    }

    pub fn title(&self) -> Result<Option<&str>, ModelError> {
        Ok(self.record()?.title.as_deref())
    }

    pub fn kind(&self) -> Result<Option<PublicationType>, ModelError> {
        Ok(self.record()?.kind())
    }

    /// Assign the type from its CSL name; see `PaperRecord::set_type`
    pub fn set_type(&mut self, value: &str) -> Result<(), ModelError> {
        self.record_mut()?.set_type(value)
    }

    pub fn month(&self) -> Result<Option<&str>, ModelError> {
        Ok(self.record()?.month.as_deref())
    }

    pub fn year(&self) -> Result<Option<&str>, ModelError> {
        Ok(self.record()?.year.as_deref())
    }

    pub fn date(&self) -> Result<String, ModelError> {
        Ok(self.record()?.date())
    }

    pub fn doi(&self) -> Result<Option<&str>, ModelError> {
        Ok(self.record()?.doi.as_deref())
    }

    pub fn uri(&self) -> Result<Option<&str>, ModelError> {
        Ok(self.record()?.uri.as_deref())
    }

    pub fn citekey(&self) -> Result<Option<&str>, ModelError> {
        Ok(self.record()?.citekey.as_deref())
    }

    pub fn is_read(&self) -> Result<bool, ModelError> {
        Ok(self.record()?.read)
    }

    /// The bundle this paper belongs to, as a (possibly unloaded) paper
    pub fn container(&self) -> Result<Option<&Paper>, ModelError> {
        Ok(self.record()?.container.as_deref())
    }

    /// Ordered author list
    pub fn authors(&self) -> Result<&[Author], ModelError> {
        self.authors
            .get_or_load(&self.id, || self.loader("authors")?.load_authors(&self.id))
            .map(Vec::as_slice)
    }

    pub fn keywords(&self) -> Result<&BTreeSet<String>, ModelError> {
        self.keywords
            .get_or_load(&self.id, || self.loader("keywords")?.load_keywords(&self.id))
    }

    pub fn files(&self) -> Result<&[LinkedFile], ModelError> {
        self.files
            .get_or_load(&self.id, || self.loader("files")?.load_files(&self.id))
            .map(Vec::as_slice)
    }

    pub fn notes(&self) -> Result<&[Note], ModelError> {
        self.notes
            .get_or_load(&self.id, || self.loader("notes")?.load_notes(&self.id))
            .map(Vec::as_slice)
    }

    pub fn set_authors(&mut self, authors: Vec<Author>) {
        self.authors.set(authors);
    }

    pub fn set_keywords(&mut self, keywords: BTreeSet<String>) {
        self.keywords.set(keywords);
    }

    pub fn set_files(&mut self, files: Vec<LinkedFile>) {
        self.files.set(files);
    }

    pub fn set_notes(&mut self, notes: Vec<Note>) {
        self.notes.set(notes);
    }

    /// Builder variant of `set_authors`
    pub fn with_authors(mut self, authors: Vec<Author>) -> Self {
        self.set_authors(authors);
        self
    }
}

impl fmt::Debug for Paper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paper")
            .field("id", &self.id)
            .field("record", &self.record.peek())
            .field("authors", &self.authors.state())
            .field("files", &self.files.state())
            .finish()
    }
}
