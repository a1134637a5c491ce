//! Mendeley Desktop (`<account>@www.mendeley.com.sqlite`) adapter
//!
//! Documents, folders and file annotations. Highlights are stored one row per
//! rectangle in `FileHighlightRects` and merged back by highlight id. Unlike
//! the other adapters, an unknown document type is an error.

use crate::config::MendeleyConfig;
use crate::dates::{mendeley_date, sql_timestamp, unix_seconds};
use crate::error::{Result, SourceError};
use crate::source::{Publications, Source};
use crate::sqlite::{self, ForLoad};
use biblioruler_domain::{
    merge_highlights, page_index, Annotation, AnnotationColor, AnnotationMeta, Author, Collection,
    CollectionLoader, CollectionTree, FileLoader, HighlightRow, Identity, LinkedFile, ModelError,
    Note, NoteAnnotation, Paper, PaperLoader, PaperRecord, PublicationType, Rect,
};
use rusqlite::{Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

pub const NAMESPACE: &str = "mendeley";
const AUTHOR_NAMESPACE: &str = "mendeley-author";
const COLLECTION_NAMESPACE: &str = "mendeley-collection";
const CONTAINER_NAMESPACE: &str = "mendeley-container";
const FILE_NAMESPACE: &str = "mendeley-file";
const NOTE_NAMESPACE: &str = "mendeley-note";
const ANNOTATION_NAMESPACE: &str = "mendeley-annotation";

const BACKEND: &str = "Mendeley";

const NOT_DELETED: &str = "coalesce(deletionPending, 'false') != 'true'";

const DOCUMENT_SELECT: &str = "SELECT uuid, type, title, year, month, read, abstract, doi, \
     volume, issue, pages, publisher, citationKey, added, publication, id FROM Documents";

const AUTHOR_QUERY: &str = "SELECT c.id, c.firstNames, c.lastName FROM DocumentContributors c \
     JOIN Documents d ON c.documentId = d.id \
     WHERE d.uuid = ?1 AND c.contribution = 'DocumentAuthor' ORDER BY c.id";

const KEYWORD_QUERY: &str = "SELECT k.keyword FROM DocumentKeywords k \
     JOIN Documents d ON k.documentId = d.id WHERE d.uuid = ?1 \
     UNION SELECT t.tag FROM DocumentTags t \
     JOIN Documents d ON t.documentId = d.id WHERE d.uuid = ?1";

const FILES_QUERY: &str = "SELECT f.hash, f.localUrl FROM DocumentFiles df \
     JOIN Files f ON df.hash = f.hash \
     JOIN Documents d ON df.documentId = d.id \
     WHERE d.uuid = ?1 AND coalesce(df.unlinked, 'false') != 'true' ORDER BY f.localUrl";

const NOTE_QUERY: &str = "SELECT note FROM Documents WHERE uuid = ?1";

const HIGHLIGHT_QUERY: &str = "SELECT coalesce(h.uuid, h.id), r.page, r.x1, r.y1, r.x2, r.y2, \
     h.createdTime, h.author, h.color FROM FileHighlights h \
     JOIN FileHighlightRects r ON r.highlightId = h.id \
     WHERE h.fileHash = ?1 AND coalesce(h.unlinked, 'false') != 'true' ORDER BY h.id, r.id";

const FILE_NOTE_QUERY: &str = "SELECT coalesce(uuid, id), page, x, y, note, createdTime, author, color \
     FROM FileNotes WHERE fileHash = ?1 AND coalesce(unlinked, 'false') != 'true' ORDER BY id";

const FOLDERS_QUERY: &str = "SELECT id, name, parentId FROM Folders ORDER BY id";

const MEMBERS_QUERY: &str = "SELECT d.uuid FROM DocumentFolders df \
     JOIN Documents d ON df.documentId = d.id \
     WHERE df.folderId = ?1 AND coalesce(d.deletionPending, 'false') != 'true' ORDER BY d.id";

/// Canonical type of a Mendeley document type
pub fn publication_type(type_name: &str) -> Option<PublicationType> {
    use PublicationType::*;
    Some(match type_name {
        "JournalArticle" | "MagazineArticle" => ArticleJournal,
        "NewspaperArticle" => ArticleNewspaper,
        "Book" => Book,
        "BookSection" => Chapter,
        "WorkingPaper" | "Report" | "report" => Report,
        "ConferenceProceedings" => Proceedings,
        "Thesis" => Thesis,
        "Patent" => Patent,
        "WebPage" => Webpage,
        "EncyclopediaArticle" => EntryEncyclopedia,
        "Film" => MotionPicture,
        "TelevisionBroadcast" => Broadcast,
        "Bill" | "Hearing" => Bill,
        "Case" => LegalCase,
        "Statute" => Legislation,
        "Generic" => Entry,
        _ => return None,
    })
}

/// Turn a `file://` location into a path
pub fn local_path(location: &str) -> Option<PathBuf> {
    match url::Url::parse(location) {
        Ok(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Ok(_) => None,
        Err(_) => {
            let decoded = urlencoding::decode(location).ok()?;
            Some(PathBuf::from(decoded.trim_start_matches("file://")))
        }
    }
}

fn flag(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("true") | Some("1"))
}

struct DocumentRow {
    uuid: String,
    type_name: Option<String>,
    title: Option<String>,
    year: Option<i64>,
    month: Option<i64>,
    read: bool,
    abstract_text: Option<String>,
    doi: Option<String>,
    volume: Option<String>,
    issue: Option<String>,
    pages: Option<String>,
    publisher: Option<String>,
    citekey: Option<String>,
    added: Option<i64>,
    publication: Option<String>,
    id: i64,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get(0)?,
            type_name: sqlite::text(row, 1)?,
            title: sqlite::text(row, 2)?,
            year: sqlite::integer(row, 3)?,
            month: sqlite::integer(row, 4)?,
            read: flag(sqlite::text(row, 5)?),
            abstract_text: sqlite::text(row, 6)?,
            doi: sqlite::text(row, 7)?,
            volume: sqlite::text(row, 8)?,
            issue: sqlite::text(row, 9)?,
            pages: sqlite::text(row, 10)?,
            publisher: sqlite::text(row, 11)?,
            citekey: sqlite::text(row, 12)?,
            added: sqlite::integer(row, 13)?,
            publication: sqlite::text(row, 14)?,
            id: row.get(15)?,
        })
    }

    fn into_record(self) -> Result<PaperRecord> {
        let type_name = self.type_name.unwrap_or_default();
        let kind = publication_type(&type_name).ok_or_else(|| SourceError::UnmappedValue {
            backend: BACKEND,
            field: "type",
            value: type_name.clone(),
        })?;

        let mut record = PaperRecord::new();
        record.set_kind(kind);
        let date = mendeley_date(self.month, self.year);
        record.month = date.month;
        record.year = date.year;
        record.title = self.title;
        record.read = self.read;
        record.abstract_text = self.abstract_text;
        record.doi = self.doi;
        record.volume = self.volume;
        record.number = self.issue;
        record.pages = self.pages;
        record.publisher = self.publisher;
        record.citekey = self.citekey;
        record.created_at = self.added.and_then(unix_seconds);
        record.container = self.publication.map(|title| {
            let mut bundle = PaperRecord::new();
            bundle.title = Some(title);
            bundle.set_kind(match kind {
                PublicationType::Chapter => PublicationType::Book,
                _ => PublicationType::Journal,
            });
            Box::new(Paper::detached(Identity::new(CONTAINER_NAMESPACE, self.uuid.clone()), bundle))
        });
        Ok(record)
    }
}

/// Connection shared by every entity of one Mendeley database
struct MendeleyDb {
    me: Weak<MendeleyDb>,
    conn: Connection,
}

impl MendeleyDb {
    fn handle(&self, owner: &Identity) -> std::result::Result<Rc<Self>, ModelError> {
        self.me
            .upgrade()
            .ok_or_else(|| ModelError::load(owner, "connection", "Mendeley database was closed"))
    }

    fn document_rows(&self, column: &str, value: &str) -> Result<Vec<DocumentRow>> {
        let sql = format!("{DOCUMENT_SELECT} WHERE {NOT_DELETED} AND {column} = ?1 COLLATE NOCASE ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([value], DocumentRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn document_page(&self, after: i64, limit: usize) -> Result<Vec<(i64, DocumentRow)>> {
        let sql = format!("{DOCUMENT_SELECT} WHERE {NOT_DELETED} AND id > ?1 ORDER BY id LIMIT ?2");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params![after, limit as i64], DocumentRow::from_row)?
            .map(|row| row.map(|row| (row.id, row)))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(after, count = rows.len(), "Mendeley document page");
        Ok(rows)
    }

    fn paper(self: &Rc<Self>, row: DocumentRow) -> Result<Paper> {
        let id = Identity::new(NAMESPACE, row.uuid.clone());
        let record = row.into_record()?;
        Ok(Paper::from_record(id, record, self.clone()))
    }

    fn highlight(file: &Identity, row: &Row<'_>) -> rusqlite::Result<Option<HighlightRow>> {
        let id = Identity::new(ANNOTATION_NAMESPACE, sqlite::text(row, 0)?.unwrap_or_default());
        let page = match page_index(file, sqlite::integer(row, 1)?.unwrap_or(0)) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(annotation = %id, error = %e, "Skipping highlight rectangle");
                return Ok(None);
            }
        };
        let rect = Rect::from_corners(
            sqlite::real(row, 2)?.unwrap_or(0.0),
            sqlite::real(row, 3)?.unwrap_or(0.0),
            sqlite::real(row, 4)?.unwrap_or(0.0),
            sqlite::real(row, 5)?.unwrap_or(0.0),
        );
        let mut meta = AnnotationMeta::new(id, page);
        meta.created_at = sqlite::text(row, 6)?.as_deref().and_then(sql_timestamp);
        meta.author = sqlite::text(row, 7)?;
        meta.color = sqlite::text(row, 8)?.as_deref().and_then(AnnotationColor::from_hex);
        Ok(Some(HighlightRow { meta, rect, text: None }))
    }

    fn file_note(file: &Identity, row: &Row<'_>) -> rusqlite::Result<Option<NoteAnnotation>> {
        let id = Identity::new(ANNOTATION_NAMESPACE, sqlite::text(row, 0)?.unwrap_or_default());
        let page = match page_index(file, sqlite::integer(row, 1)?.unwrap_or(0)) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(annotation = %id, error = %e, "Skipping note");
                return Ok(None);
            }
        };
        let bounds = Rect::new(
            sqlite::real(row, 2)?.unwrap_or(0.0),
            sqlite::real(row, 3)?.unwrap_or(0.0),
            0.0,
            0.0,
        );
        let mut meta = AnnotationMeta::new(id, page);
        meta.created_at = sqlite::text(row, 5)?.as_deref().and_then(sql_timestamp);
        meta.author = sqlite::text(row, 6)?;
        meta.color = sqlite::text(row, 7)?.as_deref().and_then(AnnotationColor::from_hex);
        Ok(Some(NoteAnnotation {
            meta,
            bounds,
            text: sqlite::text(row, 4)?.unwrap_or_default(),
        }))
    }
}

impl PaperLoader for MendeleyDb {
    fn load_record(&self, paper: &Identity) -> std::result::Result<PaperRecord, ModelError> {
        self.document_rows("uuid", paper.local_key())
            .for_load(paper, "record")?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::load(paper, "record", "no such document"))?
            .into_record()
            .for_load(paper, "record")
    }

    fn load_authors(&self, paper: &Identity) -> std::result::Result<Vec<Author>, ModelError> {
        tracing::debug!(paper = %paper, "Mendeley contributors");
        let mut stmt = self.conn.prepare(AUTHOR_QUERY).for_load(paper, "authors")?;
        let authors = stmt
            .query_map([paper.local_key()], |row| {
                Ok(Author::new(
                    Identity::new(AUTHOR_NAMESPACE, row.get::<_, i64>(0)?.to_string()),
                    sqlite::text(row, 1)?,
                    sqlite::text(row, 2)?,
                ))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(paper, "authors")?;
        Ok(authors)
    }

    fn load_keywords(&self, paper: &Identity) -> std::result::Result<BTreeSet<String>, ModelError> {
        let mut stmt = self.conn.prepare(KEYWORD_QUERY).for_load(paper, "keywords")?;
        let keywords = stmt
            .query_map([paper.local_key()], |row| sqlite::text(row, 0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(paper, "keywords")?;
        Ok(keywords.into_iter().flatten().collect())
    }

    fn load_files(&self, paper: &Identity) -> std::result::Result<Vec<LinkedFile>, ModelError> {
        let db = self.handle(paper)?;
        let mut stmt = self.conn.prepare(FILES_QUERY).for_load(paper, "files")?;
        let files = stmt
            .query_map([paper.local_key()], |row| {
                let hash: String = row.get(0)?;
                let path = sqlite::text(row, 1)?.as_deref().and_then(local_path);
                let title = path
                    .as_ref()
                    .and_then(|p| p.file_name())
                    .map(|name| name.to_string_lossy().into_owned());
                let file = LinkedFile::new(Identity::new(FILE_NAMESPACE, hash), path, db.clone()).with_title(title);
                let mime_type = file.is_pdf().then(|| "application/pdf".to_string());
                Ok(file.with_mime_type(mime_type))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(paper, "files")?;
        Ok(files)
    }

    fn load_notes(&self, paper: &Identity) -> std::result::Result<Vec<Note>, ModelError> {
        let note = self
            .conn
            .query_row(NOTE_QUERY, [paper.local_key()], |row| sqlite::text(row, 0))
            .optional()
            .for_load(paper, "notes")?
            .flatten();
        Ok(note
            .map(|html| Note::html(Identity::new(NOTE_NAMESPACE, paper.local_key()), None, html))
            .into_iter()
            .collect())
    }
}

impl FileLoader for MendeleyDb {
    fn load_annotations(&self, file: &Identity) -> std::result::Result<Vec<Annotation>, ModelError> {
        tracing::debug!(file = %file, "Mendeley annotations");
        let mut stmt = self.conn.prepare(HIGHLIGHT_QUERY).for_load(file, "annotations")?;
        let rows = stmt
            .query_map([file.local_key()], |row| Self::highlight(file, row))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(file, "annotations")?;
        let mut annotations: Vec<Annotation> = merge_highlights(rows.into_iter().flatten())
            .into_iter()
            .map(Annotation::Highlight)
            .collect();

        let mut stmt = self.conn.prepare(FILE_NOTE_QUERY).for_load(file, "annotations")?;
        let notes = stmt
            .query_map([file.local_key()], |row| Self::file_note(file, row))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(file, "annotations")?;
        annotations.extend(notes.into_iter().flatten().map(Annotation::Note));
        Ok(annotations)
    }
}

impl CollectionLoader for MendeleyDb {
    fn load_publications(&self, collection: &Identity) -> std::result::Result<Vec<Paper>, ModelError> {
        let db = self.handle(collection)?;
        let mut stmt = self.conn.prepare(MEMBERS_QUERY).for_load(collection, "publications")?;
        let keys = stmt
            .query_map([collection.local_key()], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(collection, "publications")?;
        Ok(keys
            .into_iter()
            .map(|key| Paper::placeholder(Identity::new(NAMESPACE, key), db.clone()))
            .collect())
    }
}

/// A Mendeley Desktop database opened read-only
pub struct Mendeley {
    db: Rc<MendeleyDb>,
}

impl Mendeley {
    pub fn connect(config: &MendeleyConfig) -> Result<Self> {
        let path = sqlite::require_path(BACKEND, config.dbpath.as_ref())?;
        let conn = sqlite::open_read_only(BACKEND, path, "SELECT * FROM DocumentZotero LIMIT 1")?;
        let db = Rc::new_cyclic(|me| MendeleyDb { me: me.clone(), conn });
        Ok(Self { db })
    }
}

impl Source for Mendeley {
    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn publications(&self) -> Result<Publications<'_>> {
        tracing::info!("Reading Mendeley documents");
        let pages = self.db.clone();
        let rows = sqlite::Paged::new(move |after, limit| pages.document_page(after, limit));
        let db = self.db.clone();
        Ok(Publications::new(rows.map(move |row| row.and_then(|row| db.paper(row)))))
    }

    fn collections(&self) -> Result<CollectionTree> {
        let mut stmt = self.db.conn.prepare(FOLDERS_QUERY)?;
        let mut rows = stmt.query([])?;

        let mut tree = CollectionTree::new();
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            let folder_id: i64 = row.get(0)?;
            let collection = Collection::new(
                Identity::new(COLLECTION_NAMESPACE, folder_id.to_string()),
                sqlite::text(row, 1)?.unwrap_or_default(),
                self.db.clone(),
            );
            let id = tree.insert(collection)?;
            // negative parent ids mark top-level folders
            if let Some(parent) = sqlite::integer(row, 2)?.filter(|p| *p >= 0) {
                links.push((id, parent.to_string()));
            }
        }
        tree.link_parents(links)?;
        Ok(tree)
    }

    fn publication(&self, local_key: &str) -> Result<Option<Paper>> {
        self.db
            .document_rows("uuid", local_key)?
            .into_iter()
            .next()
            .map(|row| self.db.paper(row))
            .transpose()
    }

    fn find_by_doi(&self, doi: &str) -> Result<Vec<Paper>> {
        self.db
            .document_rows("doi", doi)?
            .into_iter()
            .map(|row| self.db.paper(row))
            .collect()
    }
}
