//! Papers3 (`Database.papersdb`) adapter
//!
//! Publications come from the `Publication` table; authors, keywords, PDFs,
//! annotations and collection membership are separate queries run the first
//! time the corresponding field is read.

use crate::config::Papers3Config;
use crate::dates::{apple_timestamp, papers3_date};
use crate::error::Result;
use crate::source::{Publications, Source};
use crate::sqlite::{self, ForLoad};
use biblioruler_domain::{
    Annotation, AnnotationColor, AnnotationMeta, Author, Collection, CollectionLoader,
    CollectionTree, FileLoader, HighlightAnnotation, Identity, LinkedFile, ModelError, Note,
    NoteAnnotation, Paper, PaperLoader, PaperRecord, PublicationType, Rect,
};
use lazy_static::lazy_static;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

pub const NAMESPACE: &str = "papers3";
const AUTHOR_NAMESPACE: &str = "papers3-author";
const COLLECTION_NAMESPACE: &str = "papers3-collection";
const FILE_NAMESPACE: &str = "papers3-file";
const NOTE_NAMESPACE: &str = "papers3-note";
const ANNOTATION_NAMESPACE: &str = "papers3-annotation";

const BACKEND: &str = "Papers3";

/// Summary columns; the bundle is joined so a dangling reference can be told apart
const PUBLICATION_SELECT: &str = "SELECT p.uuid, p.attributed_title, p.type, p.publication_date, p.bundle, \
     p.volume, p.number, p.startpage, p.endpage, p.citekey, p.doi, p.summary, p.publisher, p.created_at, \
     p.read_status, b.uuid IS NOT NULL, p.rowid \
     FROM Publication p LEFT JOIN Publication b ON b.uuid = p.bundle";

const AUTHOR_QUERY: &str = "SELECT o.uuid, o.prename, o.surname FROM OrderedAuthor oa \
     JOIN Author o ON oa.author_id = o.uuid WHERE oa.object_id = ?1 ORDER BY oa.priority";

const KEYWORD_QUERY: &str = "SELECT k.name FROM KeywordItem ki \
     JOIN Keyword k ON ki.keyword_id = k.uuid WHERE ki.object_id = ?1";

const PDF_QUERY: &str = "SELECT uuid, path, mime_type, caption FROM PDF \
     WHERE object_id = ?1 ORDER BY is_primary DESC, rowid";

const ANNOTATION_QUERY: &str = "SELECT uuid, page_nr, contents, text, created_at, created_by, \
     color, left, top, width, height FROM Annotation WHERE object_id = ?1 ORDER BY page_nr, rowid";

const NOTES_QUERY: &str = "SELECT notes FROM Publication WHERE uuid = ?1";

const MEMBERS_QUERY: &str = "SELECT object_id FROM CollectionItem WHERE collection = ?1";

/// Papers3 stores web snapshots under its own mimetype
const PAPERS3_HTML_MIME: &str = "application/vnd.mekentosj.papers3.html";

lazy_static! {
    static ref PAPERS_URI: Regex = Regex::new(r"^papers[23]://publication/(doi|uuid|livfe)/(.+)$").unwrap();
}

/// Canonical type of a Papers3 integer type code
pub fn publication_type(code: i64) -> Option<PublicationType> {
    Some(match code {
        -1000 => PublicationType::Chapter,
        -999 | 999 => PublicationType::Entry,
        -300 => PublicationType::Webpage,
        -200 => PublicationType::Proceedings,
        -100 => PublicationType::Journal,
        0 => PublicationType::Book,
        300 | 700 => PublicationType::Report,
        400 => PublicationType::PaperConference,
        500 => PublicationType::Patent,
        _ => return None,
    })
}

/// Application URI of a publication: by DOI when known, by UUID otherwise
pub fn publication_uri(uuid: &str, doi: Option<&str>) -> String {
    match doi {
        Some(doi) => format!("papers3://publication/doi/{doi}"),
        None => format!("papers3://publication/uuid/{uuid}"),
    }
}

struct PublicationRow {
    uuid: String,
    title: Option<String>,
    kind: Option<i64>,
    publication_date: Option<String>,
    bundle: Option<String>,
    volume: Option<String>,
    number: Option<String>,
    startpage: Option<String>,
    endpage: Option<String>,
    citekey: Option<String>,
    doi: Option<String>,
    summary: Option<String>,
    publisher: Option<String>,
    created_at: Option<f64>,
    read_status: Option<i64>,
    bundle_found: bool,
    rowid: i64,
}

impl PublicationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uuid: row.get(0)?,
            title: sqlite::text(row, 1)?,
            kind: sqlite::integer(row, 2)?,
            publication_date: sqlite::text(row, 3)?,
            bundle: sqlite::text(row, 4)?,
            volume: sqlite::text(row, 5)?,
            number: sqlite::text(row, 6)?,
            startpage: sqlite::text(row, 7)?,
            endpage: sqlite::text(row, 8)?,
            citekey: sqlite::text(row, 9)?,
            doi: sqlite::text(row, 10)?,
            summary: sqlite::text(row, 11)?,
            publisher: sqlite::text(row, 12)?,
            created_at: sqlite::real(row, 13)?,
            read_status: sqlite::integer(row, 14)?,
            bundle_found: sqlite::integer(row, 15)?.unwrap_or(0) != 0,
            rowid: row.get(16)?,
        })
    }

    fn into_record(self, db: &Rc<Papers3Db>) -> PaperRecord {
        let mut record = PaperRecord::new();
        let kind = match self.kind.and_then(publication_type) {
            Some(kind) => kind,
            None => {
                tracing::warn!(uuid = %self.uuid, code = ?self.kind, "Unmapped Papers3 type, using entry");
                PublicationType::Entry
            }
        };
        record.set_kind(kind);

        let date = self.publication_date.as_deref().map(papers3_date).unwrap_or_default();
        record.month = date.month;
        record.year = date.year;

        record.uri = Some(publication_uri(&self.uuid, self.doi.as_deref()));
        record.pages = match (self.startpage, self.endpage) {
            (Some(start), Some(end)) if start != end => Some(format!("{start}--{end}")),
            (Some(start), _) => Some(start),
            (None, end) => end,
        };
        record.title = self.title;
        record.volume = self.volume;
        record.number = self.number;
        record.citekey = self.citekey;
        record.doi = self.doi;
        record.abstract_text = self.summary;
        record.publisher = self.publisher;
        record.created_at = self.created_at.and_then(apple_timestamp);
        record.read = self.read_status.unwrap_or(0) > 0;
        record.container = match self.bundle {
            Some(bundle) if self.bundle_found => {
                Some(Box::new(Paper::container_placeholder(Identity::new(NAMESPACE, bundle), db.clone())))
            }
            Some(bundle) => {
                tracing::warn!(uuid = %self.uuid, bundle = %bundle, "Bundle missing from the library, no container");
                None
            }
            None => None,
        };
        record
    }
}

/// Connection and locations shared by every entity of one Papers3 library
struct Papers3Db {
    me: Weak<Papers3Db>,
    conn: Connection,
    filebase: Option<PathBuf>,
}

impl Papers3Db {
    fn handle(&self, owner: &Identity) -> std::result::Result<Rc<Self>, ModelError> {
        self.me
            .upgrade()
            .ok_or_else(|| ModelError::load(owner, "connection", "Papers3 library was closed"))
    }

    /// Publications whose `column` equals `value`, ignoring case
    fn summary_rows(&self, column: &str, value: &str) -> Result<Vec<PublicationRow>> {
        let sql = format!("{PUBLICATION_SELECT} WHERE p.{column} = ?1 COLLATE NOCASE");
        tracing::debug!(sql = %sql, "Papers3 summary query");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([value], PublicationRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Up to `limit` publications after `rowid`, in rowid order
    fn summary_page(&self, after: i64, limit: usize) -> Result<Vec<(i64, PublicationRow)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PUBLICATION_SELECT} WHERE p.rowid > ?1 ORDER BY p.rowid LIMIT ?2"))?;
        let rows = stmt
            .query_map(rusqlite::params![after, limit as i64], PublicationRow::from_row)?
            .map(|row| row.map(|row| (row.rowid, row)))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(after, count = rows.len(), "Papers3 summary page");
        Ok(rows)
    }

    fn paper(self: &Rc<Self>, row: PublicationRow) -> Paper {
        let id = Identity::new(NAMESPACE, row.uuid.clone());
        let record = row.into_record(self);
        Paper::from_record(id, record, self.clone())
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.filebase {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn annotation(file: &Identity, row: &Row<'_>) -> rusqlite::Result<Option<Annotation>> {
        let uuid: String = row.get(0)?;
        let page_nr = sqlite::integer(row, 1)?.unwrap_or(0);
        let id = Identity::new(ANNOTATION_NAMESPACE, uuid);
        if page_nr < 1 {
            tracing::warn!(annotation = %id, file = %file, page_nr, "Annotation without page, skipped");
            return Ok(None);
        }

        let mut meta = AnnotationMeta::new(id, (page_nr - 1) as u32);
        meta.created_at = sqlite::real(row, 4)?.and_then(apple_timestamp);
        meta.author = sqlite::text(row, 5)?;
        meta.color = sqlite::integer(row, 6)?.map(AnnotationColor::from_rgb_int);

        let bounds = Rect::new(
            sqlite::real(row, 7)?.unwrap_or(0.0),
            sqlite::real(row, 8)?.unwrap_or(0.0),
            sqlite::real(row, 9)?.unwrap_or(0.0),
            sqlite::real(row, 10)?.unwrap_or(0.0),
        );
        let contents = sqlite::text(row, 2)?;
        let highlighted = sqlite::text(row, 3)?;

        Ok(match (highlighted, contents) {
            (Some(text), _) => Some(Annotation::Highlight(HighlightAnnotation {
                meta,
                boxes: vec![bounds],
                text: Some(text),
            })),
            (None, Some(text)) => Some(Annotation::Note(NoteAnnotation { meta, bounds, text })),
            (None, None) => None,
        })
    }
}

impl PaperLoader for Papers3Db {
    fn load_record(&self, paper: &Identity) -> std::result::Result<PaperRecord, ModelError> {
        let db = self.handle(paper)?;
        let row = self
            .summary_rows("uuid", paper.local_key())
            .for_load(paper, "record")?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::load(paper, "record", "no such publication"))?;
        Ok(row.into_record(&db))
    }

    fn load_authors(&self, paper: &Identity) -> std::result::Result<Vec<Author>, ModelError> {
        tracing::debug!(paper = %paper, "Papers3 authors");
        let mut stmt = self.conn.prepare(AUTHOR_QUERY).for_load(paper, "authors")?;
        let authors = stmt
            .query_map([paper.local_key()], |row| {
                Ok(Author::new(
                    Identity::new(AUTHOR_NAMESPACE, row.get::<_, String>(0)?),
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
        let mut stmt = self.conn.prepare(PDF_QUERY).for_load(paper, "files")?;
        let files = stmt
            .query_map([paper.local_key()], |row| {
                let id = Identity::new(FILE_NAMESPACE, row.get::<_, String>(0)?);
                let path = sqlite::text(row, 1)?.map(|p| self.resolve_path(&p));
                let mime_type = sqlite::text(row, 2)?.map(|m| {
                    if m == PAPERS3_HTML_MIME {
                        "text/html".to_string()
                    } else {
                        m
                    }
                });
                Ok(LinkedFile::new(id, path, db.clone())
                    .with_mime_type(mime_type)
                    .with_title(sqlite::text(row, 3)?))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(paper, "files")?;
        Ok(files)
    }

    fn load_notes(&self, paper: &Identity) -> std::result::Result<Vec<Note>, ModelError> {
        let notes = self
            .conn
            .query_row(NOTES_QUERY, [paper.local_key()], |row| sqlite::text(row, 0))
            .optional()
            .for_load(paper, "notes")?
            .flatten();
        Ok(notes
            .map(|text| Note::plain(Identity::new(NOTE_NAMESPACE, paper.local_key()), None, text))
            .into_iter()
            .collect())
    }
}

impl FileLoader for Papers3Db {
    fn load_annotations(&self, file: &Identity) -> std::result::Result<Vec<Annotation>, ModelError> {
        tracing::debug!(file = %file, "Papers3 annotations");
        let mut stmt = self.conn.prepare(ANNOTATION_QUERY).for_load(file, "annotations")?;
        let annotations = stmt
            .query_map([file.local_key()], |row| Self::annotation(file, row))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(file, "annotations")?;
        Ok(annotations.into_iter().flatten().collect())
    }
}

impl CollectionLoader for Papers3Db {
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

/// A Papers3 library opened read-only
pub struct Papers3 {
    db: Rc<Papers3Db>,
    include_virtual: bool,
}

impl Papers3 {
    pub fn connect(config: &Papers3Config) -> Result<Self> {
        let path = sqlite::require_path(BACKEND, config.dbpath.as_ref())?;
        let conn = sqlite::open_read_only(BACKEND, path, "SELECT * FROM metadata LIMIT 1")?;
        if config.filebase.is_none() {
            tracing::warn!("No Papers3 file base configured, PDF paths stay relative");
        }
        let filebase = config.filebase.clone();
        let db = Rc::new_cyclic(|me| Papers3Db {
            me: me.clone(),
            conn,
            filebase,
        });
        Ok(Self {
            db,
            include_virtual: config.include_virtual,
        })
    }

    fn first(&self, column: &str, value: &str) -> Result<Option<Paper>> {
        Ok(self
            .db
            .summary_rows(column, value)?
            .into_iter()
            .next()
            .map(|row| self.db.paper(row)))
    }
}

impl Source for Papers3 {
    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn publications(&self) -> Result<Publications<'_>> {
        tracing::info!("Reading Papers3 publications");
        let pages = self.db.clone();
        let rows = sqlite::Paged::new(move |after, limit| pages.summary_page(after, limit));
        let db = self.db.clone();
        Ok(Publications::new(rows.map(move |row| row.map(|row| db.paper(row)))))
    }

    fn collections(&self) -> Result<CollectionTree> {
        let sql = format!(
            "SELECT uuid, name, collection_description, created_at, parent, editable FROM Collection{} \
             ORDER BY priority, rowid",
            if self.include_virtual { "" } else { " WHERE editable = 1" }
        );
        tracing::debug!(sql = %sql, "Papers3 collections");
        let mut stmt = self.db.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut tree = CollectionTree::new();
        let mut links = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid: String = row.get(0)?;
            let mut collection = Collection::new(
                Identity::new(COLLECTION_NAMESPACE, uuid),
                sqlite::text(row, 1)?.unwrap_or_default(),
                self.db.clone(),
            )
            .with_description(sqlite::text(row, 2)?)
            .with_created_at(sqlite::real(row, 3)?.and_then(apple_timestamp));
            collection.is_virtual = sqlite::integer(row, 5)?.unwrap_or(1) == 0;

            let parent = sqlite::text(row, 4)?;
            let id = tree.insert(collection)?;
            if let Some(parent) = parent {
                links.push((id, parent));
            }
        }
        tree.link_parents(links)?;
        Ok(tree)
    }

    fn publication(&self, local_key: &str) -> Result<Option<Paper>> {
        self.first("uuid", local_key)
    }

    fn find_by_doi(&self, doi: &str) -> Result<Vec<Paper>> {
        Ok(self
            .db
            .summary_rows("doi", doi)?
            .into_iter()
            .map(|row| self.db.paper(row))
            .collect())
    }

    fn publication_by_uri(&self, uri: &str) -> Result<Option<Paper>> {
        let Some(caps) = PAPERS_URI.captures(uri) else {
            tracing::warn!(uri, "Not a Papers3 URI");
            return Ok(None);
        };
        match &caps[1] {
            "uuid" => self.first("uuid", &caps[2]),
            "doi" => self.first("doi", &caps[2]),
            other => {
                tracing::warn!(uri, kind = other, "Papers3 URI kind not supported");
                Ok(None)
            }
        }
    }
}
