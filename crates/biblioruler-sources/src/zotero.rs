//! Zotero 5+ (`zotero.sqlite`) adapter
//!
//! Item fields live in the entity-attribute-value tables `itemData`,
//! `fieldsCombined` and `itemDataValues`. The summary query pivots the few
//! fields the model needs into columns; creators, tags, attachments, notes and
//! annotations are fetched on demand. Items in the trash (`deletedItems`) are
//! never returned.

use crate::config::ZoteroConfig;
use crate::dates::{sql_timestamp, zotero_date};
use crate::error::{Result, SourceError};
use crate::source::{Publications, Source};
use crate::sqlite::{self, ForLoad};
use biblioruler_domain::{
    Annotation, AnnotationColor, AnnotationMeta, Author, Collection, CollectionLoader,
    CollectionTree, FileLoader, HighlightAnnotation, Identity, LinkedFile, ModelError, Note,
    NoteAnnotation, Paper, PaperLoader, PaperRecord, PublicationType, Rect,
};
use lazy_static::lazy_static;
use regex::Regex;
use rusqlite::{Connection, Row};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

pub const NAMESPACE: &str = "zotero";
const AUTHOR_NAMESPACE: &str = "zotero-author";
const COLLECTION_NAMESPACE: &str = "zotero-collection";
const CONTAINER_NAMESPACE: &str = "zotero-container";
const FILE_NAMESPACE: &str = "zotero-file";
const NOTE_NAMESPACE: &str = "zotero-note";
const ANNOTATION_NAMESPACE: &str = "zotero-annotation";

const BACKEND: &str = "Zotero";

/// Fields pivoted into the summary query, in column order
const SUMMARY_FIELDS: [&str; 11] = [
    "title",
    "date",
    "DOI",
    "volume",
    "issue",
    "number",
    "pages",
    "abstractNote",
    "publisher",
    "publicationTitle",
    "citationKey",
];

/// Columns before the pivoted fields
const SUMMARY_FIXED_COLUMNS: usize = 4;

const NOT_DELETED: &str = "NOT IN (SELECT itemID FROM deletedItems)";

/// `linkMode` of attachments that only store a URL
const LINK_MODE_LINKED_URL: i64 = 3;

/// `itemAnnotations.type` values
const ANNOTATION_HIGHLIGHT: i64 = 1;
const ANNOTATION_NOTE: i64 = 2;
const ANNOTATION_UNDERLINE: i64 = 5;

fn field_value(item: &str, field: &str) -> String {
    format!(
        "(SELECT v.value FROM itemData d \
         JOIN fieldsCombined fc ON d.fieldID = fc.fieldID \
         JOIN itemDataValues v ON d.valueID = v.valueID \
         WHERE d.itemID = {item}.itemID AND fc.fieldName = '{field}')"
    )
}

lazy_static! {
    static ref SUMMARY_SELECT: String = {
        let fields: Vec<String> = SUMMARY_FIELDS.iter().map(|f| field_value("i", f)).collect();
        format!(
            "SELECT i.key, i.libraryID, t.typeName, i.dateAdded, {}, i.itemID \
             FROM items i JOIN itemTypes t ON i.itemTypeID = t.itemTypeID \
             WHERE t.typeName NOT IN ('attachment', 'note', 'annotation') \
             AND i.itemID {NOT_DELETED}",
            fields.join(", ")
        )
    };
    static ref FILES_QUERY: String = format!(
        "SELECT i.key, a.path, a.contentType, a.linkMode, {} \
         FROM itemAttachments a \
         JOIN items i ON a.itemID = i.itemID \
         JOIN items p ON a.parentItemID = p.itemID \
         WHERE p.key = ?1 AND a.itemID {NOT_DELETED} ORDER BY i.itemID",
        field_value("i", "title")
    );
    static ref ZOTERO_URI: Regex = Regex::new(r"^zotero://select/items/(\d+)_(.+)$").unwrap();
}

const AUTHOR_QUERY: &str = "SELECT c.creatorID, c.firstName, c.lastName, ct.creatorType \
     FROM itemCreators ic \
     JOIN creators c ON ic.creatorID = c.creatorID \
     JOIN creatorTypes ct ON ic.creatorTypeID = ct.creatorTypeID \
     JOIN items i ON ic.itemID = i.itemID \
     WHERE i.key = ?1 ORDER BY ic.orderIndex";

const TAG_QUERY: &str = "SELECT t.name FROM itemTags it \
     JOIN tags t ON it.tagID = t.tagID \
     JOIN items i ON it.itemID = i.itemID WHERE i.key = ?1";

const NOTES_QUERY: &str = "SELECT i.key, n.title, n.note FROM itemNotes n \
     JOIN items i ON n.itemID = i.itemID \
     JOIN items p ON n.parentItemID = p.itemID \
     WHERE p.key = ?1 AND n.itemID NOT IN (SELECT itemID FROM deletedItems) ORDER BY i.itemID";

const ANNOTATION_QUERY: &str = "SELECT i.key, a.type, a.text, a.comment, a.color, a.position, \
     a.authorName, i.dateAdded FROM itemAnnotations a \
     JOIN items i ON a.itemID = i.itemID \
     JOIN items f ON a.parentItemID = f.itemID \
     WHERE f.key = ?1 AND a.itemID NOT IN (SELECT itemID FROM deletedItems) \
     ORDER BY a.sortIndex, i.itemID";

const COLLECTIONS_QUERY: &str = "SELECT collectionID, key, collectionName, parentCollectionID, \
     clientDateModified FROM collections ORDER BY collectionID";

const MEMBERS_QUERY: &str = "SELECT i.key FROM collectionItems ci \
     JOIN collections c ON ci.collectionID = c.collectionID \
     JOIN items i ON ci.itemID = i.itemID \
     WHERE c.key = ?1 AND ci.itemID NOT IN (SELECT itemID FROM deletedItems) \
     ORDER BY ci.orderIndex";

const FIND_QUERY: &str = "SELECT i.key FROM itemData d \
     JOIN fieldsCombined fc ON d.fieldID = fc.fieldID \
     JOIN itemDataValues v ON d.valueID = v.valueID \
     JOIN items i ON d.itemID = i.itemID \
     WHERE fc.fieldName = ?1 AND v.value LIKE ?2 \
     AND i.itemID NOT IN (SELECT itemID FROM deletedItems) ORDER BY i.itemID";

const DOI_QUERY: &str = "SELECT i.key FROM itemData d \
     JOIN fieldsCombined fc ON d.fieldID = fc.fieldID \
     JOIN itemDataValues v ON d.valueID = v.valueID \
     JOIN items i ON d.itemID = i.itemID \
     WHERE fc.fieldName = 'DOI' AND lower(trim(v.value)) = lower(trim(?1)) \
     AND i.itemID NOT IN (SELECT itemID FROM deletedItems) ORDER BY i.itemID";

/// Canonical type of a Zotero item type name
pub fn publication_type(type_name: &str) -> Option<PublicationType> {
    use PublicationType::*;
    Some(match type_name {
        "journalArticle" => ArticleJournal,
        "magazineArticle" => ArticleMagazine,
        "newspaperArticle" => ArticleNewspaper,
        "preprint" | "document" => Article,
        "book" => Book,
        "bookSection" => Chapter,
        "conferencePaper" => PaperConference,
        "thesis" => Thesis,
        "report" => Report,
        "webpage" => Webpage,
        "patent" => Patent,
        "manuscript" => Manuscript,
        "letter" | "email" | "instantMessage" => PersonalCommunication,
        "interview" => Interview,
        "film" | "videoRecording" => MotionPicture,
        "artwork" => Graphic,
        "map" => Map,
        "blogPost" => PostWeblog,
        "forumPost" => Post,
        "bill" | "hearing" => Bill,
        "case" => LegalCase,
        "statute" => Legislation,
        "encyclopediaArticle" => EntryEncyclopedia,
        "dictionaryEntry" => EntryDictionary,
        "presentation" => Speech,
        "audioRecording" => Song,
        "podcast" | "radioBroadcast" | "tvBroadcast" => Broadcast,
        "dataset" => Dataset,
        _ => return None,
    })
}

/// Type of the bundle a Zotero `publicationTitle` names
fn container_type(kind: PublicationType) -> PublicationType {
    match kind {
        PublicationType::Chapter | PublicationType::EntryEncyclopedia | PublicationType::EntryDictionary => {
            PublicationType::Book
        }
        PublicationType::PaperConference => PublicationType::Proceedings,
        _ => PublicationType::Journal,
    }
}

/// `zotero://select/items/<library>_<key>`
pub fn publication_uri(library_id: i64, key: &str) -> String {
    format!("zotero://select/items/{library_id}_{key}")
}

/// Position of a Zotero 6+ annotation on its page
#[derive(Debug, Deserialize)]
struct AnnotationPosition {
    #[serde(rename = "pageIndex")]
    page_index: u32,
    #[serde(default)]
    rects: Vec<[f64; 4]>,
}

impl AnnotationPosition {
    fn boxes(&self) -> Vec<Rect> {
        self.rects
            .iter()
            .map(|[x1, y1, x2, y2]| Rect::from_corners(*x1, *y1, *x2, *y2))
            .collect()
    }
}

struct ItemRow {
    key: String,
    library_id: i64,
    type_name: String,
    date_added: Option<String>,
    fields: HashMap<&'static str, String>,
    item_id: i64,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mut fields = HashMap::new();
        for (offset, name) in SUMMARY_FIELDS.iter().enumerate() {
            if let Some(value) = sqlite::text(row, SUMMARY_FIXED_COLUMNS + offset)? {
                fields.insert(*name, value);
            }
        }
        Ok(Self {
            key: row.get(0)?,
            library_id: sqlite::integer(row, 1)?.unwrap_or(1),
            type_name: row.get(2)?,
            date_added: sqlite::text(row, 3)?,
            fields,
            item_id: row.get(SUMMARY_FIXED_COLUMNS + SUMMARY_FIELDS.len())?,
        })
    }

    fn into_record(mut self) -> PaperRecord {
        let mut record = PaperRecord::new();
        let kind = publication_type(&self.type_name).unwrap_or_else(|| {
            tracing::warn!(key = %self.key, item_type = %self.type_name, "Unmapped Zotero item type, using entry");
            PublicationType::Entry
        });
        record.set_kind(kind);

        if let Some(date) = self.fields.remove("date") {
            let date = zotero_date(&date);
            record.month = date.month;
            record.year = date.year;
        }
        record.uri = Some(publication_uri(self.library_id, &self.key));
        record.created_at = self.date_added.as_deref().and_then(sql_timestamp);

        let mut take = |name: &str| self.fields.remove(name);
        record.title = take("title");
        record.doi = take("DOI");
        record.volume = take("volume");
        record.number = take("issue").or_else(|| take("number"));
        record.pages = take("pages");
        record.abstract_text = take("abstractNote");
        record.publisher = take("publisher");
        record.citekey = take("citationKey");
        record.container = take("publicationTitle").map(|title| {
            let mut bundle = PaperRecord::new();
            bundle.title = Some(title);
            bundle.set_kind(container_type(kind));
            Box::new(Paper::detached(Identity::new(CONTAINER_NAMESPACE, self.key.clone()), bundle))
        });
        record
    }
}

/// Connection and locations shared by every entity of one Zotero profile
struct ZoteroDb {
    me: Weak<ZoteroDb>,
    conn: Connection,
    storage_dir: Option<PathBuf>,
    filebase: Option<PathBuf>,
    has_annotations: bool,
}

impl ZoteroDb {
    fn handle(&self, owner: &Identity) -> std::result::Result<Rc<Self>, ModelError> {
        self.me
            .upgrade()
            .ok_or_else(|| ModelError::load(owner, "connection", "Zotero database was closed"))
    }

    fn item_rows(&self, key: &str) -> Result<Vec<ItemRow>> {
        let mut stmt = self.conn.prepare(&format!("{} AND i.key = ?1", *SUMMARY_SELECT))?;
        let rows = stmt
            .query_map([key], ItemRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Up to `limit` items after `after`, in itemID order
    fn item_page(&self, after: i64, limit: usize) -> Result<Vec<(i64, ItemRow)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} AND i.itemID > ?1 ORDER BY i.itemID LIMIT ?2", *SUMMARY_SELECT))?;
        let rows = stmt
            .query_map(rusqlite::params![after, limit as i64], ItemRow::from_row)?
            .map(|row| row.map(|row| (row.item_id, row)))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        tracing::debug!(after, count = rows.len(), "Zotero summary page");
        Ok(rows)
    }

    fn paper(self: &Rc<Self>, row: ItemRow) -> Paper {
        let id = Identity::new(NAMESPACE, row.key.clone());
        Paper::from_record(id, row.into_record(), self.clone())
    }

    /// Resolve the three attachment path forms Zotero stores
    fn attachment_path(&self, attachment_key: &str, raw: &str) -> Option<PathBuf> {
        if let Some(name) = raw.strip_prefix("storage:") {
            return self
                .storage_dir
                .as_ref()
                .map(|dir| dir.join(attachment_key).join(name));
        }
        if let Some(relative) = raw.strip_prefix("attachments:") {
            return match &self.filebase {
                Some(base) => Some(base.join(relative)),
                None => {
                    tracing::warn!(attachment = attachment_key, "No Zotero base attachment path configured");
                    None
                }
            };
        }
        Some(PathBuf::from(raw))
    }

    fn annotation(file: &Identity, row: &Row<'_>) -> rusqlite::Result<Option<Annotation>> {
        let id = Identity::new(ANNOTATION_NAMESPACE, row.get::<_, String>(0)?);
        let kind = sqlite::integer(row, 1)?.unwrap_or(0);
        let position = match sqlite::text(row, 5)?
            .map(|json| serde_json::from_str::<AnnotationPosition>(&json))
        {
            Some(Ok(position)) => position,
            Some(Err(e)) => {
                tracing::warn!(annotation = %id, file = %file, error = %e, "Unreadable annotation position");
                return Ok(None);
            }
            None => return Ok(None),
        };

        let mut meta = AnnotationMeta::new(id, position.page_index);
        meta.color = sqlite::text(row, 4)?.as_deref().and_then(AnnotationColor::from_hex);
        meta.author = sqlite::text(row, 6)?;
        meta.created_at = sqlite::text(row, 7)?.as_deref().and_then(sql_timestamp);
        let boxes = position.boxes();

        Ok(match kind {
            ANNOTATION_HIGHLIGHT | ANNOTATION_UNDERLINE => Some(Annotation::Highlight(HighlightAnnotation {
                meta,
                boxes,
                text: sqlite::text(row, 2)?,
            })),
            ANNOTATION_NOTE => Some(Annotation::Note(NoteAnnotation {
                meta,
                bounds: boxes.first().copied().unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0)),
                text: sqlite::text(row, 3)?.unwrap_or_default(),
            })),
            other => {
                tracing::debug!(annotation = %meta.id, kind = other, "Skipping image/ink annotation");
                None
            }
        })
    }

    fn keys(&self, sql: &str, owner: &Identity, capability: &'static str, params: &[&str]) -> std::result::Result<Vec<String>, ModelError> {
        let mut stmt = self.conn.prepare(sql).for_load(owner, capability)?;
        let keys = stmt
            .query_map(rusqlite::params_from_iter(params), |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(owner, capability)?;
        Ok(keys)
    }
}

impl PaperLoader for ZoteroDb {
    fn load_record(&self, paper: &Identity) -> std::result::Result<PaperRecord, ModelError> {
        self.item_rows(paper.local_key())
            .for_load(paper, "record")?
            .into_iter()
            .next()
            .map(ItemRow::into_record)
            .ok_or_else(|| ModelError::load(paper, "record", "no such item"))
    }

    fn load_authors(&self, paper: &Identity) -> std::result::Result<Vec<Author>, ModelError> {
        tracing::debug!(paper = %paper, "Zotero creators");
        let mut stmt = self.conn.prepare(AUTHOR_QUERY).for_load(paper, "authors")?;
        let creators = stmt
            .query_map([paper.local_key()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    sqlite::text(row, 1)?,
                    sqlite::text(row, 2)?,
                    sqlite::text(row, 3)?,
                ))
            })
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(paper, "authors")?;

        Ok(creators
            .into_iter()
            .filter(|(id, _, _, role)| {
                let is_author = role.as_deref() == Some("author");
                if !is_author {
                    tracing::debug!(paper = %paper, creator = id, role = ?role, "Skipping non-author creator");
                }
                is_author
            })
            .map(|(id, first, last, _)| Author::new(Identity::new(AUTHOR_NAMESPACE, id.to_string()), first, last))
            .collect())
    }

    fn load_keywords(&self, paper: &Identity) -> std::result::Result<BTreeSet<String>, ModelError> {
        Ok(self
            .keys(TAG_QUERY, paper, "keywords", &[paper.local_key()])?
            .into_iter()
            .collect())
    }

    fn load_files(&self, paper: &Identity) -> std::result::Result<Vec<LinkedFile>, ModelError> {
        let db = self.handle(paper)?;
        let mut stmt = self.conn.prepare(FILES_QUERY.as_str()).for_load(paper, "files")?;
        let files = stmt.query_map([paper.local_key()], |row| {
            let key: String = row.get(0)?;
            let link_mode = sqlite::integer(row, 3)?.unwrap_or(0);
            let path = match sqlite::text(row, 1)? {
                Some(raw) if link_mode != LINK_MODE_LINKED_URL => self.attachment_path(&key, &raw),
                _ => None,
            };
            Ok(LinkedFile::new(Identity::new(FILE_NAMESPACE, key), path, db.clone())
                .with_mime_type(sqlite::text(row, 2)?)
                .with_title(sqlite::text(row, 4)?))
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .for_load(paper, "files")?;
        Ok(files)
    }

    fn load_notes(&self, paper: &Identity) -> std::result::Result<Vec<Note>, ModelError> {
        let mut stmt = self.conn.prepare(NOTES_QUERY).for_load(paper, "notes")?;
        let notes = stmt.query_map([paper.local_key()], |row| {
            Ok(Note::html(
                Identity::new(NOTE_NAMESPACE, row.get::<_, String>(0)?),
                sqlite::text(row, 1)?,
                sqlite::text(row, 2)?.unwrap_or_default(),
            ))
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .for_load(paper, "notes")?;
        Ok(notes)
    }
}

impl FileLoader for ZoteroDb {
    fn load_annotations(&self, file: &Identity) -> std::result::Result<Vec<Annotation>, ModelError> {
        if !self.has_annotations {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(ANNOTATION_QUERY).for_load(file, "annotations")?;
        let annotations = stmt
            .query_map([file.local_key()], |row| Self::annotation(file, row))
            .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
            .for_load(file, "annotations")?;
        Ok(annotations.into_iter().flatten().collect())
    }
}

impl CollectionLoader for ZoteroDb {
    fn load_publications(&self, collection: &Identity) -> std::result::Result<Vec<Paper>, ModelError> {
        let db = self.handle(collection)?;
        Ok(self
            .keys(MEMBERS_QUERY, collection, "publications", &[collection.local_key()])?
            .into_iter()
            .map(|key| Paper::placeholder(Identity::new(NAMESPACE, key), db.clone()))
            .collect())
    }
}

/// A Zotero profile database opened read-only
pub struct Zotero {
    db: Rc<ZoteroDb>,
}

impl Zotero {
    pub fn connect(config: &ZoteroConfig) -> Result<Self> {
        let path = sqlite::require_path(BACKEND, config.dbpath.as_ref())?;
        let read_path = if config.copy {
            copy_database(path)?
        } else {
            path.to_path_buf()
        };
        let conn = sqlite::open_read_only(BACKEND, &read_path, "SELECT * FROM itemAttachments LIMIT 1")?;
        let has_annotations = sqlite::table_exists(&conn, "itemAnnotations")?;
        if !has_annotations {
            tracing::info!("Zotero database predates itemAnnotations, files have no annotations");
        }
        let storage_dir = config.storage_dir();
        let filebase = config.filebase.clone();
        let db = Rc::new_cyclic(|me| ZoteroDb {
            me: me.clone(),
            conn,
            storage_dir,
            filebase,
            has_annotations,
        });
        Ok(Self { db })
    }

    /// Papers whose `field` matches `pattern` (SQL `LIKE`)
    pub fn find_by(&self, field: &str, pattern: &str) -> Result<Vec<Paper>> {
        tracing::debug!(field, pattern, "Zotero field lookup");
        self.papers_by_key(FIND_QUERY, &[field, pattern])
    }

    fn papers_by_key(&self, sql: &str, params: &[&str]) -> Result<Vec<Paper>> {
        let owner = Identity::new(NAMESPACE, "*");
        let keys = self.db.keys(sql, &owner, "find", params)?;
        let mut papers = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(paper) = self.publication(&key)? {
                papers.push(paper);
            }
        }
        Ok(papers)
    }

    pub fn find_by_title(&self, title: &str) -> Result<Vec<Paper>> {
        self.find_by("title", title)
    }
}

/// Copy `path` to `<name>.ro.sqlite` next to it and return the copy
fn copy_database(path: &Path) -> Result<PathBuf> {
    let copy = path.with_extension("ro.sqlite");
    std::fs::copy(path, &copy).map_err(|e| SourceError::connection(BACKEND, path, format!("copy failed: {e}")))?;
    tracing::info!(copy = %copy.display(), "Reading a copy of the Zotero database");
    Ok(copy)
}

impl Source for Zotero {
    fn namespace(&self) -> &'static str {
        NAMESPACE
    }

    fn publications(&self) -> Result<Publications<'_>> {
        tracing::info!("Reading Zotero items");
        let pages = self.db.clone();
        let rows = sqlite::Paged::new(move |after, limit| pages.item_page(after, limit));
        let db = self.db.clone();
        Ok(Publications::new(rows.map(move |row| row.map(|row| db.paper(row)))))
    }

    fn collections(&self) -> Result<CollectionTree> {
        let mut stmt = self.db.conn.prepare(COLLECTIONS_QUERY)?;
        let mut rows = stmt.query([])?;

        let mut tree = CollectionTree::new();
        let mut keys_by_id = HashMap::new();
        let mut parents = Vec::new();
        while let Some(row) = rows.next()? {
            let collection_id: i64 = row.get(0)?;
            let key: String = row.get(1)?;
            let collection = Collection::new(
                Identity::new(COLLECTION_NAMESPACE, key.clone()),
                sqlite::text(row, 2)?.unwrap_or_default(),
                self.db.clone(),
            )
            .with_created_at(sqlite::text(row, 4)?.as_deref().and_then(sql_timestamp));
            let id = tree.insert(collection)?;
            keys_by_id.insert(collection_id, key);
            if let Some(parent) = sqlite::integer(row, 3)? {
                parents.push((id, parent));
            }
        }

        let links = parents.into_iter().map(|(id, parent)| {
            let key = keys_by_id.get(&parent).cloned().unwrap_or_else(|| format!("#{parent}"));
            (id, key)
        });
        tree.link_parents(links)?;
        Ok(tree)
    }

    fn publication(&self, local_key: &str) -> Result<Option<Paper>> {
        Ok(self
            .db
            .item_rows(local_key)?
            .into_iter()
            .next()
            .map(|row| self.db.paper(row)))
    }

    fn find_by_doi(&self, doi: &str) -> Result<Vec<Paper>> {
        self.papers_by_key(DOI_QUERY, &[doi])
    }

    fn publication_by_uri(&self, uri: &str) -> Result<Option<Paper>> {
        match ZOTERO_URI.captures(uri) {
            Some(caps) => self.publication(&caps[2]),
            None => {
                tracing::warn!(uri, "Not a Zotero URI");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_table() {
        assert_eq!(publication_type("journalArticle"), Some(PublicationType::ArticleJournal));
        assert_eq!(publication_type("bookSection"), Some(PublicationType::Chapter));
        assert_eq!(publication_type("computerProgram"), None);
    }

    #[test]
    fn test_container_type_follows_item_type() {
        assert_eq!(container_type(PublicationType::Chapter), PublicationType::Book);
        assert_eq!(container_type(PublicationType::PaperConference), PublicationType::Proceedings);
        assert_eq!(container_type(PublicationType::ArticleJournal), PublicationType::Journal);
    }

    #[test]
    fn test_position_rects_become_boxes() {
        let position: AnnotationPosition =
            serde_json::from_str(r#"{"pageIndex": 3, "rects": [[10, 700, 200, 712], [10, 688, 120, 700]]}"#)
                .unwrap();
        assert_eq!(position.page_index, 3);
        let boxes = position.boxes();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0], Rect::new(10.0, 700.0, 190.0, 12.0));
    }

    #[test]
    fn test_uri() {
        assert_eq!(publication_uri(1, "ABCD1234"), "zotero://select/items/1_ABCD1234");
        let caps = ZOTERO_URI.captures("zotero://select/items/1_ABCD1234").unwrap();
        assert_eq!(&caps[2], "ABCD1234");
    }
}
