//! Small on-disk databases shaped like each backend's schema

use rusqlite::Connection;
use std::path::{Path, PathBuf};

fn create(path: PathBuf, sql: &str) -> PathBuf {
    let conn = Connection::open(&path).unwrap_or_else(|e| panic!("Failed to create {}: {e}", path.display()));
    conn.execute_batch(sql)
        .unwrap_or_else(|e| panic!("Failed to populate {}: {e}", path.display()));
    path
}

/// An SQLite file that belongs to none of the backends
#[allow(dead_code)]
pub fn unrelated_database(dir: &Path) -> PathBuf {
    create(dir.join("other.sqlite"), "CREATE TABLE things (id INTEGER PRIMARY KEY);")
}

/// A Papers3 library with one conference paper inside a journal bundle
#[allow(dead_code)]
pub fn papers3_library(dir: &Path) -> PathBuf {
    create(
        dir.join("Database.papersdb"),
        r#"
        CREATE TABLE metadata (key TEXT, value TEXT);
        INSERT INTO metadata VALUES ('version', '3');

        CREATE TABLE Publication (
            uuid TEXT PRIMARY KEY, attributed_title TEXT, type INTEGER, publication_date TEXT,
            bundle TEXT, volume TEXT, number TEXT, startpage TEXT, endpage TEXT, citekey TEXT,
            doi TEXT, summary TEXT, publisher TEXT, created_at REAL, read_status INTEGER, notes TEXT
        );
        INSERT INTO Publication VALUES
            ('P1', 'Deep Nets', 400, '99200406011200000000222000', 'J1', '12', '3', '101', '110',
             'doe2004', '10.1000/DEEP', 'An abstract', 'ACM', 86400.0, 1, 'Read twice'),
            ('J1', 'Journal of Nets', -100, NULL, NULL, NULL, NULL, NULL, NULL,
             NULL, NULL, NULL, NULL, NULL, 0, NULL);

        CREATE TABLE Author (uuid TEXT PRIMARY KEY, prename TEXT, surname TEXT);
        INSERT INTO Author VALUES ('A1', 'Jane', 'Doe'), ('A2', 'John', 'Smith');
        CREATE TABLE OrderedAuthor (object_id TEXT, author_id TEXT, priority INTEGER);
        INSERT INTO OrderedAuthor VALUES ('P1', 'A2', 1), ('P1', 'A1', 0);

        CREATE TABLE Keyword (uuid TEXT PRIMARY KEY, name TEXT);
        INSERT INTO Keyword VALUES ('K1', 'networks'), ('K2', 'learning');
        CREATE TABLE KeywordItem (object_id TEXT, keyword_id TEXT);
        INSERT INTO KeywordItem VALUES ('P1', 'K1'), ('P1', 'K2');

        CREATE TABLE PDF (
            uuid TEXT PRIMARY KEY, object_id TEXT, path TEXT, mime_type TEXT,
            caption TEXT, is_primary INTEGER
        );
        INSERT INTO PDF VALUES
            ('F1', 'P1', 'Files/D/deep.pdf', 'application/pdf', 'Main text', 1),
            ('F2', 'P1', 'Files/D/deep.html', 'application/vnd.mekentosj.papers3.html', NULL, 0);

        CREATE TABLE Annotation (
            uuid TEXT PRIMARY KEY, object_id TEXT, page_nr INTEGER, contents TEXT, text TEXT,
            created_at REAL, created_by TEXT, color INTEGER,
            left REAL, top REAL, width REAL, height REAL
        );
        INSERT INTO Annotation VALUES
            ('N1', 'F1', 1, 'Check this', NULL, 0.0, 'jane', 16711680, 10, 20, 0, 0),
            ('H1', 'F1', 3, NULL, 'important sentence', 0.0, 'jane', 16776960, 50, 60, 200, 12),
            ('X1', 'F1', 0, 'no page', NULL, 0.0, NULL, NULL, 0, 0, 0, 0),
            ('E1', 'F1', 2, NULL, '   ', 0.0, NULL, NULL, 0, 0, 0, 0);

        CREATE TABLE Collection (
            uuid TEXT PRIMARY KEY, name TEXT, collection_description TEXT, created_at REAL,
            parent TEXT, editable INTEGER, priority INTEGER
        );
        INSERT INTO Collection VALUES
            ('C3', 'Gamma', NULL, NULL, 'C2', 1, 2),
            ('C1', 'Alpha', 'Top level', 0.0, NULL, 1, 0),
            ('C2', 'Beta', NULL, NULL, 'C1', 1, 1),
            ('S1', 'Recently Read', NULL, NULL, NULL, 0, 3),
            ('O1', 'Orphan', NULL, NULL, 'GONE', 1, 4);

        CREATE TABLE CollectionItem (collection TEXT, object_id TEXT);
        INSERT INTO CollectionItem VALUES ('C2', 'P1');
        "#,
    )
}

/// A Zotero profile database with annotations, a trashed item and a
/// creator who is not an author
#[allow(dead_code)]
pub fn zotero_profile(dir: &Path) -> PathBuf {
    create(
        dir.join("zotero.sqlite"),
        r#"
        CREATE TABLE itemTypes (itemTypeID INTEGER PRIMARY KEY, typeName TEXT);
        INSERT INTO itemTypes VALUES
            (1, 'journalArticle'), (2, 'bookSection'), (3, 'computerProgram'),
            (4, 'attachment'), (5, 'note'), (6, 'annotation');

        CREATE TABLE items (
            itemID INTEGER PRIMARY KEY, itemTypeID INTEGER, dateAdded TEXT,
            libraryID INTEGER, key TEXT UNIQUE
        );
        INSERT INTO items VALUES
            (1, 1, '2019-05-04 10:11:12', 1, 'ART00001'),
            (2, 2, '2019-05-05 10:11:12', 1, 'CHP00002'),
            (3, 3, '2019-05-06 10:11:12', 1, 'SFT00003'),
            (4, 1, '2019-05-07 10:11:12', 1, 'DEL00004'),
            (5, 4, '2019-05-04 10:11:12', 1, 'ATT00005'),
            (6, 5, '2019-05-04 10:11:12', 1, 'NTE00006'),
            (7, 6, '2019-05-08 10:11:12', 1, 'ANN00007'),
            (8, 6, '2019-05-08 10:11:12', 1, 'ANN00008'),
            (9, 4, '2019-05-04 10:11:12', 1, 'URL00009'),
            (10, 6, '2019-05-08 10:11:12', 1, 'ANN00010');

        CREATE TABLE deletedItems (itemID INTEGER PRIMARY KEY);
        INSERT INTO deletedItems VALUES (4);

        CREATE TABLE fieldsCombined (fieldID INTEGER PRIMARY KEY, fieldName TEXT);
        INSERT INTO fieldsCombined VALUES
            (1, 'title'), (2, 'date'), (3, 'DOI'), (4, 'publicationTitle'), (5, 'volume'), (6, 'pages');
        CREATE TABLE itemDataValues (valueID INTEGER PRIMARY KEY, value TEXT);
        INSERT INTO itemDataValues VALUES
            (1, 'Deep Nets'), (2, '2004-06-00 June 2004'), (3, '10.1000/DEEP'),
            (4, 'Journal of Nets'), (5, 'A Chapter'), (6, 'The Handbook'),
            (7, 'A Tool'), (8, 'Trashed'), (9, 'paper.pdf'), (10, '12'), (11, '101-110');
        CREATE TABLE itemData (itemID INTEGER, fieldID INTEGER, valueID INTEGER);
        INSERT INTO itemData VALUES
            (1, 1, 1), (1, 2, 2), (1, 3, 3), (1, 4, 4), (1, 5, 10), (1, 6, 11),
            (2, 1, 5), (2, 4, 6),
            (3, 1, 7),
            (4, 1, 8),
            (5, 1, 9);

        CREATE TABLE creatorTypes (creatorTypeID INTEGER PRIMARY KEY, creatorType TEXT);
        INSERT INTO creatorTypes VALUES (1, 'author'), (2, 'editor');
        CREATE TABLE creators (creatorID INTEGER PRIMARY KEY, firstName TEXT, lastName TEXT);
        INSERT INTO creators VALUES (1, 'Jane', 'Doe'), (2, 'Ed', 'Itor'), (3, 'John', 'Smith');
        CREATE TABLE itemCreators (itemID INTEGER, creatorID INTEGER, creatorTypeID INTEGER, orderIndex INTEGER);
        INSERT INTO itemCreators VALUES (1, 3, 1, 1), (1, 1, 1, 0), (1, 2, 2, 2);

        CREATE TABLE tags (tagID INTEGER PRIMARY KEY, name TEXT);
        INSERT INTO tags VALUES (1, 'networks'), (2, 'learning');
        CREATE TABLE itemTags (itemID INTEGER, tagID INTEGER);
        INSERT INTO itemTags VALUES (1, 1), (1, 2);

        CREATE TABLE itemAttachments (
            itemID INTEGER PRIMARY KEY, parentItemID INTEGER, linkMode INTEGER,
            contentType TEXT, path TEXT
        );
        INSERT INTO itemAttachments VALUES
            (5, 1, 0, 'application/pdf', 'storage:paper.pdf'),
            (9, 1, 3, 'text/html', 'https://example.org/deep');

        CREATE TABLE itemNotes (itemID INTEGER PRIMARY KEY, parentItemID INTEGER, note TEXT, title TEXT);
        INSERT INTO itemNotes VALUES (6, 1, '<div><p>Read <b>twice</b></p></div>', 'Read twice');

        CREATE TABLE itemAnnotations (
            itemID INTEGER PRIMARY KEY, parentItemID INTEGER, type INTEGER, authorName TEXT,
            text TEXT, comment TEXT, color TEXT, pageLabel TEXT, sortIndex TEXT, position TEXT
        );
        INSERT INTO itemAnnotations VALUES
            (7, 5, 1, 'jane', 'important sentence', NULL, '#ffd400', '3', '00002|000100|00050',
             '{"pageIndex":2,"rects":[[50,60,250,72],[50,40,180,52]]}'),
            (8, 5, 3, 'jane', NULL, NULL, '#ffd400', '1', '00000|000000|00000',
             '{"pageIndex":0,"rects":[[0,0,100,100]]}'),
            (10, 5, 2, 'jane', NULL, 'Check this', '#ff6666', '1', '00000|000010|00010',
             '{"pageIndex":0,"rects":[[10,20,32,42]]}');

        CREATE TABLE collections (
            collectionID INTEGER PRIMARY KEY, collectionName TEXT, parentCollectionID INTEGER,
            clientDateModified TEXT, libraryID INTEGER, key TEXT UNIQUE
        );
        INSERT INTO collections VALUES
            (1, 'Alpha', NULL, '2019-01-01 00:00:00', 1, 'COLALPHA'),
            (2, 'Beta', 1, '2019-01-01 00:00:00', 1, 'COLBETA0'),
            (3, 'Gamma', 2, '2019-01-01 00:00:00', 1, 'COLGAMMA'),
            (4, 'Orphan', 99, '2019-01-01 00:00:00', 1, 'COLORPHN');

        CREATE TABLE collectionItems (collectionID INTEGER, itemID INTEGER, orderIndex INTEGER);
        INSERT INTO collectionItems VALUES (1, 1, 0), (1, 4, 1), (3, 2, 0);
        "#,
    )
}

/// A Zotero database from before annotations were stored in it
#[allow(dead_code)]
pub fn zotero_profile_without_annotations(dir: &Path) -> PathBuf {
    let path = zotero_profile(dir);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("DROP TABLE itemAnnotations;").unwrap();
    path
}

/// A Mendeley Desktop database with one mapped and one unmapped document type
#[allow(dead_code)]
pub fn mendeley_database(dir: &Path) -> PathBuf {
    create(
        dir.join("jane@www.mendeley.com.sqlite"),
        r#"
        CREATE TABLE DocumentZotero (documentId INTEGER, zoteroID INTEGER, lastSyncTime INTEGER);

        CREATE TABLE Documents (
            id INTEGER PRIMARY KEY, uuid TEXT, type TEXT, title TEXT, year INTEGER, month INTEGER,
            read TEXT, abstract TEXT, doi TEXT, volume TEXT, issue TEXT, pages TEXT,
            publisher TEXT, citationKey TEXT, added INTEGER, publication TEXT, note TEXT,
            deletionPending TEXT
        );
        INSERT INTO Documents VALUES
            (1, '{D1}', 'JournalArticle', 'Deep Nets', 2004, 6, 'true', 'An abstract',
             '10.1000/DEEP', '12', '3', '101-110', 'ACM', NULL, 1557000000, 'Journal of Nets',
             '<p>Read twice</p>', 'false'),
            (2, '{D2}', 'ComputerProgram', 'A Tool', 2010, 0, 'false', NULL,
             NULL, NULL, NULL, NULL, NULL, NULL, 1557000000, NULL, NULL, 'false'),
            (3, '{D3}', 'JournalArticle', 'Trashed', 2001, 1, 'false', NULL,
             NULL, NULL, NULL, NULL, NULL, NULL, 1557000000, NULL, NULL, 'true');

        CREATE TABLE DocumentContributors (
            id INTEGER PRIMARY KEY, documentId INTEGER, contribution TEXT, firstNames TEXT, lastName TEXT
        );
        INSERT INTO DocumentContributors VALUES
            (1, 1, 'DocumentAuthor', 'Jane', 'Doe'),
            (2, 1, 'DocumentEditor', 'Ed', 'Itor'),
            (3, 1, 'DocumentAuthor', 'John', 'Smith');

        CREATE TABLE DocumentKeywords (documentId INTEGER, keyword TEXT);
        INSERT INTO DocumentKeywords VALUES (1, 'networks');
        CREATE TABLE DocumentTags (documentId INTEGER, tag TEXT);
        INSERT INTO DocumentTags VALUES (1, 'learning'), (1, 'networks');

        CREATE TABLE Files (hash TEXT PRIMARY KEY, localUrl TEXT);
        INSERT INTO Files VALUES ('abc123', 'file:///papers/Deep%20Nets.pdf');
        CREATE TABLE DocumentFiles (documentId INTEGER, hash TEXT, unlinked TEXT);
        INSERT INTO DocumentFiles VALUES (1, 'abc123', 'false');

        CREATE TABLE FileHighlights (
            id INTEGER PRIMARY KEY, author TEXT, uuid TEXT, documentId INTEGER, fileHash TEXT,
            createdTime TEXT, unlinked TEXT, color TEXT
        );
        INSERT INTO FileHighlights VALUES
            (1, 'jane', '{H1}', 1, 'abc123', '2019-05-04T10:11:12Z', 'false', '#fff5ad'),
            (2, 'jane', '{H2}', 1, 'abc123', '2019-05-04T10:11:12Z', 'false', NULL);
        CREATE TABLE FileHighlightRects (
            id INTEGER PRIMARY KEY, highlightId INTEGER, page INTEGER,
            x1 REAL, y1 REAL, x2 REAL, y2 REAL
        );
        INSERT INTO FileHighlightRects VALUES
            (1, 1, 3, 50, 60, 250, 72),
            (2, 1, 3, 50, 40, 180, 52),
            (3, 2, 0, 0, 0, 10, 10);

        CREATE TABLE FileNotes (
            id INTEGER PRIMARY KEY, author TEXT, uuid TEXT, documentId INTEGER, fileHash TEXT,
            page INTEGER, x REAL, y REAL, note TEXT, modifiedTime TEXT, createdTime TEXT,
            unlinked TEXT, color TEXT
        );
        INSERT INTO FileNotes VALUES
            (1, 'jane', '{N1}', 1, 'abc123', 1, 10, 20, 'Check this', NULL,
             '2019-05-04T10:11:12Z', 'false', '#ff6666');

        CREATE TABLE Folders (id INTEGER PRIMARY KEY, uuid TEXT, name TEXT, parentId INTEGER);
        INSERT INTO Folders VALUES
            (1, '{F1}', 'Alpha', -1),
            (2, '{F2}', 'Beta', 1),
            (3, '{F3}', 'Gamma', 2),
            (4, '{F4}', 'Orphan', 42);
        CREATE TABLE DocumentFolders (documentId INTEGER, folderId INTEGER);
        INSERT INTO DocumentFolders VALUES (1, 2), (3, 2);
        "#,
    )
}
