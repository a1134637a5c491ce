//! Mendeley adapter against an on-disk database

mod common;

use biblioruler_domain::{Annotation, PublicationType};
use biblioruler_sources::{Mendeley, MendeleyConfig, Source, SourceError};
use common::fixtures::{mendeley_database, unrelated_database};
use std::path::Path;
use tempfile::TempDir;

fn connect(dir: &Path) -> Mendeley {
    let config = MendeleyConfig {
        dbpath: Some(mendeley_database(dir)),
    };
    Mendeley::connect(&config).unwrap()
}

#[test]
fn test_foreign_database_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = MendeleyConfig {
        dbpath: Some(unrelated_database(dir.path())),
    };
    let err = Mendeley::connect(&config).err().unwrap();
    assert!(matches!(err, SourceError::Connection { backend: "Mendeley", .. }));
}

#[test]
fn test_unmapped_type_fails_that_item_only() {
    let dir = TempDir::new().unwrap();
    let source = connect(dir.path());
    let results: Vec<_> = source.publications().unwrap().collect();

    assert_eq!(results.len(), 2);
    let paper = results[0].as_ref().unwrap();
    assert_eq!(paper.id().local_key(), "{D1}");
    match &results[1] {
        Err(SourceError::UnmappedValue { backend, field, value }) => {
            assert_eq!(*backend, "Mendeley");
            assert_eq!(*field, "type");
            assert_eq!(value, "ComputerProgram");
        }
        other => panic!("expected an unmapped type, got {other:?}"),
    }
}

#[test]
fn test_interleaved_publication_iterators() {
    let dir = TempDir::new().unwrap();
    let source = connect(dir.path());
    let mut first = source.publications().unwrap();
    let mut second = source.publications().unwrap();

    assert_eq!(first.next().unwrap().unwrap().id().local_key(), "{D1}");
    assert_eq!(second.next().unwrap().unwrap().id().local_key(), "{D1}");
    assert!(second.next().unwrap().is_err());
    assert!(second.next().is_none());
    assert!(first.next().unwrap().is_err());
    assert!(first.next().is_none());
}

#[test]
fn test_summary_fields() {
    let dir = TempDir::new().unwrap();
    let source = connect(dir.path());
    let paper = source.publication("{D1}").unwrap().unwrap();

    assert_eq!(paper.title().unwrap(), Some("Deep Nets"));
    assert_eq!(paper.kind().unwrap(), Some(PublicationType::ArticleJournal));
    assert_eq!(paper.date().unwrap(), "Jun 2004");
    assert!(paper.is_read().unwrap());
    assert_eq!(paper.uri().unwrap(), None);

    let record = paper.record().unwrap();
    assert_eq!(record.number.as_deref(), Some("3"));
    assert_eq!(record.created_at.map(|t| t.timestamp()), Some(1_557_000_000));

    let journal = paper.container().unwrap().unwrap();
    assert_eq!(journal.title().unwrap(), Some("Journal of Nets"));
    assert_eq!(journal.kind().unwrap(), Some(PublicationType::Journal));
}

#[test]
fn test_deleted_documents_are_hidden() {
    let dir = TempDir::new().unwrap();
    let source = connect(dir.path());
    assert!(source.publication("{D3}").unwrap().is_none());
    assert!(source.find_by_doi("10.1000/deep").unwrap().len() == 1);
}

#[test]
fn test_sub_lists() {
    let dir = TempDir::new().unwrap();
    let source = connect(dir.path());
    let paper = source.publication("{D1}").unwrap().unwrap();

    let names: Vec<String> = paper.authors().unwrap().iter().map(|a| a.to_bibtex_format()).collect();
    assert_eq!(names, vec!["Doe, Jane", "Smith, John"]);

    let keywords: Vec<&str> = paper.keywords().unwrap().iter().map(String::as_str).collect();
    assert_eq!(keywords, vec!["learning", "networks"]);

    let files = paper.files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path(), Some(Path::new("/papers/Deep Nets.pdf")));
    assert_eq!(files[0].title.as_deref(), Some("Deep Nets.pdf"));
    assert_eq!(files[0].mime_type.as_deref(), Some("application/pdf"));

    let notes = paper.notes().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].text(), "Read twice");
}

#[test]
fn test_highlight_rectangles_are_merged() {
    let dir = TempDir::new().unwrap();
    let source = connect(dir.path());
    let paper = source.publication("{D1}").unwrap().unwrap();
    let annotations = paper.files().unwrap()[0].annotations().unwrap();

    assert_eq!(annotations.len(), 2);
    match &annotations[0] {
        Annotation::Highlight(highlight) => {
            assert_eq!(highlight.meta.id.local_key(), "{H1}");
            assert_eq!(highlight.meta.page, 2);
            assert_eq!(highlight.boxes.len(), 2);
            assert_eq!(highlight.boxes[0].width, 200.0);
            assert_eq!(highlight.meta.color.map(|c| c.to_hex()).as_deref(), Some("#fff5ad"));
        }
        other => panic!("expected a highlight, got {other:?}"),
    }
    match &annotations[1] {
        Annotation::Note(note) => {
            assert_eq!(note.meta.page, 0);
            assert_eq!(note.text, "Check this");
            assert_eq!(note.bounds.x, 10.0);
        }
        other => panic!("expected a note, got {other:?}"),
    }
}

#[test]
fn test_folder_tree() {
    let dir = TempDir::new().unwrap();
    let source = connect(dir.path());
    let tree = source.collections().unwrap();

    assert_eq!(tree.len(), 4);
    let gamma = tree.by_key("3").unwrap();
    assert_eq!(tree.path(gamma), vec!["Alpha", "Beta", "Gamma"]);
    assert!(tree.parent(tree.by_key("4").unwrap()).is_none());

    let members = tree.lookup("2").unwrap().publications().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].title().unwrap(), Some("Deep Nets"));
}
