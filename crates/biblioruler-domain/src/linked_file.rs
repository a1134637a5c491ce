//! Files (PDFs and other attachments) linked to a paper

use crate::{Annotation, Identity, Lazy, ModelError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Retrieves the annotations of a file on demand
pub trait FileLoader {
    fn load_annotations(&self, file: &Identity) -> Result<Vec<Annotation>, ModelError> {
        Err(ModelError::not_implemented(file, "annotations"))
    }
}

/// A file attached to a paper
#[derive(Clone)]
pub struct LinkedFile {
    id: Identity,
    pub path: Option<PathBuf>,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    annotations: Lazy<Vec<Annotation>>,
    loader: Option<Rc<dyn FileLoader>>,
}

impl LinkedFile {
    /// A file whose annotations are fetched through `loader`
    pub fn new(id: Identity, path: Option<PathBuf>, loader: Rc<dyn FileLoader>) -> Self {
        Self {
            id,
            path,
            mime_type: None,
            title: None,
            annotations: Lazy::pending(),
            loader: Some(loader),
        }
    }

    /// A file with a fixed annotation list and no source behind it
    pub fn detached(id: Identity, path: Option<PathBuf>, annotations: Vec<Annotation>) -> Self {
        Self {
            id,
            path,
            mime_type: None,
            title: None,
            annotations: Lazy::ready(annotations),
            loader: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: Option<String>) -> Self {
        self.mime_type = mime_type;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn id(&self) -> &Identity {
        &self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the file is present on disk and non-empty
    pub fn exists(&self) -> bool {
        self.path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false)
    }

    /// Check if this is a PDF file
    pub fn is_pdf(&self) -> bool {
        self.mime_type
            .as_deref()
            .map(|m| m == "application/pdf")
            .unwrap_or(false)
            || self
                .path
                .as_ref()
                .and_then(|p| p.extension())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
    }

    /// Annotations of this file, fetched on first access
    pub fn annotations(&self) -> Result<&[Annotation], ModelError> {
        self.annotations
            .get_or_load(&self.id, || match &self.loader {
                Some(loader) => loader.load_annotations(&self.id),
                None => Err(ModelError::not_implemented(&self.id, "annotations")),
            })
            .map(Vec::as_slice)
    }

    pub fn annotations_loaded(&self) -> bool {
        self.annotations.is_populated()
    }
}

impl fmt::Debug for LinkedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedFile")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("mime_type", &self.mime_type)
            .field("annotations", &self.annotations.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnnotationMeta, NoteAnnotation, Rect};
    use std::cell::Cell;
    use std::io::Write;

    struct CountingLoader {
        calls: Cell<u32>,
    }

    impl FileLoader for CountingLoader {
        fn load_annotations(&self, file: &Identity) -> Result<Vec<Annotation>, ModelError> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![Annotation::Note(NoteAnnotation {
                meta: AnnotationMeta::new(file.sibling("n1"), 0),
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                text: "check".into(),
            })])
        }
    }

    struct NoAnnotations;
    impl FileLoader for NoAnnotations {}

    #[test]
    fn test_annotations_load_once() {
        let loader = Rc::new(CountingLoader { calls: Cell::new(0) });
        let file = LinkedFile::new(Identity::new("test-file", "f"), None, loader.clone());
        assert!(!file.annotations_loaded());
        assert_eq!(file.annotations().unwrap().len(), 1);
        assert_eq!(file.annotations().unwrap().len(), 1);
        assert_eq!(loader.calls.get(), 1);
    }

    #[test]
    fn test_missing_capability_is_contract_violation() {
        let file = LinkedFile::new(Identity::new("test-file", "f"), None, Rc::new(NoAnnotations));
        let err = file.annotations().unwrap_err();
        assert!(err.is_contract_violation());
        assert!(!file.annotations_loaded());
    }

    #[test]
    fn test_exists_requires_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty.pdf");
        std::fs::File::create(&empty).unwrap();
        let full = dir.path().join("full.pdf");
        std::fs::File::create(&full).unwrap().write_all(b"%PDF-1.4").unwrap();

        let id = Identity::new("test-file", "x");
        assert!(!LinkedFile::detached(id.clone(), Some(empty), vec![]).exists());
        assert!(LinkedFile::detached(id.clone(), Some(full.clone()), vec![]).exists());
        assert!(!LinkedFile::detached(id.clone(), Some(dir.path().join("missing.pdf")), vec![]).exists());
        assert!(!LinkedFile::detached(id, None, vec![]).exists());
    }

    #[test]
    fn test_is_pdf_by_mime_or_extension() {
        let id = Identity::new("test-file", "x");
        let by_ext = LinkedFile::detached(id.clone(), Some(PathBuf::from("/a/b.PDF")), vec![]);
        assert!(by_ext.is_pdf());
        let html = LinkedFile::detached(id, Some(PathBuf::from("/a/b.html")), vec![])
            .with_mime_type(Some("text/html".into()));
        assert!(!html.is_pdf());
    }
}
