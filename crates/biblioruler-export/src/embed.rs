//! Writing annotations into copies of linked PDFs

use crate::error::EmbeddingError;
use biblioruler_domain::{Annotation, LinkedFile};
use std::path::{Path, PathBuf};

/// Writes annotations into a copy of a file
pub trait AnnotationEmbedder {
    /// Copy `source` to `target` with `annotations` added.
    ///
    /// On failure `target` may hold a partial file; the caller removes it.
    fn embed(&self, source: &Path, annotations: &[Annotation], target: &Path) -> Result<(), EmbeddingError>;
}

/// Where an attachment of the export points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLink {
    /// The original file, untouched
    Original(PathBuf),
    /// An annotated copy written next to the export
    Embedded(PathBuf),
    /// The source knows no local path
    Missing,
}

impl FileLink {
    pub fn path(&self) -> Option<&Path> {
        match self {
            FileLink::Original(path) | FileLink::Embedded(path) => Some(path),
            FileLink::Missing => None,
        }
    }
}

/// Link `file`, embedding its annotations into a copy under `files_dir`
/// when possible.
///
/// Any embedding failure is logged, the partial copy is removed and the
/// original file is linked instead.
pub fn link_file(file: &LinkedFile, embedder: Option<&dyn AnnotationEmbedder>, files_dir: &Path) -> FileLink {
    let Some(source) = file.path() else {
        return FileLink::Missing;
    };
    let original = FileLink::Original(source.to_path_buf());
    let Some(embedder) = embedder else {
        return original;
    };
    if !file.is_pdf() || !file.exists() {
        return original;
    }

    let annotations = match file.annotations() {
        Ok(annotations) if annotations.is_empty() => return original,
        Ok(annotations) => annotations,
        Err(e) => {
            tracing::warn!(file = %file.id(), error = %e, "Cannot read annotations, linking original");
            return original;
        }
    };

    let target = files_dir.join(copy_name(file, source));
    let result = std::fs::create_dir_all(files_dir)
        .map_err(|e| EmbeddingError::new(source, &target, e))
        .and_then(|_| embedder.embed(source, annotations, &target));
    match result {
        Ok(()) => {
            tracing::debug!(file = %file.id(), target = %target.display(), "Annotations embedded");
            FileLink::Embedded(target)
        }
        Err(e) => {
            tracing::warn!(file = %file.id(), error = %e, "Annotation embedding failed, linking original");
            if target.exists() {
                if let Err(e) = std::fs::remove_file(&target) {
                    tracing::warn!(target = %target.display(), error = %e, "Cannot remove partial copy");
                }
            }
            original
        }
    }
}

/// `<local key>-<file name>`, unique per file identity
fn copy_name(file: &LinkedFile, source: &Path) -> String {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file.pdf".to_string());
    let key: String = file
        .id()
        .local_key()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{key}-{name}")
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumEmbedder;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::AnnotationEmbedder;
    use crate::error::EmbeddingError;
    use biblioruler_domain::{Annotation, AnnotationColor, Rect};
    use pdfium_render::prelude::*;
    use std::path::Path;

    /// Embeds highlights and notes with the system pdfium library
    pub struct PdfiumEmbedder {
        pdfium: Pdfium,
    }

    impl PdfiumEmbedder {
        pub fn new() -> Result<Self, PdfiumError> {
            let bindings = Pdfium::bind_to_system_library()?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    fn pdf_rect(rect: &Rect) -> PdfRect {
        PdfRect::new_from_values(rect.y as f32, rect.x as f32, rect.top() as f32, rect.right() as f32)
    }

    fn pdf_color(color: Option<AnnotationColor>) -> PdfColor {
        let c = color.unwrap_or_else(AnnotationColor::yellow);
        PdfColor::new(c.r, c.g, c.b, c.a)
    }

    impl AnnotationEmbedder for PdfiumEmbedder {
        fn embed(&self, source: &Path, annotations: &[Annotation], target: &Path) -> Result<(), EmbeddingError> {
            let fail = |e: PdfiumError| EmbeddingError::new(source, target, e);
            let document = self.pdfium.load_pdf_from_file(source, None).map_err(fail)?;

            for annotation in annotations {
                let index = u16::try_from(annotation.page())
                    .map_err(|_| EmbeddingError::new(source, target, "page index out of range"))?;
                let mut page = document.pages().get(index).map_err(fail)?;
                let meta = annotation.meta();
                match annotation {
                    Annotation::Highlight(highlight) => {
                        let mut pdf = page.annotations_mut().create_highlight_annotation().map_err(fail)?;
                        for rect in &highlight.boxes {
                            pdf.attachment_points_mut()
                                .create_attachment_point_at_end(PdfQuadPoints::from_rect(&pdf_rect(rect)))
                                .map_err(fail)?;
                        }
                        if let Some(first) = highlight.boxes.first() {
                            pdf.set_bounds(pdf_rect(first)).map_err(fail)?;
                        }
                        pdf.set_fill_color(pdf_color(meta.color)).map_err(fail)?;
                        if let Some(text) = &highlight.text {
                            pdf.set_contents(text).map_err(fail)?;
                        }
                        if let Some(author) = &meta.author {
                            pdf.set_creator(author).map_err(fail)?;
                        }
                    }
                    Annotation::Note(note) => {
                        let mut pdf = page.annotations_mut().create_text_annotation(&note.text).map_err(fail)?;
                        pdf.set_bounds(pdf_rect(&note.bounds)).map_err(fail)?;
                        pdf.set_fill_color(pdf_color(meta.color)).map_err(fail)?;
                        if let Some(author) = &meta.author {
                            pdf.set_creator(author).map_err(fail)?;
                        }
                    }
                }
            }

            document.save_to_file(target).map_err(fail)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblioruler_domain::{AnnotationMeta, Identity, NoteAnnotation, Rect};
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FakeEmbedder {
        fail: bool,
        calls: Cell<usize>,
    }

    impl AnnotationEmbedder for FakeEmbedder {
        fn embed(&self, source: &Path, _annotations: &[Annotation], target: &Path) -> Result<(), EmbeddingError> {
            self.calls.set(self.calls.get() + 1);
            std::fs::write(target, b"%PDF-partial").unwrap();
            if self.fail {
                Err(EmbeddingError::new(source, target, "corrupt xref table"))
            } else {
                Ok(())
            }
        }
    }

    fn annotated_pdf(dir: &Path, annotations: Vec<Annotation>) -> LinkedFile {
        let path = dir.join("paper.pdf");
        std::fs::write(&path, b"%PDF-1.4 original").unwrap();
        LinkedFile::detached(Identity::new("papers3-file", "F1"), Some(path), annotations)
    }

    fn note() -> Annotation {
        Annotation::Note(NoteAnnotation {
            meta: AnnotationMeta::new(Identity::new("papers3-annotation", "N1"), 0),
            bounds: Rect::new(10.0, 20.0, 0.0, 0.0),
            text: "Check this".into(),
        })
    }

    #[test]
    fn test_embedded_copy_is_linked() {
        let dir = TempDir::new().unwrap();
        let file = annotated_pdf(dir.path(), vec![note()]);
        let embedder = FakeEmbedder { fail: false, calls: Cell::new(0) };
        let files_dir = dir.path().join("export.files");

        let link = link_file(&file, Some(&embedder), &files_dir);
        assert_eq!(link, FileLink::Embedded(files_dir.join("F1-paper.pdf")));
        assert!(files_dir.join("F1-paper.pdf").is_file());
    }

    #[test]
    fn test_failed_embedding_links_original_and_removes_partial_copy() {
        let dir = TempDir::new().unwrap();
        let file = annotated_pdf(dir.path(), vec![note()]);
        let embedder = FakeEmbedder { fail: true, calls: Cell::new(0) };
        let files_dir = dir.path().join("export.files");

        let link = link_file(&file, Some(&embedder), &files_dir);
        assert_eq!(link, FileLink::Original(dir.path().join("paper.pdf")));
        assert_eq!(embedder.calls.get(), 1);
        assert!(!files_dir.join("F1-paper.pdf").exists());
    }

    #[test]
    fn test_files_without_annotations_are_not_copied() {
        let dir = TempDir::new().unwrap();
        let file = annotated_pdf(dir.path(), Vec::new());
        let embedder = FakeEmbedder { fail: false, calls: Cell::new(0) };

        let link = link_file(&file, Some(&embedder), &dir.path().join("files"));
        assert_eq!(link, FileLink::Original(dir.path().join("paper.pdf")));
        assert_eq!(embedder.calls.get(), 0);
    }

    #[test]
    fn test_missing_path() {
        let file = LinkedFile::detached(Identity::new("zotero-file", "U1"), None, Vec::new());
        assert_eq!(link_file(&file, None, Path::new("/tmp")), FileLink::Missing);
        assert!(FileLink::Missing.path().is_none());
    }
}
