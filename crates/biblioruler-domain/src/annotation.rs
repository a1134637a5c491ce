//! PDF annotations (highlights and page notes)

use crate::{Identity, ModelError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A rectangle on a PDF page (in PDF coordinates)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from two corners, in any order
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

/// Color in RGBA format
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotationColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl AnnotationColor {
    pub fn yellow() -> Self {
        Self {
            r: 255,
            g: 255,
            b: 0,
            a: 255,
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: 255,
            }),
            8 => Some(Self {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
                a: channel(6)?,
            }),
            _ => None,
        }
    }

    /// Decode a packed 0xRRGGBB integer
    pub fn from_rgb_int(value: i64) -> Self {
        Self {
            r: ((value >> 16) & 0xff) as u8,
            g: ((value >> 8) & 0xff) as u8,
            b: (value & 0xff) as u8,
            a: 255,
        }
    }
}

/// Fields shared by every annotation variant
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct AnnotationMeta {
    pub id: Identity,
    /// Zero-based page index
    pub page: u32,
    pub author: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub color: Option<AnnotationColor>,
}

impl AnnotationMeta {
    pub fn new(id: Identity, page: u32) -> Self {
        Self {
            id,
            page,
            author: None,
            created_at: None,
            color: None,
        }
    }
}

/// A highlight, possibly spanning several rectangles
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct HighlightAnnotation {
    pub meta: AnnotationMeta,
    pub boxes: Vec<Rect>,
    pub text: Option<String>,
}

/// A sticky note placed on a page
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NoteAnnotation {
    pub meta: AnnotationMeta,
    pub bounds: Rect,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Annotation {
    Highlight(HighlightAnnotation),
    Note(NoteAnnotation),
}

impl Annotation {
    pub fn meta(&self) -> &AnnotationMeta {
        match self {
            Annotation::Highlight(h) => &h.meta,
            Annotation::Note(n) => &n.meta,
        }
    }

    pub fn id(&self) -> &Identity {
        &self.meta().id
    }

    pub fn page(&self) -> u32 {
        self.meta().page
    }

    /// The comment or highlighted text
    pub fn text(&self) -> Option<&str> {
        match self {
            Annotation::Highlight(h) => h.text.as_deref(),
            Annotation::Note(n) => Some(n.text.as_str()),
        }
    }
}

/// Convert a source's one-based page number to a zero-based index
pub fn page_index(owner: &Identity, one_based: i64) -> Result<u32, ModelError> {
    if one_based < 1 {
        return Err(ModelError::load(
            owner,
            "annotations",
            format!("page number {one_based} is not one-based"),
        ));
    }
    u32::try_from(one_based - 1)
        .map_err(|_| ModelError::load(owner, "annotations", format!("page {one_based} out of range")))
}

/// One row of a highlight query: a single rectangle of a highlight
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightRow {
    pub meta: AnnotationMeta,
    pub rect: Rect,
    pub text: Option<String>,
}

/// Merge rectangle rows into highlights.
///
/// Rows sharing the same identity and page become one highlight whose boxes
/// keep row order; highlights keep the order of their first row.
pub fn merge_highlights<I>(rows: I) -> Vec<HighlightAnnotation>
where
    I: IntoIterator<Item = HighlightRow>,
{
    let mut merged: Vec<HighlightAnnotation> = Vec::new();
    for row in rows {
        let existing = merged
            .iter_mut()
            .find(|h| h.meta.id == row.meta.id && h.meta.page == row.meta.page);
        match existing {
            Some(highlight) => {
                highlight.boxes.push(row.rect);
                if highlight.text.is_none() {
                    highlight.text = row.text;
                }
            }
            None => merged.push(HighlightAnnotation {
                meta: row.meta,
                boxes: vec![row.rect],
                text: row.text,
            }),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, page: u32, x: f64) -> HighlightRow {
        HighlightRow {
            meta: AnnotationMeta::new(Identity::new("mendeley-annotation", id), page),
            rect: Rect::new(x, 10.0, 100.0, 12.0),
            text: None,
        }
    }

    #[test]
    fn test_rows_with_same_highlight_id_merge_in_row_order() {
        let merged = merge_highlights(vec![row("7", 2, 50.0), row("7", 2, 72.0)]);
        assert_eq!(merged.len(), 1);
        let xs: Vec<f64> = merged[0].boxes.iter().map(|r| r.x).collect();
        assert_eq!(xs, vec![50.0, 72.0]);
    }

    #[test]
    fn test_distinct_ids_or_pages_stay_apart() {
        let merged = merge_highlights(vec![row("1", 0, 1.0), row("2", 0, 2.0), row("1", 1, 3.0)]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].meta.id.local_key(), "1");
        assert_eq!(merged[1].meta.id.local_key(), "2");
    }

    #[test]
    fn test_page_index_is_zero_based() {
        let owner = Identity::new("test", "a");
        assert_eq!(page_index(&owner, 1).unwrap(), 0);
        assert_eq!(page_index(&owner, 12).unwrap(), 11);
        assert!(page_index(&owner, 0).is_err());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(
            AnnotationColor::from_hex("#ffd400"),
            Some(AnnotationColor {
                r: 255,
                g: 212,
                b: 0,
                a: 255
            })
        );
        assert_eq!(AnnotationColor::from_hex("nothex"), None);
        assert_eq!(AnnotationColor::from_rgb_int(0xff0000).to_hex(), "#ff0000");
    }

    #[test]
    fn test_rect_from_corners_normalises() {
        let r = Rect::from_corners(10.0, 20.0, 4.0, 2.0);
        assert_eq!(r, Rect::new(4.0, 2.0, 6.0, 18.0));
        assert_eq!(r.top(), 20.0);
    }
}
