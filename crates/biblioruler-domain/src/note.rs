//! Notes attached to papers

use crate::Identity;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cell::OnceCell;

lazy_static! {
    static ref BLOCK_BREAK: Regex =
        Regex::new(r"(?i)<\s*(br\s*/?|/p|/div|/li|/h[1-6])\s*>").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref BLANK_LINES: Regex = Regex::new(r"\n[ \t]*\n[\s]*").unwrap();
}

/// A note, stored by the source either as plain text or as HTML
#[derive(Clone, Debug)]
pub struct Note {
    pub id: Identity,
    pub title: Option<String>,
    html: Option<String>,
    text: OnceCell<String>,
}

impl Note {
    /// A plain-text note
    pub fn plain(id: Identity, title: Option<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            title,
            html: None,
            text: OnceCell::from(text.into()),
        }
    }

    /// An HTML note; the plain text is derived on first request
    pub fn html(id: Identity, title: Option<String>, html: impl Into<String>) -> Self {
        Self {
            id,
            title,
            html: Some(html.into()),
            text: OnceCell::new(),
        }
    }

    pub fn html_content(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Plain text content, stripped from the HTML once and cached
    pub fn text(&self) -> &str {
        self.text
            .get_or_init(|| strip_html(self.html.as_deref().unwrap_or_default()))
    }

    pub fn is_html(&self) -> bool {
        self.html.is_some()
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.title == other.title && self.text() == other.text()
    }
}

impl Serialize for Note {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("Note", 4)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("title", &self.title)?;
        s.serialize_field("text", self.text())?;
        s.serialize_field("html", &self.html)?;
        s.end()
    }
}

/// Remove tags and decode the common entities
pub fn strip_html(html: &str) -> String {
    let with_breaks = BLOCK_BREAK.replace_all(html, "\n");
    let without_tags = TAG.replace_all(&with_breaks, "");
    let decoded = decode_entities(&without_tags);
    BLANK_LINES
        .replace_all(decoded.trim(), "\n\n")
        .into_owned()
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find(';').filter(|&end| end <= 10) else {
            out.push('&');
            rest = &tail[1..];
            continue;
        };
        let entity = &tail[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" | "#39" => Some('\''),
            "nbsp" => Some(' '),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_note_keeps_text() {
        let note = Note::plain(Identity::new("papers3-note", "1"), None, "Read again");
        assert_eq!(note.text(), "Read again");
        assert!(!note.is_html());
    }

    #[test]
    fn test_html_note_is_stripped_once() {
        let note = Note::html(
            Identity::new("zotero-note", "5"),
            Some("Summary".into()),
            "<div><p>First &amp; <b>second</b></p><p>Third&nbsp;line</p></div>",
        );
        assert_eq!(note.text(), "First & second\nThird line");
        // cached: same allocation on the second call
        assert!(std::ptr::eq(note.text(), note.text()));
        assert!(note.is_html());
    }

    #[test]
    fn test_decode_numeric_entities_and_stray_ampersand() {
        assert_eq!(strip_html("A &#233;t&#xE9; & co"), "A été & co");
    }
}
