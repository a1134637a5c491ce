//! Read-only SQLite access shared by the adapters

use crate::error::{Result, SourceError};
use biblioruler_domain::{Identity, ModelError};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};

/// The configured database path, or a configuration error naming the backend
pub(crate) fn require_path<'a>(backend: &'static str, path: Option<&'a PathBuf>) -> Result<&'a Path> {
    path.map(PathBuf::as_path).ok_or_else(|| {
        SourceError::Config(format!(
            "No {backend} database configured and none could be discovered"
        ))
    })
}

/// Open `path` read-only and check that `marker` runs against it
pub(crate) fn open_read_only(backend: &'static str, path: &Path, marker: &str) -> Result<Connection> {
    if !path.is_file() {
        return Err(SourceError::connection(backend, path, "file not found"));
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| SourceError::connection(backend, path, e))?;

    conn.prepare(marker)
        .and_then(|mut stmt| {
            let mut rows = stmt.query([])?;
            rows.next()?;
            Ok(())
        })
        .map_err(|e| SourceError::connection(backend, path, format!("not a {backend} database ({e})")))?;

    tracing::info!(path = %path.display(), "Connected to {} database", backend);
    Ok(conn)
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

/// A column read as trimmed text, whatever its storage class; blanks are `None`
pub(crate) fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
    };
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

pub(crate) fn integer(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i),
        ValueRef::Real(f) => Some(f as i64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().and_then(|s| s.trim().parse().ok()),
        _ => None,
    })
}

pub(crate) fn real(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok().and_then(|s| s.trim().parse().ok()),
        _ => None,
    })
}

/// Rows fetched per page by `Paged`
pub(crate) const PAGE_SIZE: usize = 256;

/// Rows of a query paged on an increasing integer key.
///
/// Each page runs `fetch(after, limit)` on its own prepared statement, so
/// two iterators over the same connection never share a cursor. `fetch`
/// returns rows paired with their key, in key order.
pub(crate) struct Paged<T, F> {
    fetch: F,
    after: i64,
    page: std::vec::IntoIter<(i64, T)>,
    exhausted: bool,
}

impl<T, F> Paged<T, F>
where
    F: FnMut(i64, usize) -> Result<Vec<(i64, T)>>,
{
    pub(crate) fn new(fetch: F) -> Self {
        Self {
            fetch,
            after: i64::MIN,
            page: Vec::new().into_iter(),
            exhausted: false,
        }
    }
}

impl<T, F> Iterator for Paged<T, F>
where
    F: FnMut(i64, usize) -> Result<Vec<(i64, T)>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, item)) = self.page.next() {
                self.after = key;
                return Some(Ok(item));
            }
            if self.exhausted {
                return None;
            }
            match (self.fetch)(self.after, PAGE_SIZE) {
                Ok(rows) => {
                    self.exhausted = rows.len() < PAGE_SIZE;
                    if rows.is_empty() {
                        return None;
                    }
                    self.page = rows.into_iter();
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Surface source failures through a lazy field of `owner`
pub(crate) trait ForLoad<T> {
    fn for_load(self, owner: &Identity, capability: &'static str) -> std::result::Result<T, ModelError>;
}

impl<T, E: Into<SourceError>> ForLoad<T> for std::result::Result<T, E> {
    fn for_load(self, owner: &Identity, capability: &'static str) -> std::result::Result<T, ModelError> {
        self.map_err(|e| e.into().into_model(owner, capability))
    }
}
