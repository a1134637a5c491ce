//! Date decoding for the three source encodings
//!
//! Papers3 packs dates into a fixed-width digit string, Mendeley stores month
//! and year as integers and Zotero keeps a normalized `YYYY-MM-DD` prefix
//! followed by whatever the user typed.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// Three-letter month names, January first
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

lazy_static! {
    static ref ZOTERO_SQL_DATE: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})").unwrap();
    static ref YEAR: Regex = Regex::new(r"\b(\d{4})\b").unwrap();
    static ref MONTH_NAME: Regex =
        Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?").unwrap();
}

/// Free-form date layouts tried after the normalized prefix
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y"];

/// Month and year of a publication; either may be unknown
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartialDate {
    pub month: Option<String>,
    pub year: Option<String>,
}

impl PartialDate {
    fn from_numbers(month: Option<u32>, year: Option<i32>) -> Self {
        Self {
            month: month.and_then(month_name).map(String::from),
            year: year.filter(|y| *y > 0).map(|y| format!("{y:04}")),
        }
    }
}

/// Name of a one-based month number
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|index| MONTHS.get(index as usize))
        .copied()
}

/// Decode a Papers3 `publication_date`.
///
/// The year sits at offsets 2..6 and the month at 6..8, e.g.
/// `99200406011200000000222000` is June 2004.
pub fn papers3_date(raw: &str) -> PartialDate {
    let digits = |range: std::ops::Range<usize>| {
        raw.get(range)
            .filter(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|s| s.parse::<u32>().ok())
    };
    PartialDate::from_numbers(digits(6..8), digits(2..6).map(|y| y as i32))
}

/// Decode Mendeley's integer `month` and `year` columns (0 means unknown)
pub fn mendeley_date(month: Option<i64>, year: Option<i64>) -> PartialDate {
    PartialDate::from_numbers(
        month.and_then(|m| u32::try_from(m).ok()),
        year.and_then(|y| i32::try_from(y).ok()),
    )
}

/// Decode a Zotero `date` field value.
///
/// Zotero stores `YYYY-MM-DD` with `00` for unknown parts, followed by the
/// text the user entered. Values without that prefix go through a few common
/// layouts, then a bare month name and four-digit year search.
pub fn zotero_date(raw: &str) -> PartialDate {
    let raw = raw.trim();
    if let Some(caps) = ZOTERO_SQL_DATE.captures(raw) {
        return PartialDate::from_numbers(caps[2].parse().ok(), caps[1].parse().ok());
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return PartialDate::from_numbers(Some(date.month()), Some(date.year()));
        }
    }

    let month = MONTH_NAME.captures(raw).and_then(|caps| {
        let prefix = caps[1].to_ascii_lowercase();
        MONTHS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(&prefix))
            .map(|index| index as u32 + 1)
    });
    let year = YEAR.captures(raw).and_then(|caps| caps[1].parse().ok());
    PartialDate::from_numbers(month, year)
}

/// Seconds since 2001-01-01 UTC (Core Data reference date), as used by Papers3
pub fn apple_timestamp(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let reference = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).single()?;
    // saturating cast; out-of-range offsets are rejected below
    let millis = (seconds * 1000.0).round() as i64;
    reference.checked_add_signed(chrono::Duration::try_milliseconds(millis)?)
}

/// Seconds since the Unix epoch, as used by Mendeley
pub fn unix_seconds(seconds: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
}

/// `YYYY-MM-DD HH:MM:SS` (UTC) or RFC 3339, as used by Zotero and Mendeley
pub fn sql_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
