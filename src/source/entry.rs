//! The entry type shared by every part of the reader.
//!
//! An [`Entry`] is one published record from either the daily summaries
//! collection or the novels collection.  Records arrive from the store as
//! [`RawEntry`] values with loosely-typed optional fields; [`RawEntry::into_entry`]
//! is the single place where defaults are substituted and provenance is
//! stamped, so nothing downstream has to deal with `null`s.
//!
//! ## For contributors
//!
//! If the store grows a new column, add it to [`RawEntry`] with
//! `#[serde(default)]`, decide its default in `into_entry`, and add it to
//! [`COLUMNS`](super::COLUMNS) so it is actually requested.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

/// Which collection an entry was fetched from.
///
/// Never present in the stored record; assigned by the fetcher before
/// merging and never re-derived afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Summary,
    Novel,
}

impl Source {
    /// Badge shown next to the entry in the list and the detail sheet.
    pub fn badge(self) -> &'static str {
        match self {
            Source::Summary => "DIARY",
            Source::Novel => "NOVEL",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Summary => "summary",
            Source::Novel => "novel",
        })
    }
}

/// A single published entry, normalised and tagged with its [`Source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Opaque identifier, stable across fetches.
    pub id: String,

    /// Sort key.
    ///
    /// `None` means the stored value was missing or unparseable; such entries
    /// sort after all dated ones.
    pub date: Option<DateTime<Utc>>,

    pub title: String,

    /// Body text.  Short for summaries, potentially very long for novels.
    pub content: String,

    /// Tags in stored order; empty when the record had none.
    pub tags: Vec<String>,

    pub image_url: Option<String>,

    pub source: Source,
}

impl Entry {
    /// Reverse-chronological comparison: newer entries first, undated last.
    ///
    /// Not an [`Ord`] impl: distinct entries on the same day compare equal.
    pub fn cmp_newest_first(&self, other: &Self) -> Ordering {
        // `None < Some(_)`, so comparing `other` to `self` puts undated
        // entries at the bottom as well.
        other.date.cmp(&self.date)
    }

    /// Calendar date for display, or a placeholder.
    pub fn date_label(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "no date".into())
    }
}

// ---------------------------------------------------------------------------
// Raw records as returned by the store
// ---------------------------------------------------------------------------

/// A row exactly as the store returns it, before defaults and provenance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    pub id: RawId,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Primary keys may be text (uuid) or an integer, depending on the table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl Default for RawId {
    fn default() -> Self {
        RawId::Text(String::new())
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl RawEntry {
    /// Substitute defaults for missing fields and stamp the provenance.
    pub fn into_entry(self, source: Source) -> Entry {
        Entry {
            id: self.id.to_string(),
            date: self.date.as_deref().and_then(parse_date),
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
            source,
        }
    }
}

/// Parse the `date` column.
///
/// `date` columns come back as `YYYY-MM-DD`, `timestamptz` columns as RFC 3339,
/// and `timestamp` columns as a naive date-time.  Naive values are taken as UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(json: &str) -> RawEntry {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn into_entry_substitutes_defaults() {
        let entry = raw(r#"{"id": "a", "date": "2024-01-02", "tags": null, "image_url": null}"#)
            .into_entry(Source::Summary);

        assert_eq!(entry.id, "a");
        assert_eq!(entry.title, "");
        assert_eq!(entry.content, "");
        assert!(entry.tags.is_empty());
        assert!(entry.image_url.is_none());
        assert_eq!(entry.source, Source::Summary);
    }

    #[test]
    fn into_entry_keeps_present_fields() {
        let entry = raw(
            r#"{"id": 42, "date": "2024-01-03T10:00:00+00:00", "title": "VR meetup",
                "content": "We met.", "tags": ["vr", "friends"],
                "image_url": "https://example.com/a.png"}"#,
        )
        .into_entry(Source::Novel);

        assert_eq!(entry.id, "42");
        assert_eq!(entry.title, "VR meetup");
        assert_eq!(entry.tags, vec!["vr".to_string(), "friends".to_string()]);
        assert_eq!(entry.image_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(
            entry.date,
            Some(Utc.with_ymd_and_hms(2024, 1, 3, 10, 0, 0).unwrap())
        );
        assert_eq!(entry.source, Source::Novel);
    }

    #[test]
    fn blank_image_url_is_absent() {
        let entry = raw(r#"{"id": "a", "image_url": "  "}"#).into_entry(Source::Novel);
        assert!(entry.image_url.is_none());
    }

    #[test]
    fn missing_id_is_a_decode_error() {
        assert!(serde_json::from_str::<RawEntry>(r#"{"title": "no id"}"#).is_err());
    }

    #[test]
    fn parse_date_accepts_store_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-01-02"), Some(midnight));
        assert_eq!(parse_date("2024-01-02T00:00:00"), Some(midnight));
        assert_eq!(parse_date("2024-01-02 00:00:00.000"), Some(midnight));
        assert_eq!(parse_date("2024-01-02T09:00:00+09:00"), Some(midnight));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn newest_first_puts_undated_last() {
        let dated = raw(r#"{"id": "1", "date": "2024-01-01"}"#).into_entry(Source::Summary);
        let undated = raw(r#"{"id": "2"}"#).into_entry(Source::Summary);

        let mut entries = vec![undated, dated];
        entries.sort_by(Entry::cmp_newest_first);

        assert_eq!(entries[0].id, "1");
        assert_eq!(entries[1].id, "2");
    }

    #[test]
    fn same_date_compares_equal() {
        let a = raw(r#"{"id": "a", "date": "2024-06-01"}"#).into_entry(Source::Summary);
        let b = raw(r#"{"id": "b", "date": "2024-06-01"}"#).into_entry(Source::Novel);
        assert_eq!(a.cmp_newest_first(&b), Ordering::Equal);
    }

    #[test]
    fn source_labels() {
        assert_eq!(Source::Summary.to_string(), "summary");
        assert_eq!(Source::Novel.badge(), "NOVEL");
    }
}
