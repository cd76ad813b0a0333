//! Sitemap entries and their field parsers

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A page URL announced by a sitemap
///
/// Only `reference` is required. The optional fields are kept exactly as
/// far as they could be parsed: a bad date or priority leaves that one field
/// unset and the entry is still emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Absolute URL of the page
    pub reference: String,

    /// `<lastmod>`, normalized to UTC
    pub last_modified: Option<DateTime<Utc>>,

    /// `<changefreq>`, verbatim
    pub change_frequency: Option<String>,

    /// `<priority>`; no range is enforced
    pub priority: Option<f32>,
}

impl SitemapEntry {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            last_modified: None,
            change_frequency: None,
            priority: None,
        }
    }
}

/// Entry under construction while its `<url>` element is open
#[derive(Debug, Default)]
pub(crate) struct PendingEntry {
    pub reference: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: Option<String>,
    pub priority: Option<f32>,
}

impl PendingEntry {
    /// Finishes the entry, or `None` when no reference was seen
    pub fn finish(self) -> Option<SitemapEntry> {
        let reference = self.reference.filter(|r| !r.is_empty())?;
        Some(SitemapEntry {
            reference,
            last_modified: self.last_modified,
            change_frequency: self.change_frequency,
            priority: self.priority,
        })
    }
}

/// Parses a `<lastmod>` value
///
/// Accepts RFC 3339 and the W3C datetime subsets sitemaps use:
/// - `2024-01-15T10:30:00+00:00`, `2024-01-15T10:30:00.000Z`
/// - `2024-01-15T10:30+02:00` (no seconds)
/// - `2024-01-15T10:30:00` (no offset, assumed UTC)
/// - `2024-01-15`, `2024-01`, `2024`
pub fn parse_lastmod(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    // chrono's %:z does not take "Z"
    let with_offset = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_str(&with_offset, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }

    let date = match value.len() {
        10 => NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d").ok(),
        4 if value.bytes().all(|b| b.is_ascii_digit()) => value
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        _ => None,
    }?;

    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Parses a `<priority>` value
///
/// Out-of-range values are kept as-is.
pub fn parse_priority(value: &str) -> Option<f32> {
    value.parse::<f32>().ok()
}
