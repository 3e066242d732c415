//! The document record shared by the outline, the session and the store.

use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Timestamps are kept in local time so month buckets follow the user's calendar.
pub type Timestamp = DateTime<Local>;

/// Stable identity of a document. Never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Creates a new unique document ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A single note or blog post.
///
/// Two documents are the same document iff their ids match; every other
/// field may differ between two observations (for example after a sync).
/// The field setters stamp `date_updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: DocumentId,
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    is_draft: Option<bool>,
    #[serde(default)]
    date_created: Option<Timestamp>,
    #[serde(default)]
    date_updated: Option<Timestamp>,
    #[serde(default)]
    date_published: Option<Timestamp>,
}

impl Document {
    /// Creates a new document with a fresh id and the starter content for `title`.
    pub fn new(title: impl Into<String>, created: Timestamp) -> Self {
        Self::with_id(DocumentId::new(), title, created)
    }

    /// Creates a document with a known id, as a store does when it restores records.
    pub fn with_id(id: DocumentId, title: impl Into<String>, created: Timestamp) -> Self {
        let title = title.into();
        Self {
            id,
            content: Some(default_content(&title)),
            title,
            is_draft: None,
            date_created: Some(created),
            date_updated: Some(created),
            date_published: None,
        }
    }

    /// Creates a record with no creation date, as some synced records arrive.
    pub fn undated(id: DocumentId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: None,
            is_draft: None,
            date_created: None,
            date_updated: None,
            date_published: None,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Body markup; an absent body reads as the empty string.
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Body markup exactly as stored.
    pub fn raw_content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// `None` until the first commit assigns publishing defaults.
    pub fn is_draft(&self) -> Option<bool> {
        self.is_draft
    }

    pub fn date_created(&self) -> Option<Timestamp> {
        self.date_created
    }

    pub fn date_updated(&self) -> Option<Timestamp> {
        self.date_updated
    }

    pub fn date_published(&self) -> Option<Timestamp> {
        self.date_published
    }

    /// First day of the month this document was created in.
    pub fn month(&self) -> Option<NaiveDate> {
        let created = self.date_created?;
        NaiveDate::from_ymd_opt(created.year(), created.month(), 1)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
        self.touch();
    }

    pub fn set_draft(&mut self, is_draft: bool) {
        self.is_draft = Some(is_draft);
        self.touch();
    }

    pub fn set_date_published(&mut self, published: Timestamp) {
        self.date_published = Some(published);
        self.touch();
    }

    /// Replaces the body without stamping `date_updated`.
    pub(crate) fn replace_content(&mut self, content: String) {
        self.content = Some(content);
    }

    /// Carries over the metadata fields `local` changed relative to `base`.
    ///
    /// Fields `local` left alone keep this document's value. Returns true if
    /// any local field was kept.
    pub(crate) fn keep_local_metadata(&mut self, local: &Document, base: &Document) -> bool {
        let mut kept = false;
        if local.title != base.title {
            self.title = local.title.clone();
            kept = true;
        }
        if local.is_draft != base.is_draft {
            self.is_draft = local.is_draft;
            kept = true;
        }
        if local.date_published != base.date_published {
            self.date_published = local.date_published;
            kept = true;
        }
        if kept {
            self.date_updated = self.date_updated.max(local.date_updated);
        }
        kept
    }

    /// Assigns `is_draft = true` and `date_published = date_created` where unset.
    ///
    /// Returns true if anything changed. Once both fields are set this is a no-op,
    /// so the defaults are applied exactly once per document.
    pub fn apply_publish_defaults(&mut self) -> bool {
        let mut changed = false;
        if self.is_draft.is_none() {
            self.is_draft = Some(true);
            changed = true;
        }
        if self.date_published.is_none() && self.date_created.is_some() {
            self.date_published = self.date_created;
            changed = true;
        }
        changed
    }

    /// True if `other` is an observation of the same document.
    pub fn same_document(&self, other: &Document) -> bool {
        self.id == other.id
    }

    fn touch(&mut self) {
        self.date_updated = Some(Local::now());
    }
}

/// Starter body for a freshly created document.
pub fn default_content(title: &str) -> String {
    format!("<h1>{title}</h1>\n\n<p>When you're thinking about '{title}' the other day...</p>")
}

/// Window title for the selected document, `"Luddite"` when nothing is selected.
pub fn window_title(document: Option<&Document>) -> String {
    match document {
        Some(doc) => match doc.date_created() {
            Some(created) => format!("{} • {}", doc.title(), created.format("%b %d, %Y")),
            None => doc.title().to_string(),
        },
        None => "Luddite".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> Timestamp {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_new_document_defaults() {
        let doc = Document::new("Hello", date(2024, 3, 5));
        assert_eq!(doc.title(), "Hello");
        assert!(doc.content().starts_with("<h1>Hello</h1>"));
        assert_eq!(doc.is_draft(), None);
        assert_eq!(doc.date_published(), None);
        assert_eq!(doc.date_updated(), doc.date_created());
    }

    #[test]
    fn test_month_truncates_day() {
        let doc = Document::new("a", date(2024, 3, 27));
        assert_eq!(doc.month(), NaiveDate::from_ymd_opt(2024, 3, 1));
        let undated = Document::undated(DocumentId::new(), "b");
        assert_eq!(undated.month(), None);
    }

    #[test]
    fn test_setters_stamp_date_updated() {
        let mut doc = Document::new("a", date(2020, 1, 1));
        doc.set_content("<p>new</p>");
        assert!(doc.date_updated().unwrap() > date(2020, 1, 1));
        assert_eq!(doc.content(), "<p>new</p>");
    }

    #[test]
    fn test_absent_content_reads_empty() {
        let doc = Document::undated(DocumentId::new(), "a");
        assert_eq!(doc.content(), "");
        assert_eq!(doc.raw_content(), None);
    }

    #[test]
    fn test_publish_defaults_applied_once() {
        let created = date(2024, 4, 2);
        let mut doc = Document::new("a", created);
        assert!(doc.apply_publish_defaults());
        assert_eq!(doc.is_draft(), Some(true));
        assert_eq!(doc.date_published(), Some(created));

        doc.set_draft(false);
        assert!(!doc.apply_publish_defaults());
        assert_eq!(doc.is_draft(), Some(false));
    }

    #[test]
    fn test_keep_local_metadata_merges_per_field() {
        let base = Document::new("Original", date(2024, 1, 1));
        let mut local = base.clone();
        local.set_title("Renamed locally");
        local.set_draft(false);

        let mut stored = base.clone();
        stored.set_date_published(date(2024, 2, 1));
        assert!(stored.keep_local_metadata(&local, &base));
        assert_eq!(stored.title(), "Renamed locally");
        assert_eq!(stored.is_draft(), Some(false));
        assert_eq!(stored.date_published(), Some(date(2024, 2, 1)));

        let mut untouched = base.clone();
        assert!(!untouched.keep_local_metadata(&base, &base));
        assert_eq!(untouched, base);
    }

    #[test]
    fn test_identity_ignores_fields() {
        let doc = Document::new("a", date(2024, 1, 1));
        let mut synced = doc.clone();
        synced.set_title("renamed");
        assert!(doc.same_document(&synced));
        assert_ne!(doc, synced);
    }

    #[test]
    fn test_id_round_trips_through_display() {
        let id = DocumentId::new();
        let parsed: DocumentId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_window_title() {
        assert_eq!(window_title(None), "Luddite");
        let doc = Document::new("Post", date(2024, 3, 5));
        assert_eq!(window_title(Some(&doc)), "Post • Mar 05, 2024");
    }
}
