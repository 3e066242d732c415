//! Month-grouped outline of documents for the sidebar.

use crate::document::{Document, DocumentId};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A month bucket of documents.
///
/// Equality and hashing use only the bucket date.
#[derive(Debug, Clone)]
pub struct Header {
    bucket_date: NaiveDate,
    label: String,
    documents: Vec<Document>,
}

impl Header {
    fn new(bucket_date: NaiveDate, documents: Vec<Document>) -> Self {
        Self {
            label: bucket_date.format("%B %Y").to_string(),
            bucket_date,
            documents,
        }
    }

    /// First day of the month this header groups.
    pub fn bucket_date(&self) -> NaiveDate {
        self.bucket_date
    }

    /// Display label, e.g. `March 2024`.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Documents created in this month, in snapshot order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.bucket_date == other.bucket_date
    }
}

impl Eq for Header {}

impl Hash for Header {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bucket_date.hash(state);
    }
}

/// One row of the flattened outline, as the sidebar lists it.
#[derive(Debug, Clone, Copy)]
pub enum OutlineRow<'a> {
    Header(&'a Header),
    Document(&'a Document),
}

/// Documents grouped by creation month, most recent month first.
#[derive(Debug, Clone, Default)]
pub struct OutlineIndex {
    headings: Vec<Header>,
}

impl OutlineIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all headings with a grouping of `snapshot`.
    ///
    /// Documents keep their snapshot order inside a month. Documents without a
    /// creation date are dropped.
    pub fn rebuild(&mut self, snapshot: Vec<Document>) {
        let total = snapshot.len();
        let mut months: BTreeMap<NaiveDate, Vec<Document>> = BTreeMap::new();
        let mut undated = 0;
        for doc in snapshot {
            match doc.month() {
                Some(month) => months.entry(month).or_default().push(doc),
                None => undated += 1,
            }
        }

        self.headings = months
            .into_iter()
            .rev()
            .map(|(month, documents)| Header::new(month, documents))
            .collect();

        if undated > 0 {
            log::warn!("{undated} document(s) without a creation date left out of the outline");
        }
        log::debug!(
            "Outline rebuilt: {} headers, {} of {} documents",
            self.headings.len(),
            total - undated,
            total
        );
    }

    pub fn headings(&self) -> &[Header] {
        &self.headings
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    /// Number of documents across all headings.
    pub fn document_count(&self) -> usize {
        self.headings.iter().map(|h| h.documents.len()).sum()
    }

    /// Returns (heading index, index within heading) of a document.
    pub fn position_of(&self, id: DocumentId) -> Option<(usize, usize)> {
        self.headings.iter().enumerate().find_map(|(h, header)| {
            header
                .documents
                .iter()
                .position(|doc| doc.id() == id)
                .map(|d| (h, d))
        })
    }

    /// Looks a document up by id.
    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.position_of(id)
            .map(|(h, d)| &self.headings[h].documents[d])
    }

    /// Flattens the outline into sidebar rows: each header followed by its documents.
    pub fn rows(&self) -> Vec<OutlineRow<'_>> {
        let mut rows = Vec::with_capacity(self.headings.len() + self.document_count());
        for header in &self.headings {
            rows.push(OutlineRow::Header(header));
            rows.extend(header.documents.iter().map(OutlineRow::Document));
        }
        rows
    }

    /// Returns the flattened row index of a document.
    pub fn row_of(&self, id: DocumentId) -> Option<usize> {
        let (h, d) = self.position_of(id)?;
        let before: usize = self.headings[..h]
            .iter()
            .map(|header| header.documents.len() + 1)
            .sum();
        Some(before + 1 + d)
    }

    /// Returns the document shown at a flattened row, `None` for header rows.
    pub fn document_at_row(&self, row: usize) -> Option<&Document> {
        match self.rows().get(row)? {
            OutlineRow::Document(doc) => Some(*doc),
            OutlineRow::Header(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Timestamp;
    use chrono::{Local, TimeZone};
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> Timestamp {
        Local.with_ymd_and_hms(y, m, d, 9, 30, 0).single().unwrap()
    }

    fn doc(title: &str, y: i32, m: u32, d: u32) -> Document {
        Document::new(title, date(y, m, d))
    }

    #[test]
    fn test_empty_snapshot() {
        let mut index = OutlineIndex::new();
        index.rebuild(Vec::new());
        assert!(index.is_empty());
        assert!(index.rows().is_empty());
    }

    #[test]
    fn test_groups_by_month_descending() {
        let mut index = OutlineIndex::new();
        index.rebuild(vec![
            doc("april", 2024, 4, 2),
            doc("march late", 2024, 3, 30),
            doc("march early", 2024, 3, 1),
        ]);

        let labels: Vec<&str> = index.headings().iter().map(|h| h.label()).collect();
        assert_eq!(labels, vec!["April 2024", "March 2024"]);
        assert_eq!(index.headings()[0].documents().len(), 1);
        let march: Vec<&str> = index.headings()[1]
            .documents()
            .iter()
            .map(|d| d.title())
            .collect();
        assert_eq!(march, vec!["march late", "march early"]);
    }

    #[test]
    fn test_headings_strictly_descending_across_years() {
        let mut index = OutlineIndex::new();
        index.rebuild(vec![
            doc("a", 2023, 12, 5),
            doc("b", 2024, 1, 5),
            doc("c", 2022, 6, 5),
            doc("d", 2024, 1, 20),
        ]);
        let dates: Vec<NaiveDate> = index.headings().iter().map(|h| h.bucket_date()).collect();
        assert!(dates.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_union_excludes_only_undated() {
        let dated = vec![doc("a", 2024, 2, 1), doc("b", 2024, 5, 1)];
        let undated = Document::undated(DocumentId::new(), "lost");
        let mut snapshot = dated.clone();
        snapshot.push(undated.clone());

        let mut index = OutlineIndex::new();
        index.rebuild(snapshot);

        let ids: HashSet<DocumentId> = index
            .headings()
            .iter()
            .flat_map(|h| h.documents().iter().map(|d| d.id()))
            .collect();
        let expected: HashSet<DocumentId> = dated.iter().map(|d| d.id()).collect();
        assert_eq!(ids, expected);
        assert!(index.document(undated.id()).is_none());
    }

    #[test]
    fn test_header_equality_uses_bucket_only() {
        let march = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let a = Header::new(march, vec![doc("x", 2024, 3, 2)]);
        let b = Header::new(march, Vec::new());
        assert_eq!(a, b);
        let set: HashSet<Header> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_rows_and_positions() {
        let april = doc("april", 2024, 4, 2);
        let march_a = doc("march a", 2024, 3, 9);
        let march_b = doc("march b", 2024, 3, 8);
        let mut index = OutlineIndex::new();
        index.rebuild(vec![april.clone(), march_a.clone(), march_b.clone()]);

        // [April, april, March, march a, march b]
        assert_eq!(index.rows().len(), 5);
        assert_eq!(index.row_of(april.id()), Some(1));
        assert_eq!(index.row_of(march_b.id()), Some(4));
        assert_eq!(index.position_of(march_a.id()), Some((1, 0)));
        assert_eq!(index.document_at_row(3).map(|d| d.id()), Some(march_a.id()));
        assert!(index.document_at_row(2).is_none());
        assert!(index.document_at_row(9).is_none());
    }

    #[test]
    fn test_rebuild_replaces_previous_headings() {
        let mut index = OutlineIndex::new();
        index.rebuild(vec![doc("a", 2021, 1, 1)]);
        index.rebuild(vec![doc("b", 2022, 2, 2)]);
        assert_eq!(index.headings().len(), 1);
        assert_eq!(index.headings()[0].label(), "February 2022");
        assert_eq!(index.document_count(), 1);
    }
}
