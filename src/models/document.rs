//! Reference lists and the assembled document aggregate.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::citation::format_citation;
use crate::models::{BibliographicRecord, CitationStyle};

/// One numbered entry of a reference list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// 1-based citation number
    pub index: usize,
    pub record: BibliographicRecord,
}

/// Ordered, densely numbered references for a single document
///
/// Numbers are assigned by [`ReferenceList::push`] only, so they always run
/// 1..=len without gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceList {
    entries: Vec<Reference>,
}

impl ReferenceList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return the number it was assigned
    pub fn push(&mut self, record: BibliographicRecord) -> usize {
        let index = self.entries.len() + 1;
        self.entries.push(Reference { index, record });
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.iter()
    }

    /// Records in citation order
    pub fn records(&self) -> impl Iterator<Item = &BibliographicRecord> {
        self.entries.iter().map(|r| &r.record)
    }

    /// Formatted citations without their numerals
    pub fn formatted(&self, style: CitationStyle) -> Vec<String> {
        self.records().map(|r| format_citation(r, style)).collect()
    }

    /// Formatted citations prefixed with their bracketed numerals
    pub fn numbered(&self, style: CitationStyle) -> Vec<String> {
        self.entries
            .iter()
            .map(|r| format!("[{}] {}", r.index, format_citation(&r.record, style)))
            .collect()
    }
}

impl FromIterator<BibliographicRecord> for ReferenceList {
    fn from_iter<I: IntoIterator<Item = BibliographicRecord>>(iter: I) -> Self {
        let mut list = ReferenceList::new();
        for record in iter {
            list.push(record);
        }
        list
    }
}

/// Count whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Paper fields of the aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaperSection {
    pub title: String,
    pub content: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub paper_type: String,
    pub length: String,
    pub citation_style: CitationStyle,
}

/// Result of one generation request
///
/// Serializes to the outbound shape `{success, paper, citations, references,
/// outline, word_count, error?}`. `citations`, `references` and `word_count`
/// are derived from the held state when written, never stored.
#[derive(Debug, Clone, Default)]
pub struct DocumentAggregate {
    pub success: bool,
    pub paper: PaperSection,
    pub references: ReferenceList,
    pub outline: String,
    pub error: Option<String>,
}

impl DocumentAggregate {
    /// Whitespace token count of the current body
    pub fn word_count(&self) -> usize {
        word_count(&self.paper.content)
    }

    /// Bibliography entries in the document's style
    pub fn formatted_references(&self) -> Vec<String> {
        self.references.formatted(self.paper.citation_style)
    }
}

impl Serialize for DocumentAggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.error.is_some() { 7 } else { 6 };
        let mut state = serializer.serialize_struct("DocumentAggregate", fields)?;
        state.serialize_field("success", &self.success)?;
        state.serialize_field("paper", &self.paper)?;
        let citations: Vec<&BibliographicRecord> = self.references.records().collect();
        state.serialize_field("citations", &citations)?;
        state.serialize_field("references", &self.formatted_references())?;
        state.serialize_field("outline", &self.outline)?;
        state.serialize_field("word_count", &self.word_count())?;
        if let Some(ref error) = self.error {
            state.serialize_field("error", error)?;
        }
        state.end()
    }
}

/// Result of enriching existing content with real citations
#[derive(Debug, Clone, Serialize)]
pub struct EnhancedDocument {
    pub success: bool,
    pub content: String,
    pub references: Vec<String>,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    #[test]
    fn test_reference_numbers_are_dense() {
        let mut list = ReferenceList::new();
        assert_eq!(list.push(RecordBuilder::new("A").build()), 1);
        assert_eq!(list.push(RecordBuilder::new("B").build()), 2);
        assert_eq!(list.push(RecordBuilder::new("C").build()), 3);

        let indices: Vec<usize> = list.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn test_numbered_entries() {
        let record = RecordBuilder::new("Only")
            .author("Ada Lovelace")
            .year(1843)
            .build();
        let list: ReferenceList = vec![record].into_iter().collect();

        assert_eq!(
            list.numbered(CitationStyle::Apa),
            vec!["[1] Ada Lovelace (1843). Only.".to_string()]
        );
    }

    #[test]
    fn test_word_count_is_derived_at_serialization() {
        let mut doc = DocumentAggregate {
            success: true,
            ..Default::default()
        };
        doc.paper.content = "one two".to_string();
        doc.paper.content.push_str(" three\n\nfour");

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["word_count"], 4);
        assert_eq!(json["paper"]["type"], "");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_field_serialized_when_present() {
        let doc = DocumentAggregate {
            error: Some("boom".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert_eq!(json["citations"], serde_json::json!([]));
    }
}
