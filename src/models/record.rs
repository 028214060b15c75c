//! Bibliographic record model shared by lookup, formatting and assembly.

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Title used when a source provides none
pub const UNTITLED: &str = "Untitled";

/// Base used to derive a resolvable URL from a DOI
pub const DOI_RESOLVER: &str = "https://doi.org/";

/// One normalized bibliographic source
///
/// Every source backend maps its own metadata onto this shape. Optional fields
/// stay `None` when the backend has nothing usable; formatting degrades to
/// sentinel text instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BibliographicRecord {
    /// Work title, [`UNTITLED`] when absent
    #[serde(default = "untitled")]
    pub title: String,

    /// Full author names in listed order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,

    /// Journal or container name
    #[serde(default)]
    pub venue: Option<String>,

    /// Persistent identifier (DOI)
    #[serde(default, alias = "doi")]
    pub identifier: Option<String>,
}

fn untitled() -> String {
    UNTITLED.to_string()
}

impl BibliographicRecord {
    /// Create a record with only a title
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            untitled()
        } else {
            title
        };

        Self {
            title,
            authors: Vec::new(),
            year: None,
            venue: None,
            identifier: None,
        }
    }

    /// Resolvable URL, present exactly when an identifier is
    pub fn url(&self) -> Option<String> {
        self.identifier
            .as_deref()
            .map(|id| format!("{}{}", DOI_RESOLVER, id))
    }

    /// First author, if any
    pub fn first_author(&self) -> Option<&str> {
        self.authors.first().map(|s| s.as_str())
    }

    /// Family name of the first author (last whitespace-separated word)
    pub fn first_author_surname(&self) -> Option<&str> {
        self.first_author()
            .and_then(|name| name.split_whitespace().last())
    }
}

impl Default for BibliographicRecord {
    fn default() -> Self {
        Self::new(UNTITLED)
    }
}

// The url is derived, so it is written out but never read back in.
impl Serialize for BibliographicRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BibliographicRecord", 6)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("authors", &self.authors)?;
        state.serialize_field("year", &self.year)?;
        state.serialize_field("venue", &self.venue)?;
        state.serialize_field("identifier", &self.identifier)?;
        state.serialize_field("url", &self.url())?;
        state.end()
    }
}

/// Builder for constructing records from loosely-shaped backend data
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    record: BibliographicRecord,
}

impl RecordBuilder {
    /// Start a record; a blank title becomes [`UNTITLED`]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            record: BibliographicRecord::new(title),
        }
    }

    /// Append one author name, ignoring blanks
    pub fn author(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.record.authors.push(name.trim().to_string());
        }
        self
    }

    /// Append several author names
    pub fn authors<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, |b, name| b.author(name))
    }

    /// Set the publication year
    pub fn year(mut self, year: i32) -> Self {
        self.record.year = Some(year);
        self
    }

    /// Set the publication year if known
    pub fn maybe_year(mut self, year: Option<i32>) -> Self {
        self.record.year = year;
        self
    }

    /// Set the venue; blank values are treated as absent
    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.record.venue = non_blank(venue.into());
        self
    }

    /// Set the persistent identifier; blank values are treated as absent
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.record.identifier = non_blank(identifier.into());
        self
    }

    /// Build the record
    pub fn build(self) -> BibliographicRecord {
        self.record
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = RecordBuilder::new("Attention Is All You Need")
            .authors(["Ashish Vaswani", "Noam Shazeer"])
            .year(2017)
            .venue("NeurIPS")
            .identifier("10.5555/3295222.3295349")
            .build();

        assert_eq!(record.title, "Attention Is All You Need");
        assert_eq!(record.authors.len(), 2);
        assert_eq!(record.year, Some(2017));
        assert_eq!(record.venue.as_deref(), Some("NeurIPS"));
        assert_eq!(
            record.url().as_deref(),
            Some("https://doi.org/10.5555/3295222.3295349")
        );
    }

    #[test]
    fn test_blank_fields_become_absent() {
        let record = RecordBuilder::new("   ")
            .author("")
            .venue("  ")
            .identifier("")
            .build();

        assert_eq!(record.title, UNTITLED);
        assert!(record.authors.is_empty());
        assert!(record.venue.is_none());
        assert!(record.identifier.is_none());
        assert!(record.url().is_none());
    }

    #[test]
    fn test_first_author_surname() {
        let record = RecordBuilder::new("T").author("Grace Brewster Hopper").build();
        assert_eq!(record.first_author_surname(), Some("Hopper"));
        assert_eq!(BibliographicRecord::default().first_author_surname(), None);
    }

    #[test]
    fn test_serialized_url_tracks_identifier() {
        let with_doi = RecordBuilder::new("T").identifier("10.1/x").build();
        let json = serde_json::to_value(&with_doi).unwrap();
        assert_eq!(json["url"], "https://doi.org/10.1/x");

        let without = RecordBuilder::new("T").build();
        let json = serde_json::to_value(&without).unwrap();
        assert!(json["url"].is_null());
    }

    #[test]
    fn test_deserialize_defaults() {
        let record: BibliographicRecord = serde_json::from_str(r#"{"doi": "10.1/y"}"#).unwrap();
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.identifier.as_deref(), Some("10.1/y"));
    }
}
