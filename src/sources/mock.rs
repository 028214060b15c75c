//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::models::{BibliographicRecord, SearchQuery, SearchResponse};
use crate::sources::{Source, SourceError};

#[derive(Debug)]
enum Canned {
    Records(Vec<BibliographicRecord>),
    Failure(String),
}

/// A mock source for testing that returns predefined responses.
///
/// Without a configured response every search succeeds with no records.
/// Configured records are truncated to the requested `max_results`.
#[derive(Debug, Default)]
pub struct MockSource {
    response: Mutex<Option<Canned>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockSource {
    /// Create a new mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source that always returns these records.
    pub fn with_records(records: Vec<BibliographicRecord>) -> Self {
        let source = Self::new();
        source.set_records(records);
        source
    }

    /// Set the records to return.
    pub fn set_records(&self, records: Vec<BibliographicRecord>) {
        if let Ok(mut guard) = self.response.lock() {
            *guard = Some(Canned::Records(records));
        }
    }

    /// Make every search fail with a network error.
    pub fn set_failure(&self, message: impl Into<String>) {
        if let Ok(mut guard) = self.response.lock() {
            *guard = Some(Canned::Failure(message.into()));
        }
    }

    /// Queries received so far, oldest first.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        if let Ok(mut guard) = self.queries.lock() {
            guard.push(query.clone());
        }

        let guard = self
            .response
            .lock()
            .map_err(|_| SourceError::Network("mock source lock poisoned".to_string()))?;

        match &*guard {
            Some(Canned::Records(records)) => {
                let records: Vec<BibliographicRecord> =
                    records.iter().take(query.max_results).cloned().collect();
                let total = records.len();
                Ok(SearchResponse::new(records, self.name(), &query.query).total_results(total))
            }
            Some(Canned::Failure(message)) => Err(SourceError::Network(message.clone())),
            None => Ok(SearchResponse::new(Vec::new(), self.name(), &query.query)),
        }
    }
}

/// Helper function to create a mock record for testing.
pub fn make_record(title: &str, author: &str, year: i32) -> BibliographicRecord {
    crate::models::RecordBuilder::new(title)
        .author(author)
        .year(year)
        .venue("Journal of Testing")
        .identifier(format!("10.1000/{}", title.to_lowercase().replace(' ', "-")))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_truncates_and_records_queries() {
        let source = MockSource::with_records(vec![
            make_record("One", "Ada Lovelace", 1843),
            make_record("Two", "Alan Turing", 1936),
            make_record("Three", "Grace Hopper", 1952),
        ]);

        let response = source
            .search(&SearchQuery::new("computing").max_results(2))
            .await
            .unwrap();

        assert_eq!(response.records.len(), 2);
        assert_eq!(source.queries().len(), 1);
        assert_eq!(source.queries()[0].query, "computing");
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let source = MockSource::new();
        source.set_failure("offline");

        let err = source.search(&SearchQuery::new("x")).await.unwrap_err();
        assert_eq!(err.to_string(), "Network error: offline");
    }
}
