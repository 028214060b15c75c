//! Search request and response models.

use serde::{Deserialize, Serialize};

use crate::models::BibliographicRecord;

/// Default number of records requested from a bibliographic backend
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Upper bound accepted from callers
pub const MAX_RESULTS_LIMIT: usize = 100;

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query
    pub query: String,

    /// Maximum number of records to return
    pub max_results: usize,

    /// Year filter ("2020" or "2018-2022")
    pub year: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
            year: None,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results; zero is raised to one
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max.max(1);
        self
    }

    /// Set year filter
    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }
}

/// Records returned by one backend for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Normalized records in backend order
    pub records: Vec<BibliographicRecord>,

    /// Total number of matches reported by the backend
    pub total_results: Option<usize>,

    /// Backend that answered
    pub source: String,

    /// Query that was executed
    pub query: String,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(
        records: Vec<BibliographicRecord>,
        source: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            records,
            total_results: None,
            source: source.into(),
            query: query.into(),
        }
    }

    /// Set total results
    pub fn total_results(mut self, total: usize) -> Self {
        self.total_results = Some(total);
        self
    }
}
