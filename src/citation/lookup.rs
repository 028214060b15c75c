//! Topic search that never fails the pipeline.

use std::sync::Arc;

use crate::models::{BibliographicRecord, SearchQuery};
use crate::sources::Source;

/// Bibliographic lookup over an injected [`Source`]
///
/// Backend failures are logged and turned into an empty result so a slow or
/// unreachable index only costs the document its references.
#[derive(Debug, Clone)]
pub struct BibliographicLookup {
    source: Arc<dyn Source>,
}

impl BibliographicLookup {
    pub fn new(source: Arc<dyn Source>) -> Self {
        Self { source }
    }

    /// Backend name, for logs and CLI output
    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Up to `limit` records for `query`, in backend relevance order
    pub async fn search(&self, query: &str, limit: usize) -> Vec<BibliographicRecord> {
        self.search_query(&SearchQuery::new(query.trim()).max_results(limit))
            .await
    }

    /// Search with a full query, year filter included
    pub async fn search_query(&self, query: &SearchQuery) -> Vec<BibliographicRecord> {
        if query.query.trim().is_empty() {
            tracing::warn!("Skipping bibliographic search for an empty query");
            return Vec::new();
        }

        match self.source.search(query).await {
            Ok(response) => {
                let mut records = response.records;
                records.truncate(query.max_results);
                tracing::debug!(
                    "{} returned {} records for '{}'",
                    self.source.name(),
                    records.len(),
                    query.query
                );
                records
            }
            Err(e) => {
                tracing::warn!("Error searching {}: {}", self.source.name(), e);
                Vec::new()
            }
        }
    }
}
