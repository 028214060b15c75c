//! Bibliographic sources behind a trait-based seam.
//!
//! This module defines the [`Source`] trait that every bibliographic backend
//! implements. The production backend is [`CrossRefSource`]; tests inject
//! [`MockSource`] instead. Callers hold an `Arc<dyn Source>` so the backend can
//! be swapped without touching the citation pipeline.

mod crossref;
pub mod mock;

pub use crossref::{CrossRefSource, CROSSREF_API_BASE};
pub use mock::MockSource;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::models::{SearchQuery, SearchResponse};
use crate::utils::{Retryable, TransientError};

/// The Source trait defines the interface for bibliographic search backends.
///
/// Implementations normalize whatever their upstream returns into
/// [`BibliographicRecord`](crate::models::BibliographicRecord)s; entries that
/// cannot be normalized are dropped rather than failing the whole search.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source (e.g. "crossref")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for records matching the query
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The request did not finish in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Non-success status from the source
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl SourceError {
    /// Build an API error from a response status
    pub fn from_status(status: StatusCode, source_name: &str) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return SourceError::RateLimit;
        }
        SourceError::Api {
            status: status.as_u16(),
            message: format!("{} returned status: {}", source_name, status),
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl Retryable for SourceError {
    fn transient(&self) -> Option<TransientError> {
        match self {
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::Timeout(_) => Some(TransientError::Timeout),
            SourceError::RateLimit => Some(TransientError::RateLimit(None)),
            SourceError::Api { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .and_then(TransientError::from_status),
            SourceError::Parse(_) => None,
        }
    }

    fn timed_out(limit: Duration) -> Self {
        SourceError::Timeout(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert_eq!(
            SourceError::Network("reset".into()).transient(),
            Some(TransientError::Network)
        );
        assert_eq!(
            SourceError::from_status(StatusCode::TOO_MANY_REQUESTS, "CrossRef").transient(),
            Some(TransientError::RateLimit(None))
        );
        assert_eq!(
            SourceError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "CrossRef").transient(),
            Some(TransientError::ServerError)
        );
        assert_eq!(
            SourceError::from_status(StatusCode::BAD_REQUEST, "CrossRef").transient(),
            None
        );
        assert_eq!(SourceError::Parse("bad".into()).transient(), None);
        assert_eq!(
            SourceError::Timeout(Duration::from_secs(1)).transient(),
            Some(TransientError::Timeout)
        );
    }

    #[test]
    fn test_api_error_message() {
        let err = SourceError::from_status(StatusCode::NOT_FOUND, "CrossRef");
        assert_eq!(
            err.to_string(),
            "API error (404): CrossRef returned status: 404 Not Found"
        );
    }
}
