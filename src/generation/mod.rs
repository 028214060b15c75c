//! Generative text backends.
//!
//! The pipeline only needs `complete(prompt) -> text`. [`GeminiGenerator`] is
//! the production backend and [`MockGenerator`] the test double. Failures are
//! returned as [`GenerationError`]; turning them into inline error text is the
//! assembler's job.

mod gemini;
pub mod mock;
pub mod prompts;

pub use gemini::{GeminiGenerator, DEFAULT_MODEL, GEMINI_API_BASE};
pub use mock::MockGenerator;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::utils::{Retryable, TransientError};

/// A text generation backend
#[async_trait]
pub trait Generator: Send + Sync + std::fmt::Debug {
    /// Complete the prompt
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Backend name for logs
    fn name(&self) -> &str;
}

/// Errors raised by a generation backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("generation API key is not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response contained no text")]
    EmptyResponse,

    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Network(err.to_string())
    }
}

impl Retryable for GenerationError {
    fn transient(&self) -> Option<TransientError> {
        match self {
            GenerationError::Network(_) => Some(TransientError::Network),
            GenerationError::Timeout(_) => Some(TransientError::Timeout),
            GenerationError::Api { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .and_then(TransientError::from_status),
            GenerationError::NotConfigured
            | GenerationError::EmptyResponse
            | GenerationError::Parse(_) => None,
        }
    }

    fn timed_out(limit: Duration) -> Self {
        GenerationError::Timeout(limit)
    }
}
