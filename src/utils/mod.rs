//! Utility modules shared by the lookup and generation backends.
//!
//! - [`HttpClient`]: shared reqwest client with timeouts applied
//! - [`with_retry`]: run an operation with backoff on transient failures
//! - [`require_text`], [`sanitize_filename`]: input validation
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use paper_forge::sources::SourceError;
//! use paper_forge::utils::{api_retry_config, with_retry};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = api_retry_config().max_attempts(2);
//! let result = with_retry(config, || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;
mod validate;

pub use http::{default_user_agent, HttpClient};
pub use retry::{api_retry_config, with_retry, RetryConfig, Retryable, TransientError};
pub use validate::{require_text, sanitize_filename, validate_max_results, ValidationError};
