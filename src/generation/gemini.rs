//! Google Gemini `generateContent` backend.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::generation::{GenerationError, Generator};
use crate::utils::{api_retry_config, default_user_agent, with_retry, HttpClient, RetryConfig};

/// Public Gemini REST endpoint
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Gemini text generator
///
/// The API key is passed in at construction; nothing is read from the
/// environment here.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: Arc<HttpClient>,
    base_url: String,
    model: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiGenerator {
    /// Create a generator against the public API
    pub fn new(api_key: Option<String>) -> Result<Self, GenerationError> {
        Self::with_base_url(GEMINI_API_BASE, DEFAULT_MODEL, api_key, Duration::from_secs(120))
    }

    /// Create a generator against a specific endpoint and model
    ///
    /// A leading `models/` on the model name is accepted and stripped.
    pub fn with_base_url(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let model = model.into();
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        let client = HttpClient::with_timeout(default_user_agent(), timeout)?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            retry: api_retry_config().attempt_timeout(timeout),
        })
    }

    /// Override the retry policy
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.clone().ok_or(GenerationError::NotConfigured)?;
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let client = Arc::clone(&self.client);
        let url = self.endpoint();

        tracing::debug!("Sending {} byte prompt to {}", prompt.len(), self.model);

        let data: GeminiResponse = with_retry(self.retry, || {
            let client = Arc::clone(&client);
            let url = url.clone();
            let api_key = api_key.clone();
            let body = body.clone();
            async move {
                let response = client
                    .post(&url)
                    .query(&[("key", api_key.as_str())])
                    .json(&body)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let message = response
                        .json::<GeminiErrorBody>()
                        .await
                        .map(|b| b.error.message)
                        .unwrap_or_else(|_| status.to_string());
                    return Err(GenerationError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }

                response
                    .json::<GeminiResponse>()
                    .await
                    .map_err(|e| GenerationError::Parse(e.to_string()))
            }
        })
        .await?;

        let text: String = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        tracing::debug!("{} returned {} bytes", self.model, text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}

// ===== Gemini API Types =====

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn generator_for(server: &mockito::ServerGuard, key: Option<&str>) -> GeminiGenerator {
        GeminiGenerator::with_base_url(
            server.url(),
            "models/gemini-1.5-flash",
            key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
        .retry_config(api_retry_config().max_attempts(1))
    }

    #[tokio::test]
    async fn test_complete_joins_parts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-1.5-flash:generateContent")
            .match_query(Matcher::UrlEncoded("key".into(), "secret".into()))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{ "parts": [{ "text": "Write about soil" }] }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"candidates": [{"content": {"parts": [
                    {"text": "# Soil\n"},
                    {"text": "Body."}
                ]}}]})
                .to_string(),
            )
            .create_async()
            .await;

        let generator = generator_for(&server, Some("secret"));
        let text = generator.complete("Write about soil").await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "# Soil\nBody.");
        assert_eq!(generator.model(), "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let server = mockito::Server::new_async().await;
        let generator = generator_for(&server, None);

        assert_eq!(
            generator.complete("anything").await,
            Err(GenerationError::NotConfigured)
        );
    }

    #[tokio::test]
    async fn test_api_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-1.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(
                json!({"error": {
                    "code": 400,
                    "message": "API key not valid",
                    "status": "INVALID_ARGUMENT"
                }})
                .to_string(),
            )
            .create_async()
            .await;

        let generator = generator_for(&server, Some("bad"));
        let err = generator.complete("anything").await.unwrap_err();

        assert_eq!(
            err,
            GenerationError::Api {
                status: 400,
                message: "API key not valid".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_empty_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/gemini-1.5-flash:generateContent")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let generator = generator_for(&server, Some("secret"));
        assert_eq!(
            generator.complete("anything").await,
            Err(GenerationError::EmptyResponse)
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let generator = GeminiGenerator::new(Some("top-secret".to_string())).unwrap();
        let debug = format!("{:?}", generator);
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
