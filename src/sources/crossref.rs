//! CrossRef bibliographic source implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{BibliographicRecord, RecordBuilder, SearchQuery, SearchResponse};
use crate::sources::{Source, SourceError};
use crate::utils::{api_retry_config, default_user_agent, with_retry, HttpClient, RetryConfig};

/// Public CrossRef REST endpoint
pub const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// CrossRef bibliographic source
///
/// Queries `/works` sorted by relevance and normalizes each item into a
/// [`BibliographicRecord`]. Items that do not match the expected shape are
/// skipped.
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: Arc<HttpClient>,
    base_url: String,
    mailto: Option<String>,
    retry: RetryConfig,
}

impl CrossRefSource {
    /// Create a source against the public API
    pub fn new() -> Result<Self, SourceError> {
        Self::with_base_url(CROSSREF_API_BASE, None, Duration::from_secs(30))
    }

    /// Create a source against a specific endpoint
    ///
    /// `mailto` is sent as a query parameter and in the user agent, which puts
    /// requests in CrossRef's polite pool.
    pub fn with_base_url(
        base_url: impl Into<String>,
        mailto: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let user_agent = match mailto {
            Some(ref email) => format!("{} (mailto:{})", default_user_agent(), email),
            None => default_user_agent().to_string(),
        };
        let client = HttpClient::with_timeout(&user_agent, timeout)?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mailto,
            retry: api_retry_config().attempt_timeout(timeout),
        })
    }

    /// Override the retry policy
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn works_url(&self) -> String {
        format!("{}/works", self.base_url)
    }
}

#[async_trait]
impl Source for CrossRefSource {
    fn id(&self) -> &str {
        "crossref"
    }

    fn name(&self) -> &str {
        "CrossRef"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query", query.query.clone()),
            ("rows", query.max_results.to_string()),
            ("sort", "relevance".to_string()),
        ];
        if let Some(filter) = query.year.as_deref().and_then(year_filter) {
            params.push(("filter", filter));
        }
        if let Some(ref mailto) = self.mailto {
            params.push(("mailto", mailto.clone()));
        }

        let client = Arc::clone(&self.client);
        let url = self.works_url();

        tracing::debug!("Searching CrossRef for '{}' ({} rows)", query.query, query.max_results);

        let data: CRResponse = with_retry(self.retry, || {
            let client = Arc::clone(&client);
            let url = url.clone();
            let params = params.clone();
            async move {
                let response = client.get(&url).query(&params).send().await.map_err(|e| {
                    SourceError::Network(format!("Failed to search CrossRef: {}", e))
                })?;

                if !response.status().is_success() {
                    return Err(SourceError::from_status(response.status(), "CrossRef"));
                }

                response
                    .json::<CRResponse>()
                    .await
                    .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))
            }
        })
        .await?;

        let item_count = data.message.items.len();
        let records: Vec<BibliographicRecord> = data
            .message
            .items
            .into_iter()
            .filter_map(parse_item)
            .collect();

        if records.len() < item_count {
            tracing::debug!(
                "Dropped {} malformed CrossRef items",
                item_count - records.len()
            );
        }

        let mut response = SearchResponse::new(records, self.name(), &query.query);
        if let Some(total) = data.message.total_results {
            response = response.total_results(total);
        }
        Ok(response)
    }
}

/// Translate "2020" or "2018-2022" into a CrossRef date filter
fn year_filter(year: &str) -> Option<String> {
    let (from, until) = match year.split_once('-') {
        Some((from, until)) => (from.trim(), until.trim()),
        None => (year.trim(), year.trim()),
    };
    let mut parts = Vec::new();
    if !from.is_empty() {
        parts.push(format!("from-pub-date:{}", from));
    }
    if !until.is_empty() {
        parts.push(format!("until-pub-date:{}", until));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(","))
    }
}

/// Normalize one raw CrossRef item
///
/// Authors are kept only when both given and family names are present. The
/// print year wins over the online year.
fn parse_item(item: serde_json::Value) -> Option<BibliographicRecord> {
    let item: CRItem = match serde_json::from_value(item) {
        Ok(item) => item,
        Err(e) => {
            tracing::debug!("Skipping CrossRef item: {}", e);
            return None;
        }
    };

    let title = item.title.into_iter().next().unwrap_or_default();

    let authors = item.author.into_iter().filter_map(|a| match (a.given, a.family) {
        (Some(given), Some(family)) if !given.trim().is_empty() && !family.trim().is_empty() => {
            Some(format!("{} {}", given.trim(), family.trim()))
        }
        _ => None,
    });

    let year = item
        .published_print
        .as_ref()
        .and_then(CRDate::year)
        .or_else(|| item.published_online.as_ref().and_then(CRDate::year));

    let mut builder = RecordBuilder::new(title).authors(authors).maybe_year(year);
    if let Some(venue) = item.container_title.into_iter().next() {
        builder = builder.venue(venue);
    }
    if let Some(doi) = item.doi {
        builder = builder.identifier(doi);
    }

    Some(builder.build())
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    message: CRMessage,
}

#[derive(Debug, Deserialize)]
struct CRMessage {
    #[serde(rename = "total-results")]
    total_results: Option<usize>,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CRAuthor {
    given: Option<String>,
    family: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CRItem {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(default)]
    author: Vec<CRAuthor>,
    #[serde(rename = "container-title", default)]
    container_title: Vec<String>,
    #[serde(rename = "published-print")]
    published_print: Option<CRDate>,
    #[serde(rename = "published-online")]
    published_online: Option<CRDate>,
}

#[derive(Debug, Deserialize)]
struct CRDate {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i64>>>,
}

impl CRDate {
    fn year(&self) -> Option<i32> {
        self.date_parts
            .first()
            .and_then(|parts| parts.first().copied().flatten())
            .and_then(|y| i32::try_from(y).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn source_for(server: &mockito::ServerGuard) -> CrossRefSource {
        CrossRefSource::with_base_url(server.url(), None, Duration::from_secs(5))
            .unwrap()
            .retry_config(api_retry_config().max_attempts(1))
    }

    fn sample_body() -> String {
        json!({
            "status": "ok",
            "message": {
                "total-results": 1234,
                "items": [
                    {
                        "title": [
                            "Quantum supremacy using a programmable superconducting processor"
                        ],
                        "DOI": "10.1038/s41586-019-1666-5",
                        "author": [
                            {"given": "Frank", "family": "Arute"},
                            {"family": "Consortium"},
                            {"given": "Kunal", "family": "Arya"}
                        ],
                        "container-title": ["Nature"],
                        "published-print": {"date-parts": [[2019, 10]]},
                        "published-online": {"date-parts": [[2019, 10, 23]]}
                    },
                    {
                        "title": [],
                        "published-online": {"date-parts": [[2021]]}
                    },
                    {
                        "title": "not a list"
                    }
                ]
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_search_normalizes_items() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/works")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "quantum computing".into()),
                Matcher::UrlEncoded("rows".into(), "3".into()),
                Matcher::UrlEncoded("sort".into(), "relevance".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(sample_body())
            .create_async()
            .await;

        let source = source_for(&server);
        let response = source
            .search(&SearchQuery::new("quantum computing").max_results(3))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.total_results, Some(1234));
        assert_eq!(response.source, "CrossRef");
        assert_eq!(response.records.len(), 2);

        let first = &response.records[0];
        assert_eq!(first.authors, vec!["Frank Arute", "Kunal Arya"]);
        assert_eq!(first.year, Some(2019));
        assert_eq!(first.venue.as_deref(), Some("Nature"));
        assert_eq!(
            first.url().as_deref(),
            Some("https://doi.org/10.1038/s41586-019-1666-5")
        );

        let second = &response.records[1];
        assert_eq!(second.title, "Untitled");
        assert_eq!(second.year, Some(2021));
        assert!(second.authors.is_empty());
        assert!(second.identifier.is_none());
    }

    #[tokio::test]
    async fn test_mailto_is_forwarded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/works")
            .match_query(Matcher::UrlEncoded("mailto".into(), "me@example.org".into()))
            .with_status(200)
            .with_body(r#"{"message": {"items": []}}"#)
            .create_async()
            .await;

        let source = CrossRefSource::with_base_url(
            server.url(),
            Some("me@example.org".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let response = source.search(&SearchQuery::new("soil")).await.unwrap();

        mock.assert_async().await;
        assert!(response.records.is_empty());
        assert_eq!(response.total_results, None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let source = source_for(&server);
        let err = source.search(&SearchQuery::new("soil")).await.unwrap_err();

        assert!(matches!(err, SourceError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/works")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let source = source_for(&server);
        let err = source.search(&SearchQuery::new("soil")).await.unwrap_err();

        assert!(matches!(err, SourceError::Parse(_)));
    }

    #[test]
    fn test_year_filter() {
        assert_eq!(
            year_filter("2020").as_deref(),
            Some("from-pub-date:2020,until-pub-date:2020")
        );
        assert_eq!(
            year_filter("2018-2022").as_deref(),
            Some("from-pub-date:2018,until-pub-date:2022")
        );
        assert_eq!(year_filter("2018-").as_deref(), Some("from-pub-date:2018"));
        assert_eq!(year_filter(" "), None);
    }

    #[test]
    fn test_null_date_parts_fall_back_to_online() {
        let record = parse_item(json!({
            "title": ["Sparse"],
            "published-print": {"date-parts": [[null]]},
            "published-online": {"date-parts": [[2020, 1]]}
        }))
        .unwrap();

        assert_eq!(record.year, Some(2020));
    }
}
