//! Wikipedia Client
//!
//! Searches the MediaWiki API for matching titles and returns the plain-text
//! intro of each page.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;

use super::EncyclopediaClient;
use crate::error::{Result, ToolError};

/// Returned when no page matched the query
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

/// Longest query sent to the search API
const MAX_QUERY_LENGTH: usize = 300;

/// Wikipedia client configuration
#[derive(Clone, Debug)]
pub struct WikipediaConfig {
    /// Site root; `None` means `https://{lang}.wikipedia.org`
    pub base_url: Option<String>,

    /// Language edition
    pub lang: String,

    /// Number of pages summarised per query
    pub top_k_results: usize,

    /// Output is cut to this many characters
    pub doc_content_chars_max: usize,

    /// Sent as `User-Agent`, which Wikimedia requires
    pub user_agent: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            lang: "en".into(),
            top_k_results: 3,
            doc_content_chars_max: 4000,
            user_agent: concat!("genai-assistant/", env!("CARGO_PKG_VERSION")).into(),
            timeout_secs: 30,
        }
    }
}

impl WikipediaConfig {
    /// Read `WIKIPEDIA_LANG`, `WIKIPEDIA_TOP_K` and `WIKIPEDIA_MAX_CHARS`
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            lang: std::env::var("WIKIPEDIA_LANG").unwrap_or(defaults.lang),
            top_k_results: std::env::var("WIKIPEDIA_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.top_k_results),
            doc_content_chars_max: std::env::var("WIKIPEDIA_MAX_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.doc_content_chars_max),
            ..defaults
        }
    }

    fn api_url(&self) -> String {
        let root = self
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org", self.lang));
        format!("{}/w/api.php", root.trim_end_matches('/'))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    extract: Option<String>,
}

/// MediaWiki-backed encyclopedia
pub struct WikipediaClient {
    client: Client,
    config: WikipediaConfig,
}

impl WikipediaClient {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn new(config: WikipediaConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ToolError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be built.
    pub fn from_env() -> Result<Self> {
        Self::new(WikipediaConfig::from_env())
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, params: &[(&str, &str)]) -> Result<T> {
        let response = self.client
            .get(self.config.api_url())
            .query(params)
            .query(&[("format", "json"), ("utf8", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::EncyclopediaStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    /// Titles matching the query, best first
    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.config.top_k_results.to_string();
        let response: SearchResponse = self
            .get(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", &limit),
            ])
            .await?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    /// Intro extract for one page; `None` for missing or empty pages
    async fn summary(&self, title: &str) -> Result<Option<(String, String)>> {
        let response: ExtractResponse = self
            .get(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        Ok(response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| {
                let extract = page.extract?.trim().to_string();
                (!extract.is_empty()).then_some((page.title, extract))
            }))
    }
}

#[async_trait]
impl EncyclopediaClient for WikipediaClient {
    async fn search(&self, query: &str) -> Result<String> {
        let query: String = query.chars().take(MAX_QUERY_LENGTH).collect();
        let titles = self.search_titles(&query).await?;
        tracing::debug!(query = %query, hits = titles.len(), "Wikipedia search");

        let summaries = join_all(titles.iter().map(|t| self.summary(t))).await;

        let pages: Vec<String> = summaries
            .into_iter()
            .filter_map(|result| match result {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!("Skipping Wikipedia page: {}", e);
                    None
                }
            })
            .map(|(title, summary)| format!("Page: {title}\nSummary: {summary}"))
            .collect();

        if pages.is_empty() {
            return Ok(NO_RESULT.into());
        }

        Ok(pages
            .join("\n\n")
            .chars()
            .take(self.config.doc_content_chars_max)
            .collect())
    }

    async fn health_check(&self) -> bool {
        self.get::<serde_json::Value>(&[("action", "query"), ("meta", "siteinfo")])
            .await
            .is_ok()
    }

    fn name(&self) -> &str {
        "Wikipedia"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, config: WikipediaConfig) -> WikipediaClient {
        WikipediaClient::new(WikipediaConfig {
            base_url: Some(server.uri()),
            ..config
        })
        .unwrap()
    }

    async fn mount_search(server: &MockServer, titles: &[&str]) {
        let hits: Vec<_> = titles.iter().map(|t| json!({"ns": 0, "title": t})).collect();
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("list", "search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "batchcomplete": "",
                "query": {"search": hits}
            })))
            .mount(server)
            .await;
    }

    async fn mount_page(server: &MockServer, title: &str, extract: &str) {
        Mock::given(method("GET"))
            .and(path("/w/api.php"))
            .and(query_param("prop", "extracts"))
            .and(query_param("titles", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "query": {"pages": {"1": {"pageid": 1, "title": title, "extract": extract}}}
            })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_api_url() {
        let config = WikipediaConfig {
            lang: "fr".into(),
            ..Default::default()
        };
        assert_eq!(config.api_url(), "https://fr.wikipedia.org/w/api.php");
    }

    #[tokio::test]
    async fn test_search_formats_pages_in_order() {
        let server = MockServer::start().await;
        mount_search(&server, &["Paris", "Paris Commune"]).await;
        mount_page(&server, "Paris", "Paris is the capital of France.").await;
        mount_page(&server, "Paris Commune", "A revolutionary government.").await;

        let text = client(&server, WikipediaConfig::default())
            .search("capital of France")
            .await
            .unwrap();

        assert_eq!(
            text,
            "Page: Paris\nSummary: Paris is the capital of France.\n\n\
             Page: Paris Commune\nSummary: A revolutionary government."
        );
    }

    #[tokio::test]
    async fn test_search_without_hits() {
        let server = MockServer::start().await;
        mount_search(&server, &[]).await;

        let text = client(&server, WikipediaConfig::default()).search("qwxzv").await.unwrap();
        assert_eq!(text, NO_RESULT);
    }

    #[tokio::test]
    async fn test_output_is_truncated() {
        let server = MockServer::start().await;
        mount_search(&server, &["Rust"]).await;
        mount_page(&server, "Rust", &"x".repeat(500)).await;

        let config = WikipediaConfig {
            doc_content_chars_max: 40,
            ..Default::default()
        };
        let text = client(&server, config).search("Rust").await.unwrap();
        assert_eq!(text.chars().count(), 40);
        assert!(text.starts_with("Page: Rust\nSummary: xxx"));
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client(&server, WikipediaConfig::default()).search("Paris").await.unwrap_err();
        assert!(matches!(err, ToolError::EncyclopediaStatus { status: 503, .. }));
    }
}
