//! Mock Encyclopedia
//!
//! For tests and offline wiring. Serves a few static articles.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{EncyclopediaClient, NO_RESULT};
use crate::error::{Result, ToolError};

/// Mock encyclopedia with static summaries
#[derive(Clone, Default)]
pub struct MockEncyclopedia {
    articles: Vec<(String, String)>,
    queries: Arc<Mutex<Vec<String>>>,
    offline: bool,
}

impl MockEncyclopedia {
    #[must_use]
    pub fn new() -> Self {
        Self::default().with_article(
            "Paris",
            "Paris is the capital and largest city of France.",
        )
    }

    /// Add an article matched by case-insensitive substring of the query
    #[must_use]
    pub fn with_article(mut self, title: impl Into<String>, summary: impl Into<String>) -> Self {
        self.articles.push((title.into(), summary.into()));
        self
    }

    /// Make every search fail
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Queries received so far
    pub async fn queries(&self) -> Vec<String> {
        self.queries.lock().await.clone()
    }
}

#[async_trait]
impl EncyclopediaClient for MockEncyclopedia {
    async fn search(&self, query: &str) -> Result<String> {
        self.queries.lock().await.push(query.to_string());

        if self.offline {
            return Err(ToolError::Encyclopedia("service offline".into()));
        }

        let needle = query.to_lowercase();
        let pages: Vec<String> = self
            .articles
            .iter()
            .filter(|(title, _)| needle.contains(&title.to_lowercase()))
            .map(|(title, summary)| format!("Page: {title}\nSummary: {summary}"))
            .collect();

        if pages.is_empty() {
            Ok(NO_RESULT.into())
        } else {
            Ok(pages.join("\n\n"))
        }
    }

    async fn health_check(&self) -> bool {
        !self.offline
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
