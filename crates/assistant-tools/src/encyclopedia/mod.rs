//! Encyclopedia Integration
//!
//! Abstraction over the topic lookup service behind the Wikipedia tool.

mod mock;
mod wikipedia;

pub use mock::MockEncyclopedia;
pub use wikipedia::{WikipediaClient, WikipediaConfig, NO_RESULT};

use async_trait::async_trait;

use crate::error::Result;

/// Encyclopedia client trait (Strategy pattern)
#[async_trait]
pub trait EncyclopediaClient: Send + Sync {
    /// Look up a topic and return readable summary text
    async fn search(&self, query: &str) -> Result<String>;

    /// Check if the service is reachable
    async fn health_check(&self) -> bool;

    /// Service name
    fn name(&self) -> &str;
}
