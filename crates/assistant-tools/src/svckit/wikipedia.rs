//! Wikipedia Tool
//!
//! Forwards the topic unchanged to the encyclopedia client.

use std::sync::Arc;

use assistant_core::{Result as CoreResult, Tool, ToolKind};
use async_trait::async_trait;

use crate::encyclopedia::EncyclopediaClient;

/// Tool for general knowledge lookups
pub struct WikipediaTool {
    encyclopedia: Arc<dyn EncyclopediaClient>,
}

impl WikipediaTool {
    pub fn new(encyclopedia: Arc<dyn EncyclopediaClient>) -> Self {
        Self { encyclopedia }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Wikipedia
    }

    async fn run(&self, input: &str) -> CoreResult<String> {
        Ok(self.encyclopedia.search(input).await?)
    }
}
