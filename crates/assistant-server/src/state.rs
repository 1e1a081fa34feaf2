//! Application State

use std::sync::Arc;

use assistant_core::{MemorySessionStore, ProviderConnector};
use assistant_tools::{encyclopedia::EncyclopediaClient, AssistantSettings};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Builds an LLM provider from the key sent with each question
    pub connector: Arc<dyn ProviderConnector>,

    /// Lookup service behind the Wikipedia tool
    pub encyclopedia: Arc<dyn EncyclopediaClient>,

    /// Open sessions
    pub sessions: Arc<MemorySessionStore>,

    /// Agent knobs
    pub settings: AssistantSettings,
}
