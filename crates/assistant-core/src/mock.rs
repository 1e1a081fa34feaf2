//! Mock Provider
//!
//! Scripted provider for tests and local wiring. Replies are handed out in
//! order and every request is recorded.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::credential::Credential;
use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{
    Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderConnector,
};

/// A mock provider that returns pre-configured responses
#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Result<String>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of text replies
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect())),
            requests: Arc::default(),
        }
    }

    /// Queue an error as the next reply
    #[must_use]
    pub fn then_fail(self, error: AgentError) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(error));
        self
    }

    /// Every message list passed to `complete`, in call order
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Content of the last message of every request
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| r.last().map(|m| m.content.clone()))
            .collect()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(messages.to_vec());

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        // Empty reply once the script runs out
        let content = next.unwrap_or_else(|| Ok(String::new()))?;

        Ok(Completion {
            content,
            model: options.model.clone(),
            usage: None,
            truncated: false,
            finish_reason: Some(FinishReason::Stop),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "mock".into(),
            owned_by: None,
            context_length: None,
        }])
    }
}

/// Connector that hands out one shared [`MockProvider`]
#[derive(Clone, Default)]
pub struct MockConnector {
    provider: MockProvider,
    connections: Arc<Mutex<usize>>,
}

impl MockConnector {
    #[must_use]
    pub fn new(provider: MockProvider) -> Self {
        Self {
            provider,
            connections: Arc::default(),
        }
    }

    /// How many times `connect` was called
    #[must_use]
    pub fn connections(&self) -> usize {
        *self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn provider(&self) -> &MockProvider {
        &self.provider
    }
}

impl ProviderConnector for MockConnector {
    fn name(&self) -> &str {
        "Mock"
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn connect(&self, _credential: &Credential) -> Result<Arc<dyn LlmProvider>> {
        *self.connections.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(Arc::new(self.provider.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order_then_empty() {
        let provider = MockProvider::new(["first", "second"]);
        let opts = GenerationOptions::default();
        let msgs = [Message::user("hi")];

        assert_eq!(provider.complete(&msgs, &opts).await.unwrap().content, "first");
        assert_eq!(provider.complete(&msgs, &opts).await.unwrap().content, "second");
        assert_eq!(provider.complete(&msgs, &opts).await.unwrap().content, "");
        assert_eq!(provider.prompts(), vec!["hi", "hi", "hi"]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let provider = MockProvider::new(Vec::<String>::new())
            .then_fail(AgentError::Auth("Invalid API Key".into()));
        let err = provider
            .complete(&[Message::user("x")], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Auth(_)));
    }
}
