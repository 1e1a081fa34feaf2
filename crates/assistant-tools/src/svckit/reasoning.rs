//! Reasoning Tool
//!
//! Explains logic and reasoning questions point-wise via the LLM.

use std::sync::Arc;

use assistant_core::{
    provider::{GenerationOptions, LlmProvider},
    Result as CoreResult, Tool, ToolKind,
};
use async_trait::async_trait;

use super::PromptChain;
use crate::prompts::reasoning_template;

/// Tool for logic-based questions
pub struct ReasoningTool {
    chain: PromptChain,
}

impl ReasoningTool {
    /// # Errors
    ///
    /// Fails only if the built-in template is invalid.
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> CoreResult<Self> {
        Ok(Self {
            chain: PromptChain::new(provider, reasoning_template()?, options),
        })
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Reasoning
    }

    async fn run(&self, input: &str) -> CoreResult<String> {
        self.chain.run(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{mock::MockProvider, AgentError};

    #[tokio::test]
    async fn test_prompt_uses_reasoning_template() {
        let provider = MockProvider::new(["1. All squares have four right angles."]);
        let tool = ReasoningTool::new(Arc::new(provider.clone()), GenerationOptions::default()).unwrap();

        let answer = tool.run("Is every square a rectangle?").await.unwrap();
        assert_eq!(answer, "1. All squares have four right angles.");

        let prompt = &provider.prompts()[0];
        assert!(prompt.contains("logical or reasoning-based questions"));
        assert!(prompt.contains("Question: Is every square a rectangle?"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = MockProvider::new(Vec::<String>::new())
            .then_fail(AgentError::RateLimited("try later".into()));
        let tool = ReasoningTool::new(Arc::new(provider), GenerationOptions::default()).unwrap();
        assert!(matches!(tool.run("why?").await, Err(AgentError::RateLimited(_))));
    }
}
