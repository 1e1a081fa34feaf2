//! Prompt Chain
//!
//! Renders a one-variable template and sends it to the LLM as a single user
//! message. The reply text is returned untouched.

use std::sync::Arc;

use assistant_core::{
    provider::{GenerationOptions, LlmProvider},
    Message, PromptTemplate, Result,
};

pub struct PromptChain {
    provider: Arc<dyn LlmProvider>,
    template: PromptTemplate,
    options: GenerationOptions,
}

impl PromptChain {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        template: PromptTemplate,
        options: GenerationOptions,
    ) -> Self {
        Self {
            provider,
            template,
            options,
        }
    }

    /// The exact prompt that `run` would submit
    ///
    /// # Errors
    ///
    /// Fails when the template does not take exactly one variable.
    pub fn render(&self, input: &str) -> Result<String> {
        self.template.format(input)
    }

    /// # Errors
    ///
    /// Rendering and provider failures.
    pub async fn run(&self, input: &str) -> Result<String> {
        let prompt = self.render(input)?;
        let completion = self.provider
            .complete(&[Message::user(prompt)], &self.options)
            .await?;
        Ok(completion.content)
    }
}
