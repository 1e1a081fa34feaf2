//! Assistant Assembly
//!
//! Wires the three tools and the agent around one provider.

use std::sync::Arc;

use assistant_core::{
    provider::{GenerationOptions, LlmProvider},
    Agent, AgentBuilder, AgentConfig, Result as CoreResult, ToolRegistry,
};

use crate::encyclopedia::EncyclopediaClient;
use crate::svckit::{CalculatorTool, ReasoningTool, WikipediaTool};
use crate::ASSISTANT_PROMPT;

/// Agent knobs exposed to configuration
#[derive(Clone, Debug)]
pub struct AssistantSettings {
    /// Model identifier for the agent and both prompt tools
    pub model: String,

    /// Upper bound on reasoning rounds
    pub max_iterations: usize,

    /// Log every step at `info`
    pub verbose: bool,

    /// Feed malformed tool blocks back to the model
    pub handle_parsing_errors: bool,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        let agent = AgentConfig::default();
        Self {
            model: agent.generation.model,
            max_iterations: agent.max_iterations,
            verbose: agent.verbose,
            handle_parsing_errors: agent.handle_parsing_errors,
        }
    }
}

impl AssistantSettings {
    /// Read `AGENT_MAX_ITERATIONS` and `AGENT_VERBOSE`; the model comes from
    /// the provider connector
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let defaults = Self::default();
        Self {
            model: model.into(),
            max_iterations: std::env::var("AGENT_MAX_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_iterations),
            verbose: std::env::var("AGENT_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.verbose),
            handle_parsing_errors: defaults.handle_parsing_errors,
        }
    }

    fn generation(&self) -> GenerationOptions {
        GenerationOptions {
            model: self.model.clone(),
            ..Default::default()
        }
    }
}

/// Build the Wikipedia, Calculator and Reasoning tools
///
/// # Errors
///
/// Fails only if a built-in template is invalid.
pub fn build_toolset(
    provider: &Arc<dyn LlmProvider>,
    encyclopedia: Arc<dyn EncyclopediaClient>,
    settings: &AssistantSettings,
) -> CoreResult<ToolRegistry> {
    let mut tools = ToolRegistry::new();
    tools.register(WikipediaTool::new(encyclopedia));
    tools.register(CalculatorTool::new(provider.clone(), settings.generation())?);
    tools.register(ReasoningTool::new(provider.clone(), settings.generation())?);
    Ok(tools)
}

/// Build the agent that answers questions for one credential
///
/// # Errors
///
/// Fails only if a built-in template is invalid.
pub fn build_agent(
    provider: Arc<dyn LlmProvider>,
    encyclopedia: Arc<dyn EncyclopediaClient>,
    settings: &AssistantSettings,
) -> CoreResult<Agent> {
    let tools = build_toolset(&provider, encyclopedia, settings)?;

    AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .system_prompt(ASSISTANT_PROMPT)
        .model(settings.model.clone())
        .max_iterations(settings.max_iterations)
        .verbose(settings.verbose)
        .handle_parsing_errors(settings.handle_parsing_errors)
        .build()
}
