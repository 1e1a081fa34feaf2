//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior.
//! The agent observes, thinks, acts (via tools), and responds.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message, Role};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Answer returned when the loop runs out of iterations
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    pub inject_tool_descriptions: bool,

    /// Log every step at `info` instead of `debug`
    pub verbose: bool,

    /// Feed malformed tool blocks back to the model instead of failing
    pub handle_parsing_errors: bool,

    /// Context budget for the working conversation (estimated tokens)
    pub max_context_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 15,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            verbose: false,
            handle_parsing_errors: true,
            max_context_tokens: 8192,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful AI assistant.

When you need to use a tool, respond with a JSON block in this exact format:
```tool
{"tool": "tool_name", "arguments": {"arg1": "value1"}}
```

After receiving tool results, synthesize them into a helpful response.
If you can answer directly without tools, do so.
Be concise and accurate."#;

/// One tool invocation made during a run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    /// Tool name as requested by the model
    pub tool: String,

    /// Input the model passed
    pub input: String,

    /// What was fed back to the model
    pub observation: String,

    /// Whether the call succeeded
    pub success: bool,
}

/// Outcome of one agent run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentRun {
    /// Final natural-language answer
    pub answer: String,

    /// Tool invocations, in order
    pub steps: Vec<AgentStep>,

    /// Whether the iteration limit cut the run short
    pub stopped_early: bool,
}

/// What the model's reply asked for
#[derive(Debug)]
enum Reply {
    Final(String),
    Call(ToolCall),
    Malformed(String),
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Build the full system prompt including tool descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.generate_prompt_section());
        }

        prompt
    }

    /// Run the agent over a chat transcript
    ///
    /// The transcript is copied into a working conversation; tool traffic
    /// never leaks back into it.
    ///
    /// # Errors
    ///
    /// Provider failures, and malformed tool blocks when
    /// `handle_parsing_errors` is off.
    pub async fn run(&self, transcript: &[Message]) -> Result<AgentRun> {
        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt())
            .with_max_context(self.config.max_context_tokens);
        conversation.extend(transcript.iter().filter(|m| m.role != Role::System).cloned());

        let mut steps = Vec::new();

        for iteration in 1..=self.config.max_iterations {
            conversation.truncate_to_fit();

            let completion = self.provider
                .complete(conversation.messages(), &self.config.generation)
                .await?;

            let content = completion.content;
            conversation.push(Message::assistant(&content));

            match self.parse_reply(&content) {
                Reply::Final(answer) => {
                    tracing::debug!(iteration, steps = steps.len(), "Agent finished");
                    return Ok(AgentRun {
                        answer,
                        steps,
                        stopped_early: false,
                    });
                }
                Reply::Call(tool_call) => {
                    let result = self.execute_tool(&tool_call).await;
                    let observation = Self::format_tool_result(&result);
                    let step = AgentStep {
                        tool: tool_call.name.clone(),
                        input: Self::describe_input(&tool_call),
                        observation: result.output.clone(),
                        success: result.success,
                    };
                    self.log_step(iteration, &step);
                    steps.push(step);

                    conversation.push(Message::tool(observation, tool_call.id.clone()));
                }
                Reply::Malformed(reason) => {
                    if !self.config.handle_parsing_errors {
                        return Err(AgentError::Parse(reason));
                    }
                    tracing::debug!(iteration, %reason, "Feeding parse error back to model");
                    conversation.push(Message::tool(
                        format!(
                            "Invalid Format: {reason}\nUse a ```tool block with valid JSON, or reply with the final answer only."
                        ),
                        None,
                    ));
                }
            }
        }

        tracing::warn!(max = self.config.max_iterations, "Agent hit iteration limit");
        Ok(AgentRun {
            answer: ITERATION_LIMIT_ANSWER.into(),
            steps,
            stopped_early: true,
        })
    }

    /// Classify a model reply
    fn parse_reply(&self, content: &str) -> Reply {
        // Look for ```tool ... ``` blocks
        let tool_start = "```tool";
        let tool_end = "```";

        if let Some(start_idx) = content.find(tool_start) {
            let after_marker = &content[start_idx + tool_start.len()..];
            let Some(end_idx) = after_marker.find(tool_end) else {
                return Reply::Malformed("tool block is missing its closing ```".into());
            };
            let json_str = after_marker[..end_idx].trim();

            return match serde_json::from_str::<ToolCall>(json_str) {
                Ok(call) => Reply::Call(Self::with_call_id(call)),
                Err(e) => Reply::Malformed(format!("could not parse tool call: {e}")),
            };
        }

        // Fallback: raw JSON with a "tool" key
        if let Some(call) = self.parse_inline_tool_call(content) {
            return Reply::Call(Self::with_call_id(call));
        }

        Reply::Final(Self::strip_final_marker(content))
    }

    /// Try to parse inline JSON tool call
    fn parse_inline_tool_call(&self, content: &str) -> Option<ToolCall> {
        if !content.contains(r#""tool""#) {
            return None;
        }

        let start = content.find('{')?;
        let end = content.rfind('}')?;

        if end <= start {
            return None;
        }

        let call = serde_json::from_str::<ToolCall>(&content[start..=end]).ok()?;
        self.tools.get(&call.name).map(|_| call)
    }

    fn with_call_id(mut call: ToolCall) -> ToolCall {
        if call.id.is_none() {
            call.id = Some(uuid::Uuid::new_v4().to_string());
        }
        call
    }

    fn strip_final_marker(content: &str) -> String {
        let trimmed = content.trim();
        trimmed
            .rfind("Final Answer:")
            .map_or(trimmed, |idx| trimmed[idx + "Final Answer:".len()..].trim())
            .to_string()
    }

    fn describe_input(call: &ToolCall) -> String {
        let mut values = call.arguments.values();
        match (values.next(), values.next()) {
            (Some(serde_json::Value::String(s)), None) => s.clone(),
            _ => serde_json::Value::Object(call.arguments.clone().into_iter().collect()).to_string(),
        }
    }

    /// Execute a tool call
    async fn execute_tool(&self, call: &ToolCall) -> ToolResult {
        match self.tools.execute(call).await {
            Ok(mut result) => {
                result.id.clone_from(&call.id);
                result
            }
            Err(e) => ToolResult {
                name: call.name.clone(),
                id: call.id.clone(),
                success: false,
                output: format!("Error: {e}"),
            },
        }
    }

    /// Format tool result for conversation
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }

    fn log_step(&self, iteration: usize, step: &AgentStep) {
        if self.config.verbose {
            tracing::info!(iteration, tool = %step.tool, input = %step.input, success = step.success, "Tool step");
        } else {
            tracing::debug!(iteration, tool = %step.tool, success = step.success, "Tool step");
        }
    }

    /// Get the tool registry
    #[must_use]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: crate::tool::Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    #[must_use]
    pub fn handle_parsing_errors(mut self, handle: bool) -> Self {
        self.config.handle_parsing_errors = handle;
        self
    }

    /// # Errors
    ///
    /// Fails when no provider was set.
    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
