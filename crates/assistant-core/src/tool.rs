//! Tool System
//!
//! The assistant has a closed set of capabilities, enumerated by [`ToolKind`].
//! Each kind declares its name, the description shown to the model and the
//! single string parameter it accepts. Implementations are registered in a
//! [`ToolRegistry`] and invoked by the reasoning loop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawToolCall")]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    pub arguments: HashMap<String, serde_json::Value>,

    /// Optional call ID for tracking
    pub id: Option<String>,
}

/// Wire form of a tool call; models write the tool under `tool` or `name`
#[derive(Deserialize)]
struct RawToolCall {
    #[serde(default)]
    tool: Option<String>,

    #[serde(default)]
    name: Option<String>,

    #[serde(default, deserialize_with = "arguments_from_value")]
    arguments: HashMap<String, serde_json::Value>,

    #[serde(default)]
    id: Option<String>,
}

impl TryFrom<RawToolCall> for ToolCall {
    type Error = String;

    fn try_from(raw: RawToolCall) -> std::result::Result<Self, Self::Error> {
        let name = raw
            .tool
            .or(raw.name)
            .ok_or_else(|| "tool call is missing its \"tool\" key".to_string())?;
        Ok(Self {
            name,
            arguments: raw.arguments,
            id: raw.id,
        })
    }
}

/// Models sometimes pass a bare string instead of an object
fn arguments_from_value<'de, D>(deserializer: D) -> std::result::Result<HashMap<String, serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
        serde_json::Value::Null => Ok(HashMap::new()),
        serde_json::Value::String(s) => Ok(HashMap::from([("input".to_string(), serde_json::Value::String(s))])),
        other => Err(serde::de::Error::custom(format!(
            "tool arguments must be an object, got {other}"
        ))),
    }
}

impl ToolCall {
    pub fn new(name: impl Into<String>, parameter: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::from([(parameter.to_string(), serde_json::Value::String(value.into()))]),
            id: None,
        }
    }

    /// Read the string passed for `parameter`
    ///
    /// A call with a single string argument under another key is accepted too.
    #[must_use]
    pub fn input(&self, parameter: &str) -> Option<&str> {
        if let Some(value) = self.arguments.get(parameter) {
            return value.as_str();
        }
        let mut values = self.arguments.values();
        match (values.next(), values.next()) {
            (Some(only), None) => only.as_str(),
            _ => None,
        }
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

/// Tool definition schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,
}

/// The assistant's capabilities
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    /// Encyclopedia lookup by topic
    Wikipedia,
    /// Step-by-step arithmetic via the LLM
    Calculator,
    /// Step-by-step logical reasoning via the LLM
    Reasoning,
}

impl ToolKind {
    pub const ALL: [Self; 3] = [Self::Wikipedia, Self::Calculator, Self::Reasoning];

    /// Name the model uses to call the tool
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wikipedia => "Wikipedia",
            Self::Calculator => "Calculator",
            Self::Reasoning => "Reasoning tool",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Wikipedia => "Searches Wikipedia for general information about a given topic.",
            Self::Calculator => "Solves math questions step-by-step and provides the final result.",
            Self::Reasoning => "Handles logic-based and reasoning questions with clear explanation.",
        }
    }

    /// The one string argument this tool reads
    #[must_use]
    pub const fn input_parameter(self) -> &'static str {
        match self {
            Self::Wikipedia => "query",
            Self::Calculator | Self::Reasoning => "question",
        }
    }

    const fn input_description(self) -> &'static str {
        match self {
            Self::Wikipedia => "Topic to look up, e.g. 'Paris' or 'Photosynthesis'",
            Self::Calculator => "The math problem, stated in full",
            Self::Reasoning => "The logic or reasoning question, stated in full",
        }
    }

    const fn category(self) -> &'static str {
        match self {
            Self::Wikipedia => "knowledge",
            Self::Calculator => "math",
            Self::Reasoning => "logic",
        }
    }

    /// Resolve a tool name as written by the model
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|k| k.name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn schema(self) -> ToolSchema {
        ToolSchema {
            name: self.name().into(),
            description: self.description().into(),
            parameters: vec![ParameterSchema {
                name: self.input_parameter().into(),
                param_type: "string".into(),
                description: self.input_description().into(),
                required: true,
            }],
            category: Some(self.category().into()),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tool trait - implement to provide one of the [`ToolKind`] capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which capability this implements
    fn kind(&self) -> ToolKind;

    /// Get the tool's schema
    fn schema(&self) -> ToolSchema {
        self.kind().schema()
    }

    /// Run the tool on its declared input and return the raw text
    async fn run(&self, input: &str) -> Result<String>;

    /// Execute a parsed call
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let kind = self.kind();
        let input = call.input(kind.input_parameter()).ok_or_else(|| {
            AgentError::ToolValidation(format!("Missing required parameter: {}", kind.input_parameter()))
        })?;
        let output = self.run(input).await?;
        Ok(ToolResult::success(kind.name(), output))
    }

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && call.input(&param.name).is_none() {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools, kept in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool, replacing any tool of the same kind
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let kind = tool.kind();
        self.tools.retain(|t| t.kind() != kind);
        self.tools.push(tool);
    }

    /// Get a tool by name (case-insensitive)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let kind = ToolKind::from_name(name)?;
        self.tools.iter().find(|t| t.kind() == kind).cloned()
    }

    /// Execute a tool call
    ///
    /// # Errors
    ///
    /// Unknown tools, missing parameters and tool failures are all errors.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self.get(&call.name).ok_or_else(|| {
            AgentError::ToolNotFound(format!(
                "{} is not a valid tool, try one of [{}]",
                call.name,
                self.names().join(", ")
            ))
        })?;

        tool.validate(call)?;
        tool.execute(call).await
    }

    /// Get all tool schemas (for system prompt generation)
    #[must_use]
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Get tool names
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.kind().name()).collect()
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Generate system prompt section describing available tools
    #[must_use]
    pub fn generate_prompt_section(&self) -> String {
        use std::fmt::Write;

        let mut prompt = String::from("## Available Tools\n\n");
        prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
        prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");

        for schema in self.schemas() {
            let _ = writeln!(prompt, "### {}", schema.name);
            let _ = writeln!(prompt, "{}", schema.description);

            if !schema.parameters.is_empty() {
                prompt.push_str("**Parameters:**\n");
                for param in &schema.parameters {
                    let required = if param.required { " (required)" } else { "" };
                    let _ = writeln!(
                        prompt,
                        "- `{}` ({}){}: {}",
                        param.name, param.param_type, required, param.description
                    );
                }
            }
            prompt.push('\n');
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(ToolKind);

    #[async_trait]
    impl Tool for Echo {
        fn kind(&self) -> ToolKind {
            self.0
        }

        async fn run(&self, input: &str) -> Result<String> {
            Ok(format!("echo: {input}"))
        }
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(ToolKind::from_name("calculator"), Some(ToolKind::Calculator));
        assert_eq!(ToolKind::from_name("Reasoning tool"), Some(ToolKind::Reasoning));
        assert_eq!(ToolKind::from_name("Search"), None);
    }

    #[test]
    fn test_tool_call_parsing() {
        let call: ToolCall =
            serde_json::from_str(r#"{"tool": "Wikipedia", "arguments": {"query": "Paris"}}"#).unwrap();
        assert_eq!(call.name, "Wikipedia");
        assert_eq!(call.input("query"), Some("Paris"));

        let bare: ToolCall = serde_json::from_str(r#"{"tool": "Calculator", "arguments": "2+2"}"#).unwrap();
        assert_eq!(bare.input("question"), Some("2+2"));
    }

    #[test]
    fn test_tool_call_key_variants() {
        let named: ToolCall = serde_json::from_str(r#"{"name": "Wikipedia", "arguments": {}}"#).unwrap();
        assert_eq!(named.name, "Wikipedia");

        let both: ToolCall = serde_json::from_str(
            r#"{"tool": "Calculator", "name": "math helper", "arguments": {"question": "2+2"}}"#,
        )
        .unwrap();
        assert_eq!(both.name, "Calculator");
        assert_eq!(both.input("question"), Some("2+2"));

        assert!(serde_json::from_str::<ToolCall>(r#"{"arguments": {}}"#).is_err());
    }

    #[test]
    fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo(ToolKind::Wikipedia));
        registry.register(Echo(ToolKind::Calculator));
        registry.register(Echo(ToolKind::Calculator));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("wikipedia").is_some());
        assert!(registry.get("Reasoning tool").is_none());
        assert_eq!(registry.names(), vec!["Wikipedia", "Calculator"]);
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo(ToolKind::Calculator));

        let result = registry
            .execute(&ToolCall::new("Calculator", "question", "2+2"))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "echo: 2+2");

        let missing = ToolCall {
            name: "Calculator".into(),
            arguments: HashMap::new(),
            id: None,
        };
        assert!(matches!(registry.execute(&missing).await, Err(AgentError::ToolValidation(_))));

        let unknown = registry.execute(&ToolCall::new("Search", "query", "x")).await;
        assert!(matches!(unknown, Err(AgentError::ToolNotFound(msg)) if msg.contains("Calculator")));
    }

    #[test]
    fn test_prompt_section_lists_tools() {
        let mut registry = ToolRegistry::new();
        for kind in ToolKind::ALL {
            registry.register(Echo(kind));
        }
        let section = registry.generate_prompt_section();
        assert!(section.contains("### Wikipedia"));
        assert!(section.contains("- `query` (string) (required)"));
        assert!(section.contains(ToolKind::Reasoning.description()));
    }
}
