//! # assistant-tools
//!
//! The multi-purpose assistant's capabilities:
//!
//! - **Wikipedia** - general knowledge lookups through the MediaWiki API
//! - **Calculator** - math word problems, solved step-by-step by the LLM
//! - **Reasoning tool** - logic questions, explained point-wise by the LLM
//!
//! ```text
//! question ──▶ Agent ──┬──▶ Wikipedia ──▶ EncyclopediaClient
//!                      ├──▶ Calculator ──▶ PromptChain(math) ──▶ LLM
//!                      └──▶ Reasoning  ──▶ PromptChain(logic) ──▶ LLM
//! ```

pub mod assistant;
pub mod encyclopedia;
pub mod error;
pub mod prompts;
pub mod svckit;

pub use assistant::{build_agent, build_toolset, AssistantSettings};
pub use error::{Result, ToolError};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CalculatorTool, ReasoningTool, WikipediaTool};
}

/// Question pre-filled in the input box
pub const SAMPLE_QUESTION: &str = "I have 5 bananas and 7 grapes. I eat 2 bananas and give away 3 grapes. Then I buy a dozen apples and 2 packs of blueberries. Each pack of blueberries contains 25 berries. How many total pieces of fruit do I have at the end?";

/// System prompt for the assistant agent
pub const ASSISTANT_PROMPT: &str = r#"You are a Multi-Purpose assistant that answers general knowledge, math and logic questions.

## How to Work

1. Use `Wikipedia` for facts about people, places, events and concepts
2. Use `Calculator` for anything that needs arithmetic, passing the full problem
3. Use `Reasoning tool` for puzzles and logic questions, passing the full question
4. Answer directly when no tool is needed

To call a tool, reply with only a JSON block in this exact format:
```tool
{"tool": "Calculator", "arguments": {"question": "..."}}
```

You will receive the tool's result in the next message. Call another tool
if needed, otherwise reply with the final answer as plain text, without any
tool block."#;
