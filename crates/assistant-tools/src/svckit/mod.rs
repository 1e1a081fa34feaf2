//! Service Kit - Agent Tools
//!
//! Implementations of the three `assistant_core::ToolKind` capabilities.

mod calculator;
mod chain;
mod reasoning;
mod wikipedia;

pub use calculator::CalculatorTool;
pub use chain::PromptChain;
pub use reasoning::ReasoningTool;
pub use wikipedia::WikipediaTool;
