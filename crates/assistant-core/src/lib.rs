//! # assistant-core
//!
//! Core logic for the multi-purpose assistant: transcript, credential gate,
//! prompt templates, provider-agnostic LLM abstraction, the tool set and the
//! reasoning loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Interaction Loop                          │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │    Tools    │  │   LlmProvider       │  │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │         ▲                                                    │
//! │         │ transcript (append-only, per session)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the agent independent of the hosted model;
//! a `ProviderConnector` builds one per request from the user's credential.

pub mod credential;
pub mod error;
pub mod interaction;
pub mod message;
pub mod mock;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use credential::Credential;
pub use error::{AgentError, Result};
pub use interaction::{Notice, SubmitOutcome, Submission};
pub use message::{Message, Role};
pub use prompt::PromptTemplate;
pub use provider::{LlmProvider, ProviderConnector};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, AgentRun, AgentStep};
pub use session::{MemorySessionStore, Session, SessionId, Transcript};
pub use tool::{Tool, ToolCall, ToolKind, ToolRegistry, ToolResult, ToolSchema};
