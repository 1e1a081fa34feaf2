//! # assistant-runtime
//!
//! Hosted LLM providers for the assistant.
//!
//! ## Providers
//!
//! - **Groq** (default): OpenAI-compatible chat completions, authorized with
//!   the key the user types into the sidebar
//!
//! ## Usage
//!
//! ```rust,ignore
//! use assistant_runtime::GroqConnector;
//!
//! let connector = GroqConnector::from_env();
//! let provider = connector.connect(&credential)?;
//! let agent = AgentBuilder::new()
//!     .provider(provider)
//!     .build()?;
//! ```

#[cfg(feature = "groq")]
pub mod groq;

#[cfg(feature = "groq")]
pub use groq::{GroqConfig, GroqConnector, GroqProvider};

// Re-export core types for convenience
pub use assistant_core::{
    Agent, AgentError, Credential, LlmProvider, Message, ProviderConnector, Result, Role,
};
