//! Credential Gate
//!
//! The LLM key is typed by the user into the sidebar and sent with each
//! request. Nothing downstream is built until the gate lets it through.

use crate::error::{AgentError, Result};

/// Notice shown while no key has been entered
pub const MISSING_CREDENTIAL_NOTICE: &str = "Please add your Groq API key to continue";

/// Secret used to authorize calls to the hosted LLM
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Accept raw sidebar input, treating blank input as absent
    #[must_use]
    pub fn from_input(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw secret, for the `Authorization` header only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Stop the current pass unless a credential is present
///
/// # Errors
///
/// Returns [`AgentError::MissingCredential`] carrying the guidance notice
/// when the input is absent or blank.
pub fn gate(input: Option<&str>) -> Result<Credential> {
    input
        .and_then(Credential::from_input)
        .ok_or_else(|| AgentError::MissingCredential(MISSING_CREDENTIAL_NOTICE.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_blocks_missing_and_blank() {
        for input in [None, Some(""), Some("   \n")] {
            let err = gate(input).unwrap_err();
            assert!(matches!(err, AgentError::MissingCredential(_)));
            assert_eq!(err.user_message(), MISSING_CREDENTIAL_NOTICE);
        }
    }

    #[test]
    fn test_gate_passes_key() {
        let credential = gate(Some(" gsk_test ")).unwrap();
        assert_eq!(credential.expose(), "gsk_test");
    }

    #[test]
    fn test_debug_is_redacted() {
        let credential = Credential::from_input("gsk_secret").unwrap();
        assert!(!format!("{credential:?}").contains("gsk_secret"));
    }
}
