//! API Client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One transcript entry as sent by the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<EntryMetadata>,
}

impl TranscriptEntry {
    /// Local copy of a question the server has not answered yet
    pub fn pending_user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    /// Answer produced from a failed run
    pub fn is_error(&self) -> bool {
        self.metadata.as_ref().is_some_and(|m| m.error)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(default)]
    pub error: bool,
}

/// Inline notice shown next to the form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "text", rename_all = "lowercase")]
pub enum Notice {
    Info(String),
    Warning(String),
    Success(String),
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: String,
    pub observation: String,
    pub success: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SessionView {
    pub id: String,
    pub transcript: Vec<TranscriptEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AskResponse {
    pub failed: bool,
    pub steps: Vec<AgentStep>,
    pub notice: Notice,
    pub transcript: Vec<TranscriptEntry>,
}

/// Rejection from the server, carried to the page as a notice
#[derive(Clone, Debug)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn transport(e: impl std::fmt::Display) -> Self {
        Self {
            code: "NETWORK".into(),
            message: e.to_string(),
        }
    }

    /// Warning for input problems, error otherwise
    pub fn notice(&self) -> Notice {
        match self.code.as_str() {
            "EMPTY_QUESTION" | "SESSION_BUSY" => Notice::Warning(self.message.clone()),
            "MISSING_CREDENTIAL" => Notice::Info(self.message.clone()),
            _ => Notice::Error(self.message.clone()),
        }
    }
}

fn url(path: &str) -> String {
    let origin = web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into());
    format!("{origin}{path}")
}

async fn read<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T, ApiError> {
    if response.status().is_success() {
        response.json().await.map_err(ApiError::transport)
    } else {
        let data: serde_json::Value = response.json().await.unwrap_or_default();
        Err(ApiError {
            code: data["code"].as_str().unwrap_or("REQUEST_FAILED").to_string(),
            message: data["error"].as_str().unwrap_or("Request failed").to_string(),
        })
    }
}

/// Start a new session
pub async fn create_session() -> Result<SessionView, ApiError> {
    let response = reqwest::Client::new()
        .post(url("/api/sessions"))
        .send()
        .await
        .map_err(ApiError::transport)?;

    read(response).await
}

/// Ask a question within a session
pub async fn ask(session_id: &str, question: &str, api_key: &str) -> Result<AskResponse, ApiError> {
    let body = serde_json::json!({
        "question": question,
        "api_key": api_key,
    });

    let response = reqwest::Client::new()
        .post(url(&format!("/api/sessions/{session_id}/ask")))
        .json(&body)
        .send()
        .await
        .map_err(ApiError::transport)?;

    read(response).await
}
