//! Session Management
//!
//! A session owns one chat transcript for the lifetime of a browser session.
//! Sessions live in memory only.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::message::{Message, Role};

/// First transcript entry of every session
pub const GREETING: &str = "Hi, I am a Multi-Purpose chatbot who can answer all your questions.";

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Append-only chat log, seeded with the assistant greeting
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<Message>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![Message::assistant(GREETING)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.entries.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.entries.push(Message::assistant(content));
    }

    pub fn push_assistant_error(&mut self, content: impl Into<String>) {
        self.entries.push(Message::assistant_error(content));
    }

    #[must_use]
    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the greeting is never removed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A complete chat session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Conversation history
    pub transcript: Transcript,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    #[must_use]
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            transcript: Transcript::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Short label from the first question, for logs
    #[must_use]
    pub fn title(&self) -> String {
        self.transcript
            .entries()
            .iter()
            .find(|m| m.role == Role::User)
            .map_or_else(
                || format!("Session {}", self.id.0.chars().take(8).collect::<String>()),
                |m| {
                    let preview: String = m.content.chars().take(50).collect();
                    if m.content.chars().count() > 50 {
                        format!("{preview}...")
                    } else {
                        preview
                    }
                },
            )
    }

    /// Message count
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Time since last activity
    #[must_use]
    pub fn idle_for(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.updated_at
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one session; holding the lock means a question is in flight
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session
    pub fn create(&self) -> (SessionId, SessionHandle) {
        let session = Session::new();
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), handle.clone());
        (id, handle)
    }

    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// End a session; returns whether it existed
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop sessions idle longer than `ttl`; busy sessions are kept
    pub fn prune_idle(&self, ttl: chrono::Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, handle| {
            handle
                .try_lock()
                .map_or(true, |session| session.idle_for(now) <= ttl)
        });
        before - sessions.len()
    }
}
