//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{Message, Session, TurnOutcome};

/// Response after creating a session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    /// Unique session identifier
    pub id: Uuid,

    /// Initial transcript (the greeting)
    pub messages: Vec<Message>,
}

/// Current state of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,

    /// Full transcript, oldest first
    pub messages: Vec<Message>,

    /// Whether a model API key is stored on the session (never the key itself)
    pub has_credential: bool,

    pub created_at: DateTime<Utc>,

    pub last_active: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id(),
            messages: session.messages().to_vec(),
            has_credential: session.has_credential(),
            created_at: session.created_at(),
            last_active: session.last_active(),
        }
    }
}

/// Request to submit one user message.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitMessageRequest {
    /// The user's question
    pub content: String,

    /// Optional model API key; replaces the one stored on the session
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Result of one submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitMessageResponse {
    pub outcome: TurnOutcome,

    /// The assistant message appended by this turn, if any
    pub reply: Option<Message>,

    /// Full transcript after the turn
    pub messages: Vec<Message>,
}

/// Chat page form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub prompt: String,

    #[serde(default)]
    pub api_key: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Number of live sessions
    pub sessions: usize,
}
