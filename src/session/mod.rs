//! Per-session conversation state.
//!
//! A [`Session`] owns one browser session's transcript and model API key. It
//! is created explicitly, lives in the [`SessionStore`], and is dropped when
//! the user ends it or it goes idle. Nothing here is persisted.

mod store;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::{Agent, AgentError};
use crate::credential::Credential;

pub use store::{SessionHandle, SessionStore};

/// First message of every conversation.
pub const GREETING: &str =
    "Hey! I'm ready to help you with your web search. What would you like to know?";

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One chat message. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Append-only transcript, always starting with the assistant greeting.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: vec![Message {
                role: Role::Assistant,
                content: GREETING.to_string(),
            }],
        }
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true; the greeting is always present.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// How a submission was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Blank input; nothing was appended.
    Ignored,
    /// The agent produced an answer.
    Answered,
    /// The model's output could not be parsed; the error text was appended.
    ParseError,
    /// The run failed; an error message was appended.
    Failed,
}

/// One isolated chat session.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    conversation: Conversation,
    credential: Option<Credential>,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            conversation: Conversation::new(),
            credential: None,
            created_at: now,
            last_active: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.all()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Remember a key entered by the user for later turns.
    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.touch();
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Process one user submission.
    ///
    /// A key entered with this submission wins over the session's stored key,
    /// which wins over `default_key`. Every non-blank submission that runs to
    /// completion appends the user message and exactly one assistant reply;
    /// a turn dropped mid-run appends nothing.
    pub async fn submit(
        &mut self,
        agent: &Agent,
        input: &str,
        entered_key: Option<Credential>,
        default_key: Option<&Credential>,
    ) -> TurnOutcome {
        if let Some(key) = entered_key {
            self.credential = Some(key);
        }
        self.touch();

        if input.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        // Nothing is appended until the run completes, so a cancelled turn
        // leaves the conversation as it was.
        let mut history = self.conversation.all().to_vec();
        history.push(Message {
            role: Role::User,
            content: input.to_string(),
        });

        let result = match self.credential.as_ref().or(default_key) {
            Some(key) => agent.run(&history, key).await,
            None => Err(AgentError::MissingCredential),
        };

        let (outcome, reply) = match result {
            Ok(answer) => (TurnOutcome::Answered, answer),
            Err(err @ AgentError::OutputParsing { .. }) => (TurnOutcome::ParseError, err.to_string()),
            Err(err) => {
                tracing::warn!("Session {} turn failed: {}", self.id, err);
                (TurnOutcome::Failed, format!("An error occurred: {}", err))
            }
        };

        self.conversation.append(Role::User, input);
        self.conversation.append(Role::Assistant, reply);
        self.touch();
        outcome
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
