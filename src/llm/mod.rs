//! Hosted language-model access.
//!
//! The agent talks to the model through [`LlmClient`] so the reason-act loop
//! can be driven by a scripted client in tests.

mod groq;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::credential::Credential;

pub use groq::GroqClient;

/// Chat message role on the model API. The agent packs its whole prompt
/// into a single user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

/// A single message sent to the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// One completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    /// Generation halts before any of these sequences
    pub stop: &'a [&'a str],
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// A hosted chat model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion and return the generated text.
    async fn complete(
        &self,
        api_key: &Credential,
        request: CompletionRequest<'_>,
    ) -> Result<String, LlmError>;
}
