//! Shared state and route table.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use super::{chat, pages};
use crate::agent::Agent;
use crate::config::{Config, SubmitMode};
use crate::credential::Credential;
use crate::session::SessionStore;
use crate::ui::PageRenderer;

/// State shared by all handlers.
pub struct AppState {
    pub sessions: SessionStore,
    pub agent: Agent,
    pub pages: PageRenderer,
    /// Used when a session has no key of its own
    pub default_api_key: Option<Credential>,
    pub submit_mode: SubmitMode,
}

impl AppState {
    pub fn new(config: &Config, agent: Agent) -> Result<Self, handlebars::TemplateError> {
        Ok(Self {
            sessions: SessionStore::new(),
            agent,
            pages: PageRenderer::new()?,
            default_api_key: config.default_api_key.clone(),
            submit_mode: config.submit_mode,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(chat::health))
        .route("/sessions", post(chat::create_session))
        .route(
            "/sessions/:id",
            get(chat::get_session).delete(chat::end_session),
        )
        .route("/sessions/:id/messages", post(chat::submit_message));

    Router::new()
        .route("/", get(pages::start))
        .route("/chat/:id", get(pages::show).post(pages::submit))
        .route("/chat/:id/end", post(pages::end))
        .nest("/api", api)
        .with_state(state)
}
