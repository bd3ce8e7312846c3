//! HTTP API and chat pages.
//!
//! ## Pages
//!
//! - `GET /` - Start a session and redirect to its page
//! - `GET /chat/:id` - Render the chat page
//! - `POST /chat/:id` - Submit one message (form: `prompt`, `api_key`) and render
//! - `POST /chat/:id/end` - End the session
//!
//! ## JSON
//!
//! - `GET /api/health` - Health check
//! - `POST /api/sessions` - Create a session
//! - `GET /api/sessions/:id` - Session transcript
//! - `POST /api/sessions/:id/messages` - Submit one message
//! - `DELETE /api/sessions/:id` - End a session

mod chat;
mod error;
mod pages;
mod routes;
pub mod types;

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::agent::{Agent, AgentOptions};
use crate::config::Config;
use crate::llm::GroqClient;
use crate::tools::{self, ToolRegistry};

pub use error::ApiError;
pub use routes::{router, AppState};

/// Build the agent from configuration and serve until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let client = tools::http_client(config.request_timeout)?;
    let llm = Arc::new(GroqClient::new(
        client.clone(),
        config.llm_base_url.clone(),
        config.temperature,
    ));
    let tool_registry = ToolRegistry::standard(client, &config.tools);
    tracing::info!("Tools: {}", tool_registry.names().join(", "));

    let agent = Agent::new(llm, tool_registry, AgentOptions::from(&config));
    let state = Arc::new(AppState::new(&config, agent)?);

    spawn_idle_sweeper(state.clone(), config.session_idle_timeout);

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically drop sessions nobody has touched for `idle_timeout`.
fn spawn_idle_sweeper(state: Arc<AppState>, idle_timeout: std::time::Duration) {
    let period = (idle_timeout / 4).max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.sessions.remove_idle(idle_timeout).await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
