//! Search Bot - HTTP Server Entry Point
//!
//! Starts the HTTP server that serves the chat pages and JSON API.

use search_bot::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "search_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, submit_mode={:?}, default key {}",
        config.model,
        config.submit_mode,
        if config.default_api_key.is_some() { "set" } else { "unset" }
    );

    api::serve(config).await?;

    Ok(())
}
