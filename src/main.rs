use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use repo_context::api;
use repo_context::config::Config;
use repo_context::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("GitHub API: {}", config.github.api_base);
    tracing::info!(
        "Embedding provider: {} ({}, model {})",
        config.llm.provider,
        config.llm.base_url,
        config.llm.embedding_model
    );
    tracing::info!(
        "Cache capacity {}, rate limit {} per {}s",
        config.cache_capacity,
        config.rate_limit_max_calls,
        config.rate_limit_window_secs
    );

    let state = AppState::new(&config)?;

    let app = Router::new()
        .route("/api/context", post(api::context::get_context))
        .route("/api/stats", get(api::context::stats))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
