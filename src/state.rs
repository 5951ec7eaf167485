use std::sync::Arc;

use crate::config::Config;
use crate::engine::ContextEngine;
use crate::github::GitHubClient;
use crate::llm::HttpEmbedder;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ContextEngine>,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let host = Arc::new(GitHubClient::new(&config.github)?);
        let embedder = Arc::new(HttpEmbedder::new(config.llm.clone())?);
        let engine = ContextEngine::new(config, host, embedder);

        Ok(Self::with_engine(engine))
    }

    pub fn with_engine(engine: ContextEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}
