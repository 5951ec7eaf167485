use thiserror::Error;

/// Request-level failures of the context engine.
///
/// Every variant is terminal for the current request. Only `RateLimited`
/// carries retry guidance.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("Invalid repository identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Failed to fetch repository file tree: {0}")]
    TreeUnavailable(String),

    #[error("No eligible files found in {0}")]
    NoEligibleFiles(String),

    #[error("Failed to load any usable files from {0}")]
    NoContentLoaded(String),

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContextError {
    pub fn embedding(err: impl std::fmt::Display) -> Self {
        Self::EmbeddingUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_helper_wraps_message() {
        assert_eq!(
            ContextError::embedding("connection refused"),
            ContextError::EmbeddingUnavailable("connection refused".to_string())
        );
    }

    #[test]
    fn test_rate_limited_message_includes_retry() {
        let err = ContextError::RateLimited {
            retry_after_secs: 42,
        };
        assert_eq!(err.to_string(), "Rate limit exceeded, retry after 42s");
    }
}
