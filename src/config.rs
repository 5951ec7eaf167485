use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// Number of repositories kept resident in the context cache
    pub cache_capacity: usize,
    /// Optional age after which a cached repository is rebuilt (None = until evicted)
    pub cache_ttl_secs: Option<u64>,
    /// Admitted requests per rate window, shared by all callers
    pub rate_limit_max_calls: usize,
    /// Length of the trailing rate window in seconds
    pub rate_limit_window_secs: u64,
    /// Number of excerpts returned per query
    pub top_k: usize,
    /// Files at or above this size (bytes) are never downloaded
    pub max_file_bytes: u64,
    /// Maximum in-flight raw file downloads per repository build
    pub max_concurrent_downloads: usize,
    /// Per-file download timeout in seconds
    pub download_timeout_secs: u64,
    /// End-to-end deadline for one context request in seconds
    pub request_timeout_secs: u64,
    /// Hosting provider configuration
    pub github: GitHubConfig,
    /// Embedding provider configuration
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Metadata API base URL
    pub api_base: String,
    /// Raw content base URL
    pub raw_base: String,
    /// Personal access token; anonymous when None
    pub token: Option<String>,
    /// Timeout for a single metadata, tree or raw content call
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            token: None,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the embedding API
    pub base_url: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Timeout for a single embedding call
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5001".to_string(),
            cache_capacity: 5,
            cache_ttl_secs: None,
            rate_limit_max_calls: 10,
            rate_limit_window_secs: 3600,
            top_k: 10,
            max_file_bytes: 100_000,
            max_concurrent_downloads: 16,
            download_timeout_secs: 15,
            request_timeout_secs: 180,
            github: GitHubConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unparseable numbers keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("REPO_CONTEXT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_CACHE_CAPACITY") {
            config.cache_capacity = v;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_CACHE_TTL_SECS") {
            config.cache_ttl_secs = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_RATE_LIMIT") {
            config.rate_limit_max_calls = v;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_RATE_WINDOW_SECS") {
            config.rate_limit_window_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_TOP_K") {
            config.top_k = v;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_MAX_FILE_BYTES") {
            config.max_file_bytes = v;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_MAX_CONCURRENT_DOWNLOADS") {
            config.max_concurrent_downloads = v;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_DOWNLOAD_TIMEOUT_SECS") {
            config.download_timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "REPO_CONTEXT_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = v;
        }

        // GitHub
        if let Some(url) = lookup("GITHUB_API_BASE") {
            config.github.api_base = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("GITHUB_RAW_BASE") {
            config.github.raw_base = url.trim_end_matches('/').to_string();
        }
        if let Some(token) = lookup("GITHUB_TOKEN") {
            if !token.is_empty() {
                config.github.token = Some(token);
            }
        }
        if let Some(v) = parse_var(&lookup, "GITHUB_TIMEOUT_SECS") {
            config.github.timeout_secs = v;
        }

        // Embeddings
        if let Some(provider) = lookup("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            config.llm.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Some(key) = lookup("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Some(v) = parse_var(&lookup, "LLM_TIMEOUT_SECS") {
            config.llm.timeout_secs = v;
        }

        config
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.rate_limit_max_calls, 10);
        assert_eq!(config.rate_limit_window_secs, 3600);
        assert_eq!(config.max_file_bytes, 100_000);
        assert_eq!(config.top_k, 10);
        assert!(config.cache_ttl_secs.is_none());
        assert!(config.github.token.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("REPO_CONTEXT_CACHE_CAPACITY", "3"),
            ("REPO_CONTEXT_CACHE_TTL_SECS", "600"),
            ("GITHUB_API_BASE", "http://localhost:9999/"),
            ("GITHUB_TOKEN", "ghp_x"),
            ("LLM_PROVIDER", "openai"),
        ]));
        assert_eq!(config.cache_capacity, 3);
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.github.api_base, "http://localhost:9999");
        assert_eq!(config.github.token.as_deref(), Some("ghp_x"));
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_invalid_number_keeps_default() {
        let config = Config::from_lookup(lookup_from(&[("REPO_CONTEXT_RATE_LIMIT", "lots")]));
        assert_eq!(config.rate_limit_max_calls, 10);
    }

    #[test]
    fn test_empty_token_is_anonymous() {
        let config = Config::from_lookup(lookup_from(&[("GITHUB_TOKEN", "")]));
        assert!(config.github.token.is_none());
    }
}
