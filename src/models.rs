use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized `(owner, name)` pair identifying a repository and its cache slot.
///
/// GitHub treats owner and repository names case-insensitively, so both parts
/// are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoKey {
    pub owner: String,
    pub name: String,
}

impl RepoKey {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_ascii_lowercase(),
            name: name.to_ascii_lowercase(),
        }
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// An eligible file listed by the tree fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub raw_size: u64,
}

/// Bounded textual digest of one file; the unit that gets embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub path: String,
    pub text: String,
}

/// One retrieved file, nearest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Excerpt {
    pub path: String,
    pub summary: String,
    /// Squared L2 distance between the query and the file summary
    pub distance: f32,
}

/// Context request
#[derive(Debug, Clone, Deserialize)]
pub struct ContextRequest {
    /// `owner/name` or a github.com URL
    pub repo: String,
    pub query: String,
}

/// Context response
#[derive(Debug, Clone, Serialize)]
pub struct ContextResponse {
    pub repo: String,
    pub excerpts: Vec<Excerpt>,
}

/// A repository resident in the cache
#[derive(Debug, Clone, Serialize)]
pub struct CachedRepo {
    pub repo: String,
    pub file_count: usize,
    pub built_at: DateTime<Utc>,
}

/// Engine statistics
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache_size: usize,
    pub cache_capacity: usize,
    pub cached_repos: Vec<CachedRepo>,
    pub rate_window_used: usize,
    pub rate_limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_key_is_case_insensitive() {
        assert_eq!(RepoKey::new("Acme", "Widgets"), RepoKey::new("acme", "widgets"));
    }

    #[test]
    fn test_repo_key_display() {
        assert_eq!(RepoKey::new("acme", "widgets").to_string(), "acme/widgets");
    }

    #[test]
    fn test_excerpt_serializes_fields() {
        let excerpt = Excerpt {
            path: "src/lib.rs".to_string(),
            summary: "File: src/lib.rs".to_string(),
            distance: 0.5,
        };
        let json = serde_json::to_value(&excerpt).unwrap();
        assert_eq!(json["path"], "src/lib.rs");
        assert_eq!(json["distance"], 0.5);
    }
}
