//! Hosting provider access: identifier parsing, tree listing and raw content downloads.

pub mod download;
pub mod identifier;
pub mod tree;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::GitHubConfig;
use crate::error::ContextError;
use crate::models::RepoKey;

pub use download::fetch_all;
pub use identifier::parse_repo_identifier;
pub use tree::{list_files, RepoTree};

const USER_AGENT: &str = "repo-context";

/// One entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Absent for directories
    #[serde(default)]
    pub size: Option<u64>,
}

/// Recursive tree listing of one branch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeListing {
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    /// Set when the provider capped the listing
    #[serde(default)]
    pub truncated: bool,
}

/// Metadata and content access for a code hosting provider.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Resolve the default branch. Fails with `RepoNotFound`.
    async fn default_branch(&self, key: &RepoKey) -> Result<String, ContextError>;

    /// List the full tree of `branch`. Fails with `TreeUnavailable`.
    async fn tree(&self, key: &RepoKey, branch: &str) -> Result<TreeListing, ContextError>;

    /// Fetch the raw text of one file.
    async fn raw_file(&self, key: &RepoKey, branch: &str, path: &str) -> Result<String>;
}

/// GitHub REST + raw content client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build GitHub HTTP client")?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            raw_base: config.raw_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn api_get(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn raw_url(&self, key: &RepoKey, branch: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.raw_base,
            key.owner,
            key.name,
            encode_path(branch),
            encode_path(path)
        )
    }
}

/// Percent-encode each `/`-separated segment, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn default_branch(&self, key: &RepoKey) -> Result<String, ContextError> {
        let url = format!("{}/repos/{}/{}", self.api_base, key.owner, key.name);
        let not_found = |detail: String| ContextError::RepoNotFound(format!("{key}: {detail}"));

        let resp = self
            .api_get(&url)
            .send()
            .await
            .map_err(|e| not_found(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(not_found(format!("metadata API returned {}", resp.status())));
        }

        let info: RepoInfo = resp
            .json()
            .await
            .map_err(|e| not_found(format!("invalid metadata: {e}")))?;

        Ok(info.default_branch.unwrap_or_else(|| "main".to_string()))
    }

    async fn tree(&self, key: &RepoKey, branch: &str) -> Result<TreeListing, ContextError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.api_base,
            key.owner,
            key.name,
            encode_path(branch)
        );
        let unavailable =
            |detail: String| ContextError::TreeUnavailable(format!("{key}@{branch}: {detail}"));

        let resp = self
            .api_get(&url)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(unavailable(format!("tree API returned {}", resp.status())));
        }

        resp.json()
            .await
            .map_err(|e| unavailable(format!("invalid tree listing: {e}")))
    }

    async fn raw_file(&self, key: &RepoKey, branch: &str, path: &str) -> Result<String> {
        let url = self.raw_url(key, branch, path);
        let mut req = self.http.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("Failed to fetch {path}"))?;

        if !resp.status().is_success() {
            anyhow::bail!("Fetching {path} returned {}", resp.status());
        }

        resp.text()
            .await
            .with_context(|| format!("Failed to read body of {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> GitHubClient {
        GitHubClient::new(&GitHubConfig {
            api_base: server.uri(),
            raw_base: format!("{}/raw", server.uri()),
            token: token.map(str::to_string),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn acme() -> RepoKey {
        RepoKey::new("acme", "widgets")
    }

    #[tokio::test]
    async fn test_default_branch_from_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets"))
            .and(header("authorization", "Bearer ghp_test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "default_branch": "develop" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some("ghp_test"));
        assert_eq!(client.default_branch(&acme()).await.unwrap(), "develop");
    }

    #[tokio::test]
    async fn test_default_branch_falls_back_to_main() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert_eq!(client.default_branch(&acme()).await.unwrap(), "main");
    }

    #[tokio::test]
    async fn test_missing_repo_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(matches!(
            client.default_branch(&acme()).await,
            Err(ContextError::RepoNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_tree_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/git/trees/main"))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sha": "abc",
                "tree": [
                    { "path": "src", "type": "tree" },
                    { "path": "src/lib.rs", "type": "blob", "size": 120 }
                ],
                "truncated": false
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let listing = client.tree(&acme(), "main").await.unwrap();
        assert_eq!(listing.tree.len(), 2);
        assert_eq!(listing.tree[0].size, None);
        assert_eq!(listing.tree[1].kind, "blob");
        assert_eq!(listing.tree[1].size, Some(120));
    }

    #[tokio::test]
    async fn test_tree_failure_is_tree_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/git/trees/main"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert!(matches!(
            client.tree(&acme(), "main").await,
            Err(ContextError::TreeUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_raw_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/raw/acme/widgets/main/src/lib.rs"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pub fn hello() {}"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/raw/acme/widgets/main/missing.rs"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        assert_eq!(
            client.raw_file(&acme(), "main", "src/lib.rs").await.unwrap(),
            "pub fn hello() {}"
        );
        assert!(client.raw_file(&acme(), "main", "missing.rs").await.is_err());
    }

    #[test]
    fn test_raw_url_encodes_segments() {
        let client = GitHubClient::new(&GitHubConfig::default()).unwrap();
        assert_eq!(
            client.raw_url(&acme(), "main", "docs/my notes.md"),
            "https://raw.githubusercontent.com/acme/widgets/main/docs/my%20notes.md"
        );
    }
}
