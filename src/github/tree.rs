use crate::error::ContextError;
use crate::models::{FileRecord, RepoKey};

use super::{RepoHost, TreeEntry};

/// Default branch plus the files worth downloading from it.
#[derive(Debug, Clone)]
pub struct RepoTree {
    pub branch: String,
    pub files: Vec<FileRecord>,
}

/// Resolve the default branch and list eligible files.
pub async fn list_files(
    host: &dyn RepoHost,
    key: &RepoKey,
    max_file_bytes: u64,
) -> Result<RepoTree, ContextError> {
    let branch = host.default_branch(key).await?;
    let listing = host.tree(key, &branch).await?;

    if listing.truncated {
        tracing::warn!(
            "Tree listing for {key}@{branch} was truncated, indexing the first {} entries",
            listing.tree.len()
        );
    }

    let files: Vec<FileRecord> = listing
        .tree
        .iter()
        .filter(|entry| is_eligible(entry, max_file_bytes))
        .map(|entry| FileRecord {
            path: entry.path.clone(),
            raw_size: entry.size.unwrap_or(0),
        })
        .collect();

    tracing::info!(
        "{key}@{branch}: {} of {} tree entries eligible",
        files.len(),
        listing.tree.len()
    );

    if files.is_empty() {
        return Err(ContextError::NoEligibleFiles(key.to_string()));
    }

    Ok(RepoTree { branch, files })
}

fn is_eligible(entry: &TreeEntry, max_file_bytes: u64) -> bool {
    entry.kind == "blob"
        && !is_hidden(&entry.path)
        && entry.size.is_some_and(|size| size < max_file_bytes)
        && is_indexable_path(&entry.path)
}

/// Dot-prefixed paths (`.github/`, `.env`, ...) are hidden.
fn is_hidden(path: &str) -> bool {
    path.starts_with('.')
}

/// Extension / well-known filename allow-list.
pub fn is_indexable_path(path: &str) -> bool {
    let filename = path.rsplit('/').next().unwrap_or(path).to_lowercase();

    if matches!(
        filename.as_str(),
        "makefile"
            | "dockerfile"
            | "rakefile"
            | "gemfile"
            | "procfile"
            | "cmakelists.txt"
            | "readme"
            | "license"
    ) {
        return true;
    }

    let ext = match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return false,
    };

    matches!(
        ext,
        "rs" | "py"
            | "js"
            | "mjs"
            | "cjs"
            | "ts"
            | "tsx"
            | "jsx"
            | "go"
            | "java"
            | "c"
            | "cpp"
            | "cc"
            | "h"
            | "hpp"
            | "cs"
            | "rb"
            | "php"
            | "swift"
            | "kt"
            | "kts"
            | "scala"
            | "lua"
            | "sh"
            | "bash"
            | "sql"
            | "html"
            | "css"
            | "scss"
            | "vue"
            | "svelte"
            | "ex"
            | "exs"
            | "hs"
            | "dart"
            | "zig"
            | "proto"
            | "graphql"
            | "tf"
            | "json"
            | "yaml"
            | "yml"
            | "toml"
            | "xml"
            | "ini"
            | "cfg"
            | "conf"
            | "md"
            | "rst"
            | "txt"
    )
}
