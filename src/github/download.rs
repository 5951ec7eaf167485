use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::error::ContextError;
use crate::models::{FileRecord, RepoKey};

use super::RepoHost;

/// Raw text of one downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub path: String,
    pub content: String,
}

/// Download every file concurrently, at most `max_concurrent` at a time.
///
/// Failed or timed-out files are skipped. Successful files keep the order of
/// `files`. Fails with `NoContentLoaded` when nothing could be fetched.
pub async fn fetch_all(
    host: Arc<dyn RepoHost>,
    key: &RepoKey,
    branch: &str,
    files: &[FileRecord],
    max_concurrent: usize,
    per_file_timeout: Duration,
) -> Result<Vec<FileContent>, ContextError> {
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut handles = Vec::with_capacity(files.len());

    for file in files {
        let host = host.clone();
        let sem = semaphore.clone();
        let key = key.clone();
        let branch = branch.to_string();
        let path = file.path.clone();

        let handle = tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.ok()?;
            match tokio::time::timeout(per_file_timeout, host.raw_file(&key, &branch, &path)).await
            {
                Ok(Ok(content)) => Some(FileContent { path, content }),
                Ok(Err(e)) => {
                    tracing::warn!("Skipping {path} in {key}: {e:#}");
                    None
                }
                Err(_) => {
                    tracing::warn!(
                        "Skipping {path} in {key}: timed out after {}s",
                        per_file_timeout.as_secs()
                    );
                    None
                }
            }
        });
        handles.push(handle);
    }

    let mut loaded = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(Some(file)) => loaded.push(file),
            Ok(None) => {}
            Err(e) => tracing::warn!("Download task for {key} failed: {e}"),
        }
    }

    tracing::info!("Downloaded {} of {} files for {key}", loaded.len(), files.len());

    if loaded.is_empty() {
        return Err(ContextError::NoContentLoaded(key.to_string()));
    }

    Ok(loaded)
}
