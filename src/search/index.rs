//! Per-repository index construction and query retrieval.

use crate::error::ContextError;
use crate::llm::Embedder;
use crate::models::{Excerpt, Summary};

use super::vector::FlatL2Index;

/// Searchable snapshot of one repository.
///
/// Row `i` of the index, `summaries[i]` and `paths()[i]` describe the same
/// file. Entries are never updated in place; a rebuild replaces the whole
/// entry.
#[derive(Debug, Clone)]
pub struct RepoIndexEntry {
    index: FlatL2Index,
    summaries: Vec<Summary>,
    paths: Vec<String>,
}

impl RepoIndexEntry {
    fn new(index: FlatL2Index, summaries: Vec<Summary>) -> Result<Self, ContextError> {
        if summaries.is_empty() || index.len() != summaries.len() {
            return Err(ContextError::embedding(format!(
                "index holds {} vectors for {} summaries",
                index.len(),
                summaries.len()
            )));
        }
        let paths = summaries.iter().map(|s| s.path.clone()).collect();
        Ok(Self {
            index,
            summaries,
            paths,
        })
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    pub fn summaries(&self) -> &[Summary] {
        &self.summaries
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }
}

/// Embed all summaries in one batch and index them in order.
pub async fn build_index(
    embedder: &dyn Embedder,
    summaries: Vec<Summary>,
) -> Result<RepoIndexEntry, ContextError> {
    if summaries.is_empty() {
        return Err(ContextError::embedding("no summaries to embed"));
    }

    let texts: Vec<String> = summaries.iter().map(|s| s.text.clone()).collect();
    let embeddings = embedder
        .embed(&texts)
        .await
        .map_err(|e| ContextError::embedding(format!("{e:#}")))?;

    if embeddings.len() != summaries.len() {
        return Err(ContextError::embedding(format!(
            "expected {} vectors, got {}",
            summaries.len(),
            embeddings.len()
        )));
    }

    let dim = embeddings.first().map(Vec::len).unwrap_or(0);
    if dim == 0 {
        return Err(ContextError::embedding("provider returned empty vectors"));
    }

    let mut index = FlatL2Index::new(dim);
    index
        .add(&embeddings)
        .map_err(|e| ContextError::embedding(format!("{e:#}")))?;

    tracing::info!("Indexed {} summaries ({dim}-dimensional)", summaries.len());
    RepoIndexEntry::new(index, summaries)
}

/// Embed `query` and return the `min(top_k, len)` nearest files, nearest first.
pub async fn retrieve(
    embedder: &dyn Embedder,
    entry: &RepoIndexEntry,
    query: &str,
    top_k: usize,
) -> Result<Vec<Excerpt>, ContextError> {
    let query_vector = embedder
        .embed(&[query.to_string()])
        .await
        .map_err(|e| ContextError::embedding(format!("{e:#}")))?
        .into_iter()
        .next()
        .ok_or_else(|| ContextError::embedding("no embedding returned for query"))?;

    let k = top_k.min(entry.len());
    search_vector(entry, &query_vector, k)
}

/// k-NN search against an already-embedded query.
pub fn search_vector(
    entry: &RepoIndexEntry,
    query_vector: &[f32],
    k: usize,
) -> Result<Vec<Excerpt>, ContextError> {
    let neighbors = entry
        .index
        .search(query_vector, k)
        .map_err(|e| ContextError::embedding(format!("{e:#}")))?;

    Ok(neighbors
        .into_iter()
        .map(|n| Excerpt {
            path: entry.paths[n.id].clone(),
            summary: entry.summaries[n.id].text.clone(),
            distance: n.distance,
        })
        .collect())
}
