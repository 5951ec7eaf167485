use std::cmp::Ordering;

use anyhow::Result;

/// A single k-NN match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion position of the matched vector
    pub id: usize,
    /// Squared L2 distance to the query
    pub distance: f32,
}

/// Exact (brute-force) vector index under squared L2 distance.
///
/// Vectors are stored row-major in one contiguous buffer; ids are insertion
/// positions.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        if self.dim == 0 {
            0
        } else {
            self.data.len() / self.dim
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Append vectors; all must have the index dimension.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        if self.dim == 0 {
            anyhow::bail!("Cannot add vectors to a zero-dimension index");
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim) {
            anyhow::bail!(
                "Vector dimension mismatch: expected {}, got {}",
                self.dim,
                bad.len()
            );
        }

        self.data.reserve(vectors.len() * self.dim);
        for v in vectors {
            self.data.extend_from_slice(v);
        }
        Ok(())
    }

    /// Stored vector at `id`.
    pub fn vector(&self, id: usize) -> Option<&[f32]> {
        let start = id.checked_mul(self.dim)?;
        self.data.get(start..start + self.dim)
    }

    /// Return up to `k` nearest vectors, ascending by distance (ties by id).
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            anyhow::bail!(
                "Query dimension mismatch: expected {}, got {}",
                self.dim,
                query.len()
            );
        }

        let mut scored: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, row)| Neighbor {
                id,
                distance: squared_l2(query, row),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        scored.truncate(k);

        Ok(scored)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
