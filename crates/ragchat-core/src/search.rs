//! Brute-force top-k retrieval with a similarity threshold.
//!
//! # Algorithm
//!
//! 1. Score every chunk with [`cosine_similarity`] against the query.
//! 2. Keep chunks with `score >= threshold`.
//! 3. Stable sort by score (desc); equal scores keep index order.
//! 4. Truncate to `top_k`.
//!
//! Cost is `O(n·d + n log n)` per query, which is fine for a single
//! in-memory corpus.

use crate::embedding::cosine_similarity;
use crate::error::{CoreError, Result};
use crate::models::{Chunk, ScoredChunk};

/// Retrieval tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalParams {
    /// Maximum results to return.
    pub top_k: usize,
    /// Minimum cosine similarity for a chunk to be returned.
    pub threshold: f32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold: 0.6,
        }
    }
}

impl RetrievalParams {
    /// Build parameters from user input.
    ///
    /// The threshold must be a cosine value in `[-1, 1]`. The retrieval
    /// functions themselves accept any threshold; this is the check applied
    /// to configured and command-line values.
    pub fn new(top_k: usize, threshold: f32) -> Result<Self> {
        if !(-1.0..=1.0).contains(&threshold) {
            return Err(CoreError::InvalidConfiguration(format!(
                "threshold ({}) must be in [-1.0, 1.0]",
                threshold
            )));
        }
        Ok(Self { top_k, threshold })
    }
}

/// Return the `top_k` chunks most similar to `query`, best first.
///
/// An empty result is a normal outcome (empty index, `top_k == 0`, or no
/// chunk meeting the threshold) and callers should treat it as
/// "insufficient information".
///
/// # Errors
///
/// [`CoreError::DimensionMismatch`](crate::CoreError::DimensionMismatch)
/// if any chunk's embedding length differs from the query's.
pub fn retrieve_top_k(
    query: &[f32],
    chunks: &[Chunk],
    top_k: usize,
    threshold: f32,
) -> Result<Vec<ScoredChunk>> {
    if top_k == 0 || chunks.is_empty() {
        return Ok(Vec::new());
    }

    let mut scored = Vec::new();
    for chunk in chunks {
        let score = cosine_similarity(query, &chunk.embedding)?;
        if score >= threshold {
            scored.push(ScoredChunk {
                chunk_id: chunk.chunk_id.clone(),
                title: chunk.title.clone(),
                content: chunk.content.clone(),
                score,
            });
        }
    }

    // `sort_by` is stable, which keeps ties in index order.
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);

    Ok(scored)
}

/// [`retrieve_top_k`] with bundled parameters.
pub fn retrieve(
    query: &[f32],
    chunks: &[Chunk],
    params: RetrievalParams,
) -> Result<Vec<ScoredChunk>> {
    retrieve_top_k(query, chunks, params.top_k, params.threshold)
}
