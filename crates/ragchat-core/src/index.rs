//! Index construction and the in-memory [`Index`] value.
//!
//! [`build_index`] runs the chunker and an [`Embedder`] over a document
//! collection. The output is ordered by document, then by chunk within
//! each document, and every chunk id follows `{doc}_chunk_{n}`.
//!
//! Ingestion is all-or-nothing: the first embedder failure aborts the
//! run and no chunks are returned.

use std::collections::HashSet;

use crate::chunk::{chunk_with, ChunkParams};
use crate::embedding::Embedder;
use crate::error::{CoreError, Result};
use crate::models::{Chunk, Document, ScoredChunk};
use crate::search::{retrieve, RetrievalParams};

/// A chunk waiting for its embedding.
struct PendingChunk {
    chunk_id: String,
    title: String,
    content: String,
}

/// Chunk and embed `documents`.
///
/// Texts are sent to the embedder `batch_size` at a time; `on_embedded`
/// is called once per chunk with `(chunk, n, total)` after its vector
/// arrives, for progress reporting.
///
/// # Errors
///
/// - [`CoreError::InvalidConfiguration`] if `batch_size` is zero.
/// - [`CoreError::EmbeddingFailure`] if the embedder errors or returns
///   the wrong number of vectors.
/// - [`CoreError::DimensionMismatch`] if a vector's length differs from
///   the first vector of the run.
pub async fn build_index<F>(
    documents: &[Document],
    embedder: &dyn Embedder,
    params: ChunkParams,
    batch_size: usize,
    mut on_embedded: F,
) -> Result<Vec<Chunk>>
where
    F: FnMut(&Chunk, usize, usize) + Send,
{
    if batch_size == 0 {
        return Err(CoreError::InvalidConfiguration(
            "embedding batch_size must be > 0".to_string(),
        ));
    }

    let mut pending = Vec::new();
    for doc in documents {
        for (i, text) in chunk_with(&doc.content, params).into_iter().enumerate() {
            pending.push(PendingChunk {
                chunk_id: Chunk::make_id(&doc.id, i),
                title: doc.title.clone(),
                content: text,
            });
        }
    }

    let total = pending.len();
    tracing::debug!(
        documents = documents.len(),
        chunks = total,
        model = embedder.model_name(),
        "chunked documents"
    );

    let mut out: Vec<Chunk> = Vec::with_capacity(total);
    let mut dims: Option<usize> = None;

    for batch in pending.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|p| p.content.clone()).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| CoreError::EmbeddingFailure {
                chunk_id: batch[0].chunk_id.clone(),
                message: format!("{:#}", e),
            })?;

        if vectors.len() != batch.len() {
            return Err(CoreError::EmbeddingFailure {
                chunk_id: batch[0].chunk_id.clone(),
                message: format!(
                    "embedder returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                ),
            });
        }

        for (item, vector) in batch.iter().zip(vectors) {
            let expected = *dims.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(CoreError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }

            let chunk = Chunk {
                chunk_id: item.chunk_id.clone(),
                title: item.title.clone(),
                content: item.content.clone(),
                embedding: vector,
            };
            on_embedded(&chunk, out.len() + 1, total);
            out.push(chunk);
        }
    }

    Ok(out)
}

/// A loaded, read-only index.
///
/// Construction checks that every embedding shares one dimensionality.
/// Share it across request handlers behind an `Arc`; it is never mutated.
#[derive(Debug, Clone, Default)]
pub struct Index {
    chunks: Vec<Chunk>,
    dims: usize,
}

impl Index {
    /// Wrap chunks, verifying the uniform-dimension invariant.
    pub fn new(chunks: Vec<Chunk>) -> Result<Self> {
        let dims = chunks.first().map(|c| c.embedding.len()).unwrap_or(0);
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != dims) {
            return Err(CoreError::DimensionMismatch {
                expected: dims,
                actual: bad.embedding.len(),
            });
        }
        Ok(Self { chunks, dims })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimensionality (`0` for an empty index).
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Number of distinct source documents, recovered from chunk ids.
    pub fn document_count(&self) -> usize {
        self.chunks
            .iter()
            .map(|c| {
                c.chunk_id
                    .rsplit_once("_chunk_")
                    .map(|(doc, _)| doc)
                    .unwrap_or(c.chunk_id.as_str())
            })
            .collect::<HashSet<_>>()
            .len()
    }

    /// Retrieve the best chunks for `query`.
    ///
    /// A query whose length differs from the index dimensionality fails
    /// with [`CoreError::DimensionMismatch`] before any scoring.
    pub fn search(&self, query: &[f32], params: RetrievalParams) -> Result<Vec<ScoredChunk>> {
        if !self.is_empty() && query.len() != self.dims {
            return Err(CoreError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }
        retrieve(query, &self.chunks, params)
    }
}
