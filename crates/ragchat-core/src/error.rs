//! Error types for the retrieval core.

use thiserror::Error;

/// Errors raised by chunking, indexing, scoring, and index loading.
///
/// The two policy-defined non-error cases (a zero-magnitude vector and a
/// query with no chunk over threshold) never produce one of these.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A parameter combination that cannot produce a valid result,
    /// e.g. `chunk_size <= overlap`.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The embedder failed while indexing; the whole run is abandoned.
    #[error("embedding failed for {chunk_id}: {message}")]
    EmbeddingFailure {
        /// The chunk being embedded when the failure occurred.
        chunk_id: String,
        /// Description of the underlying failure.
        message: String,
    },

    /// Two vectors that must share a dimensionality do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The persisted index could not be loaded in full.
    #[error("index unavailable at {path}: {reason}")]
    IndexUnavailable { path: String, reason: String },
}

/// Convenience result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
