//! # ragchat core
//!
//! Pure retrieval logic for ragchat: data models, word-window chunking,
//! the [`Embedder`](embedding::Embedder) trait, cosine similarity,
//! threshold-filtered top-k retrieval, index construction, and
//! session-keyed conversation history.
//!
//! This crate contains no tokio, filesystem I/O, or network code. The
//! `ragchat` application crate supplies concrete embedding providers,
//! JSON persistence, and the HTTP server.

pub mod chunk;
pub mod embedding;
pub mod error;
pub mod index;
pub mod models;
pub mod search;
pub mod session;

pub use error::{CoreError, Result};
pub use index::Index;
pub use models::{Chunk, ConversationTurn, Document, Role, ScoredChunk};
