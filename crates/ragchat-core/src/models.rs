//! Data models shared by ingestion, retrieval, and chat.
//!
//! [`Document`] and [`Chunk`] serialize to the on-disk JSON shapes used
//! for the documents file and the index file respectively.

use serde::{Deserialize, Serialize};

/// An input document, supplied externally and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// An embedded chunk of a document, as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// `{document_id}_chunk_{n}` with a 1-based `n`.
    pub chunk_id: String,
    /// Title of the parent document.
    pub title: String,
    /// The chunk's text.
    pub content: String,
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Build the deterministic chunk id for the `index`-th (0-based)
    /// chunk of a document.
    pub fn make_id(document_id: &str, index: usize) -> String {
        format!("{}_chunk_{}", document_id, index + 1)
    }
}

/// A chunk paired with its similarity to a query. Produced per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub title: String,
    pub content: String,
    pub score: f32,
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
