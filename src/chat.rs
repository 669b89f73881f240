//! Retrieval-backed chat replies.
//!
//! [`ChatService`] ties the pieces of the online path together with all
//! state injected: the loaded [`Index`], an [`Embedder`] for queries, and a
//! [`SessionStore`] for conversation history.
//!
//! There is no generation step. The reply is the text of the best
//! retrieved chunk, or a fixed fallback message when nothing clears the
//! similarity threshold. The full ranked result is still returned in
//! [`ChatReply::sources`].

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use ragchat_core::embedding::Embedder;
use ragchat_core::search::RetrievalParams;
use ragchat_core::session::{expand_query, SessionStore};
use ragchat_core::{Index, ScoredChunk};

use crate::config::Config;

/// Chat knobs, decoupled from application config.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub retrieval: RetrievalParams,
    pub max_history_pairs: usize,
    pub temperature: f32,
    pub fallback_message: String,
}

impl ChatSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            retrieval: config.retrieval.params(),
            max_history_pairs: config.chat.max_history_pairs,
            temperature: config.chat.temperature,
            fallback_message: config.chat.fallback_message.clone(),
        }
    }
}

/// Errors a caller may want to map to a client-facing status.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Empty message")]
    EmptyMessage,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// A retrieved chunk cited by a reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub chunk_id: String,
    pub title: String,
    pub score: f32,
}

impl From<&ScoredChunk> for SourceRef {
    fn from(c: &ScoredChunk) -> Self {
        Self {
            chunk_id: c.chunk_id.clone(),
            title: c.title.clone(),
            score: c.score,
        }
    }
}

/// The outcome of one chat turn.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub answer: String,
    pub temperature: f32,
    pub session_id: String,
    pub history_size: usize,
    pub sources: Vec<SourceRef>,
}

#[derive(Clone)]
pub struct ChatService {
    index: Arc<Index>,
    embedder: Arc<dyn Embedder>,
    sessions: Arc<dyn SessionStore>,
    settings: ChatSettings,
}

impl ChatService {
    pub fn new(
        index: Arc<Index>,
        embedder: Arc<dyn Embedder>,
        sessions: Arc<dyn SessionStore>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            index,
            embedder,
            sessions,
            settings,
        }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Answer `message` in the context of `session_id`.
    ///
    /// The query sent to the embedder is the message prefixed with the
    /// session's recent user turns. Both the user message and the reply
    /// are appended to the session afterwards.
    pub async fn reply(&self, session_id: &str, message: &str) -> Result<ChatReply, ChatError> {
        let question = message.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let history = self.sessions.history(session_id);
        let query = expand_query(&history, question, self.settings.max_history_pairs);

        let query_vec = self.embedder.embed(&query).await?;
        let hits = self
            .index
            .search(&query_vec, self.settings.retrieval)
            .map_err(anyhow::Error::from)?;

        let answer = match hits.first() {
            Some(best) => best.content.clone(),
            None => self.settings.fallback_message.clone(),
        };
        tracing::debug!(
            session_id,
            hits = hits.len(),
            best = hits.first().map(|h| h.score),
            "retrieved chunks"
        );

        let history_size = self.sessions.record_exchange(session_id, question, &answer);

        Ok(ChatReply {
            answer,
            temperature: self.settings.temperature,
            session_id: session_id.to_string(),
            history_size,
            sources: hits.iter().map(SourceRef::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragchat_core::session::InMemorySessionStore;
    use ragchat_core::Chunk;
    use std::sync::Mutex;

    /// Maps keywords to axes; remembers the last query it saw.
    struct KeywordEmbedder {
        last_query: Mutex<String>,
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        fn model_name(&self) -> &str {
            "keywords"
        }
        fn dims(&self) -> usize {
            3
        }
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            *self.last_query.lock().unwrap() = text.to_string();
            let has = |w: &str| if text.contains(w) { 1.0 } else { 0.0 };
            Ok(vec![has("refund"), has("shipping"), has("warranty")])
        }
    }

    fn chunk(id: &str, content: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            chunk_id: id.to_string(),
            title: id.to_string(),
            content: content.to_string(),
            embedding,
        }
    }

    fn service(max_history_pairs: usize) -> (ChatService, Arc<KeywordEmbedder>) {
        let index = Index::new(vec![
            chunk("refunds_chunk_1", "Refunds take 14 days.", vec![1.0, 0.0, 0.0]),
            chunk("shipping_chunk_1", "Shipping is free.", vec![0.0, 1.0, 0.0]),
        ])
        .unwrap();
        let embedder = Arc::new(KeywordEmbedder {
            last_query: Mutex::new(String::new()),
        });
        let settings = ChatSettings {
            retrieval: RetrievalParams {
                top_k: 3,
                threshold: 0.6,
            },
            max_history_pairs,
            temperature: 0.2,
            fallback_message: "no idea".to_string(),
        };
        let svc = ChatService::new(
            Arc::new(index),
            embedder.clone(),
            Arc::new(InMemorySessionStore::new(max_history_pairs)),
            settings,
        );
        (svc, embedder)
    }

    #[tokio::test]
    async fn test_reply_returns_top_chunk() {
        let (svc, _) = service(5);
        let reply = svc.reply("s1", "  what about a refund?  ").await.unwrap();
        assert_eq!(reply.answer, "Refunds take 14 days.");
        assert_eq!(reply.history_size, 2);
        assert_eq!(reply.sources.len(), 1);
        assert_eq!(reply.sources[0].chunk_id, "refunds_chunk_1");
    }

    #[tokio::test]
    async fn test_reply_falls_back_when_nothing_matches() {
        let (svc, _) = service(5);
        let reply = svc.reply("s1", "tell me about the warranty").await.unwrap();
        assert_eq!(reply.answer, "no idea");
        assert!(reply.sources.is_empty());
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let (svc, _) = service(5);
        assert!(matches!(
            svc.reply("s1", "   ").await,
            Err(ChatError::EmptyMessage)
        ));
    }

    #[tokio::test]
    async fn test_history_expands_query_and_is_capped() {
        let (svc, embedder) = service(1);
        svc.reply("s1", "refund").await.unwrap();
        let reply = svc.reply("s1", "and how long?").await.unwrap();
        assert_eq!(*embedder.last_query.lock().unwrap(), "refund and how long?");
        assert_eq!(reply.answer, "Refunds take 14 days.");
        assert_eq!(reply.history_size, 2);

        // A different session starts fresh.
        svc.reply("s2", "shipping").await.unwrap();
        assert_eq!(*embedder.last_query.lock().unwrap(), "shipping");
    }

    #[test]
    fn test_reply_serializes_camel_case() {
        let reply = ChatReply {
            answer: "x".into(),
            temperature: 0.2,
            session_id: "abc".into(),
            history_size: 2,
            sources: vec![],
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["sessionId"], "abc");
        assert_eq!(json["historySize"], 2);
    }
}
