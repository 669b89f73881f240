//! Session-keyed conversation history and query expansion.
//!
//! The [`SessionStore`] trait owns session lifecycle. Sessions are created
//! on first use and trimmed to the newest `2 × max_history_pairs` turns
//! after every exchange. [`InMemorySessionStore`] keeps them for the
//! lifetime of the process.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::models::{ConversationTurn, Role};

/// Storage for per-session conversation history.
pub trait SessionStore: Send + Sync {
    /// The session's turns, oldest first. Unknown sessions are empty.
    fn history(&self, session_id: &str) -> Vec<ConversationTurn>;

    /// Append one user turn and one assistant turn, then trim.
    ///
    /// Returns the number of turns retained for the session.
    fn record_exchange(&self, session_id: &str, user: &str, assistant: &str) -> usize;
}

/// In-memory session store behind a `RwLock`.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Vec<ConversationTurn>>>,
    max_history_pairs: usize,
}

impl InMemorySessionStore {
    pub fn new(max_history_pairs: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history_pairs,
        }
    }

    /// Maximum turns kept per session.
    pub fn max_turns(&self) -> usize {
        self.max_history_pairs * 2
    }

    /// Number of sessions seen so far.
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl SessionStore for InMemorySessionStore {
    fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record_exchange(&self, session_id: &str, user: &str, assistant: &str) -> usize {
        let max_turns = self.max_turns();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push(ConversationTurn::user(user));
        turns.push(ConversationTurn::assistant(assistant));
        if turns.len() > max_turns {
            let excess = turns.len() - max_turns;
            turns.drain(..excess);
        }
        turns.len()
    }
}

/// Prefix `question` with the session's most recent user messages.
///
/// Takes the last `max_history_pairs` user turns (assistant turns are
/// ignored), joins them with single spaces, and prepends them to the
/// question. The result is trimmed.
pub fn expand_query(
    history: &[ConversationTurn],
    question: &str,
    max_history_pairs: usize,
) -> String {
    let previous: Vec<&str> = history
        .iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
        .collect();
    let start = previous.len().saturating_sub(max_history_pairs);
    let context = previous[start..].join(" ");
    format!("{} {}", context, question).trim().to_string()
}
