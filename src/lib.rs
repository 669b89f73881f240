//! # ragchat
//!
//! A minimal retrieval-augmented chat backend.
//!
//! Documents are split into overlapping word windows, embedded once at
//! ingest time, and persisted as a single JSON index. At query time the
//! user's message (expanded with recent turns from the same session) is
//! embedded and compared against every chunk by cosine similarity; the
//! best chunk above the threshold becomes the answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ docs.json  │──▶│ Chunk+Embed  │──▶│ vector_store │
//! └────────────┘   └──────────────┘   │    .json     │
//!                                     └──────┬───────┘
//!                      ┌─────────────────────┤
//!                      ▼                     ▼
//!                 ┌──────────┐         ┌──────────┐
//!                 │   CLI    │         │   HTTP   │
//!                 │ (search) │         │ /api/chat│
//!                 └──────────┘         └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ragchat ingest                  # build the index from docs.json
//! ragchat stats                   # check what was indexed
//! ragchat search "refund policy"  # try retrieval
//! ragchat serve                   # start the chat server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`embedding`] | Embedding providers (disabled, OpenAI, Ollama, local) |
//! | [`store`] | Document loading and index persistence |
//! | [`ingest`] | Chunk, embed, and save |
//! | [`progress`] | Ingest progress reporting |
//! | [`search`] | One-shot CLI retrieval |
//! | [`stats`] | Index statistics |
//! | [`chat`] | Session-aware reply service |
//! | [`server`] | HTTP chat server |

pub mod chat;
pub mod config;
pub mod embedding;
pub mod ingest;
pub mod progress;
pub mod search;
pub mod server;
pub mod stats;
pub mod store;
