//! One-shot retrieval from the command line.
//!
//! `ragchat search "<query>"` embeds the query, runs top-k retrieval over
//! the persisted index, and prints ranked chunks with scores. Useful for
//! tuning `top_k` and `threshold` before serving.

use anyhow::Result;

use ragchat_core::embedding::Embedder;
use ragchat_core::search::RetrievalParams;
use ragchat_core::{Index, ScoredChunk};

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::store;

/// Maximum characters of chunk text shown per result.
const SNIPPET_CHARS: usize = 200;

pub async fn run_search(
    config: &Config,
    query: &str,
    top_k: Option<usize>,
    threshold: Option<f32>,
) -> Result<()> {
    let params = config.retrieval.params_with(top_k, threshold)?;
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let index = store::load_index(&config.index.path)?;
    let embedder = create_embedder(&config.embedding)?;

    let results = search_index(&index, embedder.as_ref(), query, params).await?;

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, r) in results.iter().enumerate() {
        println!("{}. [{:.4}] {} — {}", i + 1, r.score, r.chunk_id, r.title);
        println!("    {}", snippet(&r.content));
    }

    Ok(())
}

/// Embed `query` and retrieve from `index`.
pub async fn search_index(
    index: &Index,
    embedder: &dyn Embedder,
    query: &str,
    params: RetrievalParams,
) -> Result<Vec<ScoredChunk>> {
    let query_vec = embedder.embed(query.trim()).await?;
    Ok(index.search(&query_vec, params)?)
}

fn snippet(text: &str) -> String {
    let mut out: String = text.chars().take(SNIPPET_CHARS).collect();
    if text.chars().count() > SNIPPET_CHARS {
        out.push('…');
    }
    out
}
