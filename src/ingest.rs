//! Ingestion pipeline orchestration.
//!
//! Coordinates the offline flow: documents file → chunking → embedding →
//! index file. A run is all-or-nothing: if any chunk fails to embed, the
//! previously persisted index is left untouched.

use anyhow::Result;
use std::path::Path;

use ragchat_core::chunk::chunk_with;
use ragchat_core::embedding::Embedder;
use ragchat_core::index::build_index;
use ragchat_core::{Chunk, Document};

use crate::config::Config;
use crate::embedding::create_embedder;
use crate::progress::{IngestProgressEvent, IngestProgressReporter, ProgressMode};
use crate::store;

/// Counts from a completed ingest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub documents: usize,
    pub chunks: usize,
    pub dims: usize,
}

/// Entry point for `ragchat ingest`.
pub async fn run_ingest(
    config: &Config,
    docs_path: Option<&Path>,
    dry_run: bool,
    progress: ProgressMode,
) -> Result<()> {
    let docs_path = docs_path.unwrap_or(&config.documents.path);
    let documents = store::load_documents(docs_path)?;

    if dry_run {
        let params = config.chunking.params()?;
        let total: usize = documents
            .iter()
            .map(|d| chunk_with(&d.content, params).len())
            .sum();
        println!("ingest {} (dry-run)", docs_path.display());
        println!("  documents found: {}", documents.len());
        println!("  estimated chunks: {}", total);
        return Ok(());
    }

    let embedder = create_embedder(&config.embedding)?;
    let reporter = progress.reporter();
    let summary = ingest_documents(
        config,
        &documents,
        embedder.as_ref(),
        reporter.as_ref(),
        &config.index.path,
    )
    .await?;

    println!("ingest {}", docs_path.display());
    println!("  documents: {}", summary.documents);
    println!("  chunks written: {}", summary.chunks);
    println!("  dimensions: {}", summary.dims);
    println!("  model: {}", embedder.model_name());
    println!("  index: {}", config.index.path.display());
    println!("ok");

    Ok(())
}

/// Chunk, embed, and persist `documents` to `index_path`.
///
/// The index file is only replaced once every chunk has been embedded.
pub async fn ingest_documents(
    config: &Config,
    documents: &[Document],
    embedder: &dyn Embedder,
    reporter: &dyn IngestProgressReporter,
    index_path: &Path,
) -> Result<IngestSummary> {
    let params = config.chunking.params()?;
    let total: usize = documents
        .iter()
        .map(|d| chunk_with(&d.content, params).len())
        .sum();
    reporter.report(IngestProgressEvent::Chunked {
        documents: documents.len() as u64,
        total: total as u64,
    });

    let chunks: Vec<Chunk> = build_index(
        documents,
        embedder,
        params,
        config.embedding.batch_size,
        |chunk, n, total| {
            tracing::debug!(chunk_id = %chunk.chunk_id, n, total, "embedded chunk");
            reporter.report(IngestProgressEvent::Embedded {
                chunk_id: chunk.chunk_id.clone(),
                n: n as u64,
                total: total as u64,
            });
        },
    )
    .await?;

    store::save_index(index_path, &chunks)?;

    let summary = IngestSummary {
        documents: documents.len(),
        chunks: chunks.len(),
        dims: chunks.first().map(|c| c.embedding.len()).unwrap_or(0),
    };
    tracing::info!(
        documents = summary.documents,
        chunks = summary.chunks,
        dims = summary.dims,
        index = %index_path.display(),
        "index written"
    );
    Ok(summary)
}
