//! Flat-file persistence for documents and the chunk index.
//!
//! The index file is a pretty-printed JSON array of
//! `{chunk_id, title, content, embedding}` records. Saving is an atomic
//! replace: the new index is written to a temporary file in the target
//! directory and renamed over the old one, so readers never observe a
//! partial write.

use anyhow::{Context, Result};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ragchat_core::{Chunk, CoreError, Document, Index};

/// Load the document collection to ingest.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open documents file: {}", path.display()))?;
    let documents: Vec<Document> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse documents file: {}", path.display()))?;
    Ok(documents)
}

/// Load the persisted index in full.
///
/// Any failure (missing file, malformed JSON, mixed embedding
/// dimensionality) is reported as [`CoreError::IndexUnavailable`]; a
/// partially loaded index is never returned.
pub fn load_index(path: &Path) -> Result<Index, CoreError> {
    let unavailable = |reason: String| CoreError::IndexUnavailable {
        path: path.display().to_string(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|e| unavailable(e.to_string()))?;
    let chunks: Vec<Chunk> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| unavailable(format!("malformed index: {}", e)))?;
    let index = Index::new(chunks).map_err(|e| unavailable(e.to_string()))?;

    tracing::debug!(
        path = %path.display(),
        chunks = index.len(),
        dims = index.dims(),
        "loaded index"
    );
    Ok(index)
}

/// Atomically replace the index file with `chunks`.
pub fn save_index(path: &Path, chunks: &[Chunk]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create index directory: {}", dir.display()))?;

    let tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, chunks)?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace index file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            Chunk {
                chunk_id: "refunds_chunk_1".into(),
                title: "Refunds".into(),
                content: "Refunds are issued within 14 days.".into(),
                embedding: vec![0.1, -0.2, 0.3],
            },
            Chunk {
                chunk_id: "refunds_chunk_2".into(),
                title: "Refunds".into(),
                content: "Store credit never expires.".into(),
                embedding: vec![0.123_456_79, 1e-7, -3.5],
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("vector_store.json");
        save_index(&path, &sample_chunks()).unwrap();

        let index = load_index(&path).unwrap();
        assert_eq!(index.chunks(), sample_chunks().as_slice());
        assert_eq!(index.dims(), 3);
    }

    #[test]
    fn test_save_replaces_previous_index() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        save_index(&path, &sample_chunks()).unwrap();
        save_index(&path, &sample_chunks()[..1]).unwrap();
        assert_eq!(load_index(&path).unwrap().len(), 1);

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_missing_index_unavailable() {
        let tmp = TempDir::new().unwrap();
        let err = load_index(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CoreError::IndexUnavailable { .. }));
    }

    #[test]
    fn test_corrupt_index_unavailable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, "[{\"chunk_id\": \"a\", \"title\": ").unwrap();
        assert!(matches!(
            load_index(&path),
            Err(CoreError::IndexUnavailable { .. })
        ));
    }

    #[test]
    fn test_mixed_dims_unavailable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        let mut chunks = sample_chunks();
        chunks[1].embedding.pop();
        save_index(&path, &chunks).unwrap();
        assert!(matches!(
            load_index(&path),
            Err(CoreError::IndexUnavailable { .. })
        ));
    }

    #[test]
    fn test_load_documents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs.json");
        std::fs::write(
            &path,
            r#"[{"id": "faq", "title": "FAQ", "content": "Hello there"}]"#,
        )
        .unwrap();
        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "FAQ");
    }

    #[test]
    fn test_documents_missing_field_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs.json");
        std::fs::write(&path, r#"[{"id": "faq", "content": "no title"}]"#).unwrap();
        assert!(load_documents(&path).is_err());
    }
}
