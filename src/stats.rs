//! Index statistics.
//!
//! Provides a quick summary of what's indexed: chunk and document counts,
//! embedding dimensionality, and file size. Used by `ragchat stats` to
//! confirm an ingest produced what was expected.

use anyhow::Result;

use ragchat_core::Index;

use crate::config::Config;
use crate::store;

/// Run the stats command: load the index and print a summary.
pub fn run_stats(config: &Config) -> Result<()> {
    let path = &config.index.path;
    let index = store::load_index(path)?;
    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    println!("ragchat — Index Stats");
    println!("=====================");
    println!();
    println!("  Index:       {}", path.display());
    println!("  Size:        {}", format_bytes(file_size));
    println!();
    println!("  Documents:   {}", index.document_count());
    println!("  Chunks:      {}", index.len());
    println!("  Dimensions:  {}", index.dims());
    println!("  Avg words:   {:.1}", average_words(&index));

    Ok(())
}

fn average_words(index: &Index) -> f64 {
    if index.is_empty() {
        return 0.0;
    }
    let words: usize = index
        .chunks()
        .iter()
        .map(|c| c.content.split_whitespace().count())
        .sum();
    words as f64 / index.len() as f64
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_core::Chunk;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1_048_576), "2.0 MB");
    }

    #[test]
    fn test_average_words() {
        assert_eq!(average_words(&Index::default()), 0.0);
        let chunk = |content: &str| Chunk {
            chunk_id: "d_chunk_1".into(),
            title: "d".into(),
            content: content.into(),
            embedding: vec![1.0],
        };
        let index = Index::new(vec![chunk("one two"), chunk("one two three four")]).unwrap();
        assert!((average_words(&index) - 3.0).abs() < 1e-9);
    }
}
