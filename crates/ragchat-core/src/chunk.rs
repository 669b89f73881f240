//! Overlapping word-window text chunker.
//!
//! Splits document text into windows of `chunk_size` whitespace-delimited
//! words. Consecutive windows share `overlap` words so that local context
//! survives across chunk boundaries.

use crate::error::{CoreError, Result};

/// Word-window chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkParams {
    /// Words per window.
    pub chunk_size: usize,
    /// Words repeated at the start of the next window.
    pub overlap: usize,
}

impl ChunkParams {
    /// Validate and build chunking parameters.
    ///
    /// Fails with [`CoreError::InvalidConfiguration`] unless
    /// `chunk_size > overlap`, which is what guarantees the window advances.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size <= overlap {
            return Err(CoreError::InvalidConfiguration(format!(
                "chunk_size ({}) must be greater than overlap ({})",
                chunk_size, overlap
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Number of words the window start advances by. Never zero, even
    /// for parameters built without [`ChunkParams::new`].
    pub fn stride(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap).max(1)
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            overlap: 50,
        }
    }
}

/// Split `text` into overlapping word windows.
///
/// Windows start every `chunk_size - overlap` words until the start
/// passes the end of the text, so empty text yields no chunks and text of
/// at most one stride yields exactly one. Text longer than one stride but
/// shorter than `chunk_size` still gets a short tail window holding its
/// last words. The final window is not padded.
pub fn chunk_words(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    let params = ChunkParams::new(chunk_size, overlap)?;
    Ok(chunk_with(text, params))
}

/// Like [`chunk_words`] with already-validated parameters.
pub fn chunk_with(text: &str, params: ChunkParams) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let stride = params.stride();

    let mut chunks = Vec::with_capacity(words.len().div_ceil(stride));
    let mut start = 0;
    while start < words.len() {
        let end = (start + params.chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += stride;
    }
    chunks
}
