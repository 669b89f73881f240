//! Embedder trait and vector similarity.
//!
//! Defines the [`Embedder`] interface that all embedding backends
//! implement, plus [`cosine_similarity`], the scoring function used by
//! retrieval.
//!
//! Concrete providers (OpenAI, Ollama, fastembed) live in the `ragchat`
//! app crate. Tests in this crate use deterministic stub embedders.

use anyhow::Result;
use async_trait::async_trait;

use crate::error::CoreError;

/// A text-to-vector capability.
///
/// Calling [`embed`](Embedder::embed) twice on identical text must yield
/// identical (or near-identical) vectors, and every vector from one
/// embedder must have the same length.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding dimensionality, or `0` when unknown.
    fn dims(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, returning one vector per input in order.
    ///
    /// The default implementation calls [`embed`](Embedder::embed)
    /// sequentially; network providers override it to batch requests.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in `[-1.0, 1.0]`. If either vector has zero magnitude
/// the result is `0.0`, including for two zero vectors.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
///
/// # Errors
///
/// [`CoreError::DimensionMismatch`] when the lengths differ.
///
/// # Example
///
/// ```rust
/// use ragchat_core::embedding::cosine_similarity;
///
/// let sim = cosine_similarity(&[1.0, 0.0], &[0.9, 0.1]).unwrap();
/// assert!((sim - 0.9939).abs() < 1e-3);
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, CoreError> {
    if a.len() != b.len() {
        return Err(CoreError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let sim = dot / (norm_a.sqrt() * norm_b.sqrt());
    Ok(sim.clamp(-1.0, 1.0) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_scale_invariant() {
        let a = cosine_similarity(&[1.0, 2.0], &[3.0, 1.0]).unwrap();
        let b = cosine_similarity(&[10.0, 20.0], &[0.3, 0.1]).unwrap();
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_policy() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_bounds_hold_for_awkward_vectors() {
        let vectors: Vec<Vec<f32>> = vec![
            vec![1e-20, 3.0, -7.5],
            vec![1e10, -1e10, 0.5],
            vec![0.1, 0.1, 0.1],
            vec![-3.0, 0.0, 2.0],
        ];
        for a in &vectors {
            for b in &vectors {
                let sim = cosine_similarity(a, b).unwrap();
                assert!((-1.0..=1.0).contains(&sim), "out of range: {}", sim);
            }
        }
    }
}
