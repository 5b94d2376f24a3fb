//! Lexical embedding infrastructure.
//!
//! Chunks are vectorized against a shared `Vocabulary`: one dimension per
//! term, TF-IDF or bag-of-words weights. No embedding service involved.

pub mod chunker;
pub mod pipeline;
pub mod tfidf;
pub mod tuning;
pub mod vectorizer;
pub mod vocabulary;

use crate::error::{EmbeddingError, EmbeddingResult};

/// A dense vector aligned to `Vocabulary::terms()`.
pub type Embedding = Vec<f32>;

/// Dot product. Callers check lengths.
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// True when every entry is zero (including the empty vector).
pub fn is_zero_vector(v: &[f32]) -> bool {
    v.iter().all(|&x| x == 0.0)
}

/// Cosine similarity between two vectors of the same vocabulary.
///
/// Vectors of different lengths come from different vocabularies and are
/// rejected. A zero-magnitude side scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> EmbeddingResult<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot(a, b) / (norm_a * norm_b))
}
