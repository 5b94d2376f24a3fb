//! Error taxonomy for the retrieval core.
//!
//! Hard errors (`EmbeddingError`) are rare: almost every bad input resolves
//! to a sanitized fallback or an empty result. Non-fatal conditions surface
//! as `ProcessingWarning`s next to a best-effort result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Errors from embedding and retrieval operations.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("invalid configuration: {}", join_messages(.0))]
    Configuration(Vec<ConfigError>),

    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

fn join_messages(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Advisory conditions raised while producing a result. Never fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessingWarning {
    /// The input text (or chunk set) was empty after trimming.
    EmptyInput,
    /// The wall-clock budget ran out; the remaining chunks were vectorized unigram-only.
    BudgetExceeded {
        elapsed_ms: u64,
        limit_ms: u64,
        degraded_chunks: usize,
    },
    /// Requested n-gram sizes above the configured maximum were dropped.
    NgramSizeCapped { requested: Vec<usize>, max: usize },
    /// More terms survived filtering than the vocabulary may hold.
    VocabularyTruncated { candidates: usize, kept: usize },
}

impl ProcessingWarning {
    /// Machine-readable reason string.
    pub fn reason(&self) -> &'static str {
        match self {
            ProcessingWarning::EmptyInput => "empty_input",
            ProcessingWarning::BudgetExceeded { .. } => "processing_budget_exceeded",
            ProcessingWarning::NgramSizeCapped { .. } => "ngram_size_capped",
            ProcessingWarning::VocabularyTruncated { .. } => "vocabulary_truncated",
        }
    }
}

impl fmt::Display for ProcessingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingWarning::EmptyInput => write!(f, "input contained no text"),
            ProcessingWarning::BudgetExceeded {
                elapsed_ms,
                limit_ms,
                degraded_chunks,
            } => write!(
                f,
                "processing took {elapsed_ms}ms (limit {limit_ms}ms); {degraded_chunks} chunk(s) vectorized unigram-only"
            ),
            ProcessingWarning::NgramSizeCapped { requested, max } => {
                write!(f, "n-gram sizes {requested:?} exceed maximum {max}, dropped")
            }
            ProcessingWarning::VocabularyTruncated { candidates, kept } => {
                write!(f, "vocabulary truncated from {candidates} to {kept} terms")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_reasons_are_stable() {
        assert_eq!(ProcessingWarning::EmptyInput.reason(), "empty_input");
        let w = ProcessingWarning::BudgetExceeded {
            elapsed_ms: 50,
            limit_ms: 10,
            degraded_chunks: 3,
        };
        assert_eq!(w.reason(), "processing_budget_exceeded");
        assert!(w.to_string().contains("3 chunk(s)"));
    }

    #[test]
    fn configuration_error_lists_every_field() {
        let err = EmbeddingError::Configuration(vec![
            ConfigError::TfidfWeight(1.5),
            ConfigError::MaxChunkSize(0),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("tfidf_weight"));
        assert!(msg.contains("max_chunk_size"));
    }

    #[test]
    fn dimension_mismatch_message() {
        let err = EmbeddingError::DimensionMismatch { left: 3, right: 4 };
        assert_eq!(err.to_string(), "dimension mismatch: 3 vs 4");
    }
}
