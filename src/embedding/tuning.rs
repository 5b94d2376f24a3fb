//! Content-driven config tuning.
//!
//! A pure function from corpus statistics to a config delta. The thresholds
//! are tunable heuristics, not contracts. The delta holds absolute values,
//! so applying it twice gives the same config as applying it once, and the
//! caller's config is never modified in place.

use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;

/// Below this many chunks, lean on raw counts.
pub const SMALL_CORPUS_CHUNKS: usize = 5;
/// From this many chunks on, lean on TF-IDF.
pub const LARGE_CORPUS_CHUNKS: usize = 500;
pub const SMALL_CORPUS_TFIDF_WEIGHT: f32 = 0.5;
pub const LARGE_CORPUS_TFIDF_WEIGHT: f32 = 0.9;
/// Average words per chunk under which bigrams are too sparse to help.
pub const SHORT_CHUNK_WORDS: f32 = 12.0;
/// Average words per chunk above which trigrams are worth their cost.
pub const LONG_CHUNK_WORDS: f32 = 120.0;
/// Share of code-like tokens above which stemming is switched off.
pub const CODE_TOKEN_RATIO: f32 = 0.05;

/// Coarse statistics over a chunk set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub chunk_count: usize,
    pub average_chunk_words: f32,
    /// Fraction of whitespace-separated tokens that look like code.
    pub code_token_ratio: f32,
}

impl CorpusStats {
    pub fn from_chunks<S: AsRef<str>>(chunks: &[S]) -> Self {
        let mut words = 0usize;
        let mut code_like = 0usize;
        for chunk in chunks {
            for token in chunk.as_ref().split_whitespace() {
                words += 1;
                if looks_like_code(token) {
                    code_like += 1;
                }
            }
        }

        let chunk_count = chunks.len();
        Self {
            chunk_count,
            average_chunk_words: if chunk_count == 0 {
                0.0
            } else {
                words as f32 / chunk_count as f32
            },
            code_token_ratio: if words == 0 {
                0.0
            } else {
                code_like as f32 / words as f32
            },
        }
    }
}

fn looks_like_code(token: &str) -> bool {
    const MARKERS: &[&str] = &["::", "->", "=>", "()", "{", "}", ";", "==", "</"];
    if MARKERS.iter().any(|m| token.contains(m)) {
        return true;
    }
    let inner_underscore = token
        .trim_matches('_')
        .contains('_');
    let camel_case = token
        .chars()
        .zip(token.chars().skip(1))
        .any(|(a, b)| a.is_lowercase() && b.is_uppercase());
    inner_underscore || camel_case
}

/// Absolute overrides suggested by `suggest`. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDelta {
    pub ngram_sizes: Option<Vec<usize>>,
    pub tfidf_weight: Option<f32>,
    pub enable_stemming: Option<bool>,
}

impl ConfigDelta {
    pub fn is_empty(&self) -> bool {
        self.ngram_sizes.is_none() && self.tfidf_weight.is_none() && self.enable_stemming.is_none()
    }

    /// Return a tuned copy of `config`.
    pub fn apply(&self, config: &EmbeddingConfig) -> EmbeddingConfig {
        let mut tuned = config.clone();
        if let Some(ref sizes) = self.ngram_sizes {
            tuned.ngram_sizes = sizes.clone();
        }
        if let Some(weight) = self.tfidf_weight {
            tuned.tfidf_weight = weight;
        }
        if let Some(stemming) = self.enable_stemming {
            tuned.enable_stemming = stemming;
        }
        tuned
    }
}

/// Suggest config adjustments for a corpus.
pub fn suggest(stats: &CorpusStats) -> ConfigDelta {
    let mut delta = ConfigDelta::default();
    if stats.chunk_count == 0 {
        return delta;
    }

    if stats.chunk_count < SMALL_CORPUS_CHUNKS {
        delta.tfidf_weight = Some(SMALL_CORPUS_TFIDF_WEIGHT);
    } else if stats.chunk_count >= LARGE_CORPUS_CHUNKS {
        delta.tfidf_weight = Some(LARGE_CORPUS_TFIDF_WEIGHT);
    }

    if stats.average_chunk_words < SHORT_CHUNK_WORDS {
        delta.ngram_sizes = Some(vec![1]);
    } else if stats.average_chunk_words > LONG_CHUNK_WORDS {
        delta.ngram_sizes = Some(vec![1, 2, 3]);
    }

    // Suffix stripping mangles identifiers.
    if stats.code_token_ratio >= CODE_TOKEN_RATIO {
        delta.enable_stemming = Some(false);
    }

    delta
}

/// Tune `config` for `chunks`. The input config is left untouched.
pub fn tune<S: AsRef<str>>(config: &EmbeddingConfig, chunks: &[S]) -> EmbeddingConfig {
    suggest(&CorpusStats::from_chunks(chunks)).apply(config)
}
