//! TF-IDF weighting against a fixed vocabulary.
//!
//! IDF has a small-corpus regime (fewer than `SMALL_CORPUS_THRESHOLD`
//! documents) with its own offset formulas. IDF is never 0 for a vocabulary
//! term. The constants are tuned values, versioned with the stemming tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::vocabulary::Vocabulary;
use super::Embedding;
use crate::text::ProcessedText;

/// Corpora with fewer documents than this use the small-corpus IDF.
pub const SMALL_CORPUS_THRESHOLD: usize = 10;
/// Additive offset of the smoothed small-corpus IDF.
pub const SMALL_CORPUS_IDF_OFFSET: f32 = 0.5;
/// Floor for unsmoothed IDF.
pub const MIN_UNSMOOTHED_IDF: f32 = 0.1;

/// Term-frequency flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TfMode {
    /// `count / total`
    #[default]
    Raw,
    /// `1 + ln(count / total)`
    Log,
}

/// Term frequency of a term seen `count` times among `total` terms.
pub fn tf(count: usize, total: usize, mode: TfMode) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let ratio = count as f32 / total as f32;
    match mode {
        TfMode::Raw => ratio,
        TfMode::Log if count > 0 => 1.0 + ratio.ln(),
        TfMode::Log => 0.0,
    }
}

/// Inverse document frequency of `term` in `vocabulary`.
pub fn idf(term: &str, vocabulary: &Vocabulary, smooth: bool) -> f32 {
    let df = vocabulary.document_frequency(term);
    let n = vocabulary.total_documents();
    if df == 0 || n == 0 {
        return 1.0;
    }
    let small_corpus = n < SMALL_CORPUS_THRESHOLD;
    let (n, df) = (n as f32, df as f32);

    if small_corpus {
        if smooth {
            ((n + 1.0) / (df + 1.0)).ln() + SMALL_CORPUS_IDF_OFFSET
        } else {
            ((n - df + 1.0) / n).max(MIN_UNSMOOTHED_IDF)
        }
    } else if smooth {
        (n / df).ln() + 1.0
    } else {
        (n / df).ln().max(MIN_UNSMOOTHED_IDF)
    }
}

/// Raw occurrence count of every n-gram in `text`.
pub fn term_counts(text: &ProcessedText) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for term in &text.ngrams {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Computes TF, IDF and blended weight vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfIdfEngine {
    pub mode: TfMode,
    pub smooth: bool,
}

impl Default for TfIdfEngine {
    fn default() -> Self {
        Self {
            mode: TfMode::Raw,
            smooth: true,
        }
    }
}

impl TfIdfEngine {
    pub fn new(mode: TfMode, smooth: bool) -> Self {
        Self { mode, smooth }
    }

    pub fn tf(&self, count: usize, total: usize) -> f32 {
        tf(count, total, self.mode)
    }

    pub fn idf(&self, term: &str, vocabulary: &Vocabulary) -> f32 {
        idf(term, vocabulary, self.smooth)
    }

    /// Vector of `weight * tf * idf + (1 - weight) * count` per vocabulary term.
    ///
    /// Terms absent from the text are 0. Entries are clamped at 0 (log TF
    /// goes negative for rare terms in long texts).
    pub fn weighted_vector(
        &self,
        text: &ProcessedText,
        vocabulary: &Vocabulary,
        weight: f32,
    ) -> Embedding {
        let mut vector = vec![0.0f32; vocabulary.len()];
        let total = text.ngrams.len();
        for (term, count) in term_counts(text) {
            if let Some(idx) = vocabulary.index_of(term) {
                let tfidf = self.tf(count, total) * self.idf(term, vocabulary);
                let value = weight * tfidf + (1.0 - weight) * count as f32;
                vector[idx] = value.max(0.0);
            }
        }
        vector
    }
}

/// Raw counts per vocabulary term.
pub fn bag_of_words(text: &ProcessedText, vocabulary: &Vocabulary) -> Embedding {
    let mut vector = vec![0.0f32; vocabulary.len()];
    for (term, count) in term_counts(text) {
        if let Some(idx) = vocabulary.index_of(term) {
            vector[idx] = count as f32;
        }
    }
    vector
}
