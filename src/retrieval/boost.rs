//! Metadata-driven score adjustment.
//!
//! A boost rescales a similarity score using chunk metadata only. Every
//! factor is multiplicative, so a zero score stays zero and a query with no
//! lexical overlap can never be boosted into a result.

use serde::{Deserialize, Serialize};

use crate::embedding::pipeline::ChunkMetadata;
use crate::text::Language;

/// Multiplier for chunks in the preferred language.
pub const LANGUAGE_MATCH_BOOST: f32 = 1.1;
/// Length multiplier at the optimal word count; falls linearly to
/// `LENGTH_BOOST_MAX - LENGTH_BOOST_RANGE` once the distance equals the optimum.
pub const LENGTH_BOOST_MAX: f32 = 1.1;
pub const LENGTH_BOOST_RANGE: f32 = 0.2;
/// Largest n-gram richness bonus (×1.05).
pub const RICHNESS_BONUS_MAX: f32 = 0.05;
pub const DEFAULT_OPTIMAL_WORD_COUNT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    /// Preferred chunk language. `None` prefers the query's own language.
    pub preferred_language: Option<Language>,
    pub optimal_word_count: usize,
}

impl Default for BoostConfig {
    fn default() -> Self {
        Self {
            preferred_language: None,
            optimal_word_count: DEFAULT_OPTIMAL_WORD_COUNT,
        }
    }
}

impl BoostConfig {
    /// Combined multiplier for a chunk. Always within
    /// `[0.9, 1.1 * 1.1 * 1.05]`.
    pub fn multiplier(&self, metadata: &ChunkMetadata, query_language: Language) -> f32 {
        self.language_factor(metadata, query_language)
            * self.length_factor(metadata)
            * richness_factor(metadata)
    }

    /// Rescale `score`. The result is not clamped; callers clamp.
    pub fn apply(&self, score: f32, metadata: &ChunkMetadata, query_language: Language) -> f32 {
        score * self.multiplier(metadata, query_language)
    }

    fn language_factor(&self, metadata: &ChunkMetadata, query_language: Language) -> f32 {
        let preferred = self.preferred_language.unwrap_or(query_language);
        if metadata.language == preferred {
            LANGUAGE_MATCH_BOOST
        } else {
            1.0
        }
    }

    fn length_factor(&self, metadata: &ChunkMetadata) -> f32 {
        let optimal = self.optimal_word_count.max(1) as f32;
        let distance = (metadata.word_count as f32 - optimal).abs() / optimal;
        LENGTH_BOOST_MAX - LENGTH_BOOST_RANGE * distance.min(1.0)
    }
}

/// Bonus for chunks whose n-gram expansion adds terms beyond their words.
fn richness_factor(metadata: &ChunkMetadata) -> f32 {
    if metadata.word_count == 0 {
        return 1.0;
    }
    let extra = metadata.ngram_count.saturating_sub(metadata.word_count) as f32;
    let ratio = (extra / metadata.word_count as f32).min(1.0);
    1.0 + RICHNESS_BONUS_MAX * ratio
}
