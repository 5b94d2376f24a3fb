//! Similarity-ranked retrieval over embedded chunks.
//!
//! The query is vectorized against the same vocabulary and config that
//! produced the chunk vectors, scored by cosine similarity, optionally
//! boosted by chunk metadata, then filtered and truncated.

pub mod boost;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EmbeddingConfig;
use crate::diagnostics::{default_sink, DiagnosticEvent, DiagnosticsSink};
use crate::embedding::pipeline::{ChunkMetadata, EmbeddedChunk, EmbeddingOutput};
use crate::embedding::vectorizer::{vectorizer_for, Vectorizer};
use crate::embedding::vocabulary::Vocabulary;
use crate::embedding::{cosine_similarity, is_zero_vector, Embedding};
use crate::text::{Language, TextProcessor};

pub use boost::BoostConfig;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.0;
/// Highest accepted similarity floor; a floor of 1.0 could never match.
const MAX_MIN_SIMILARITY: f32 = 1.0 - f32::EPSILON;

/// Per-query options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalOptions {
    /// Maximum results. 0 returns nothing.
    pub top_k: usize,
    /// Results must score strictly above this.
    pub min_similarity: f32,
    pub boost: Option<BoostConfig>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
            boost: None,
        }
    }
}

impl RetrievalOptions {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn with_boost(mut self, boost: BoostConfig) -> Self {
        self.boost = Some(boost);
        self
    }

    /// Clamp `min_similarity` into `[0, 1)`; NaN becomes the default.
    pub fn sanitize(&self) -> Self {
        let min_similarity = if self.min_similarity.is_nan() {
            DEFAULT_MIN_SIMILARITY
        } else {
            self.min_similarity.clamp(0.0, MAX_MIN_SIMILARITY)
        };
        Self {
            min_similarity,
            ..self.clone()
        }
    }
}

/// One retrieval hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedChunk {
    pub text: String,
    /// Final score after boosting, at most 1.0.
    pub similarity: f32,
    /// Cosine similarity before boosting.
    pub raw_similarity: f32,
    pub metadata: ChunkMetadata,
}

/// Ranks chunks against queries.
///
/// Build it from the config the chunks were embedded with (`EmbeddingOutput::config`),
/// otherwise query terms are normalized differently from chunk terms.
pub struct Retriever {
    processor: TextProcessor,
    vectorizer: Box<dyn Vectorizer>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl Retriever {
    pub fn new(config: &EmbeddingConfig) -> Self {
        let (config, _) = config.sanitize();
        Self {
            processor: TextProcessor::from_config(&config),
            vectorizer: vectorizer_for(&config),
            sink: default_sink(),
        }
    }

    /// Retriever matching a pipeline run. Queries whose language cannot be
    /// detected are normalized as the corpus's dominant language.
    pub fn for_output(output: &EmbeddingOutput) -> Self {
        let retriever = Self::new(&output.config);
        match output.dominant_language() {
            Some(language) => retriever.with_fallback_language(language),
            None => retriever,
        }
    }

    /// Language assumed for queries without a detectable language.
    pub fn with_fallback_language(mut self, language: Language) -> Self {
        self.processor = self.processor.with_fallback_language(language);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Vectorize `query` against `vocabulary`. Out-of-vocabulary terms
    /// contribute nothing.
    pub fn query_vector(&self, query: &str, vocabulary: &Vocabulary) -> (Embedding, Language) {
        let processed = self.processor.process(query);
        let vector = self.vectorizer.vectorize(&processed, vocabulary);
        (vector, processed.language)
    }

    /// Rank `chunks` against `query`, best first.
    pub fn rank(
        &self,
        query: &str,
        chunks: &[EmbeddedChunk],
        vocabulary: &Vocabulary,
        options: &RetrievalOptions,
    ) -> Vec<RankedChunk> {
        let started = Instant::now();
        let ranked = self.rank_inner(query, chunks, vocabulary, &options.sanitize());
        self.sink.record(&DiagnosticEvent::new(
            "rank",
            started.elapsed(),
            chunks.len(),
            ranked.len(),
        ));
        ranked
    }

    /// Like `rank`, returning only the chunk texts.
    pub fn retrieve_texts(
        &self,
        query: &str,
        chunks: &[EmbeddedChunk],
        vocabulary: &Vocabulary,
        options: &RetrievalOptions,
    ) -> Vec<String> {
        self.rank(query, chunks, vocabulary, options)
            .into_iter()
            .map(|r| r.text)
            .collect()
    }

    fn rank_inner(
        &self,
        query: &str,
        chunks: &[EmbeddedChunk],
        vocabulary: &Vocabulary,
        options: &RetrievalOptions,
    ) -> Vec<RankedChunk> {
        if options.top_k == 0 || chunks.is_empty() {
            return Vec::new();
        }

        let (query_vector, query_language) = self.query_vector(query, vocabulary);
        // Must run before any scoring or boosting.
        if is_zero_vector(&query_vector) {
            debug!("query has no terms in the vocabulary");
            return Vec::new();
        }

        let mut ranked: Vec<RankedChunk> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let raw = match cosine_similarity(&query_vector, &chunk.vector) {
                Ok(score) => score,
                Err(e) => {
                    warn!(position = chunk.metadata.position, "skipping chunk: {e}");
                    continue;
                }
            };
            let boosted = match options.boost {
                Some(ref boost) => boost.apply(raw, &chunk.metadata, query_language),
                None => raw,
            };
            ranked.push(RankedChunk {
                text: chunk.text.clone(),
                similarity: boosted.min(1.0),
                raw_similarity: raw,
                metadata: chunk.metadata.clone(),
            });
        }

        // Stable: equal scores keep input order.
        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        ranked.retain(|r| r.similarity > options.min_similarity);
        ranked.truncate(options.top_k);
        ranked
    }
}
