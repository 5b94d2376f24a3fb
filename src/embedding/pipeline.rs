//! Embedding pipeline: text in, one vector per chunk out.
//!
//! Chunk → normalize → build one shared vocabulary → vectorize. Chunks whose
//! vector is all zeros carry no retrievable signal and are dropped. The
//! pipeline is synchronous; a run is bounded by its input size, and the
//! wall-clock budget only degrades the remaining chunks to unigrams.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::chunker;
use super::tuning;
use super::vectorizer::vectorizer_for;
use super::vocabulary::{Vocabulary, VocabularyBuilder};
use super::{is_zero_vector, Embedding};
use crate::config::{ConfigError, EmbeddingConfig};
use crate::diagnostics::{default_sink, DiagnosticEvent, DiagnosticsSink};
use crate::error::ProcessingWarning;
use crate::text::{Language, ProcessedText, TextProcessor};

/// Per-chunk facts recorded at embedding time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub language: Language,
    /// Words after stopword removal and stemming.
    pub word_count: usize,
    pub ngram_count: usize,
    pub processing_time_ms: u64,
    /// Index of the chunk in the pipeline's input, before zero-vector chunks
    /// were dropped.
    pub position: usize,
}

/// A chunk with its vector. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub text: String,
    pub vector: Embedding,
    pub metadata: ChunkMetadata,
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub chunks: Vec<EmbeddedChunk>,
    pub vocabulary: Vocabulary,
    /// The config the run actually used (sanitized, possibly auto-tuned).
    /// Queries against these chunks must be vectorized with it.
    pub config: EmbeddingConfig,
    pub config_errors: Vec<ConfigError>,
    pub warnings: Vec<ProcessingWarning>,
}

impl EmbeddingOutput {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }

    /// Most common chunk language; ties go to the earlier entry of
    /// `Language::ALL`. `None` when there are no chunks.
    pub fn dominant_language(&self) -> Option<Language> {
        if self.chunks.is_empty() {
            return None;
        }
        let mut best = None;
        let mut best_count = 0;
        for &language in Language::ALL {
            let count = self
                .chunks
                .iter()
                .filter(|c| c.metadata.language == language)
                .count();
            if count > best_count {
                best = Some(language);
                best_count = count;
            }
        }
        best
    }
}

/// Turns raw text (or pre-split chunks) into chunk vectors.
pub struct EmbeddingPipeline {
    config: EmbeddingConfig,
    config_errors: Vec<ConfigError>,
    sink: Arc<dyn DiagnosticsSink>,
}

impl EmbeddingPipeline {
    /// Create a pipeline. The config is sanitized; rejected fields are
    /// available from `config_errors()` and on every output.
    pub fn new(config: &EmbeddingConfig) -> Self {
        let (config, config_errors) = config.sanitize();
        Self {
            config,
            config_errors,
            sink: default_sink(),
        }
    }

    /// Replace the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    pub fn config_errors(&self) -> &[ConfigError] {
        &self.config_errors
    }

    /// Chunk `text` by sentences and embed every chunk.
    pub fn generate_embeddings(&self, text: &str) -> EmbeddingOutput {
        let started = Instant::now();
        let chunks = chunker::chunk_text(text, self.config.processing_limits.max_chunk_size)
            .into_iter()
            .enumerate()
            .collect();
        self.run(chunks, started, "generate_embeddings")
    }

    /// Embed pre-split chunks, one chunk per input string (trimmed; blank
    /// entries skipped).
    pub fn embed_chunks<S: AsRef<str>>(&self, chunks: &[S]) -> EmbeddingOutput {
        let started = Instant::now();
        let chunks = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.as_ref().trim().to_string()))
            .filter(|(_, c)| !c.is_empty())
            .collect();
        self.run(chunks, started, "embed_chunks")
    }

    fn run(
        &self,
        chunks: Vec<(usize, String)>,
        started: Instant,
        operation: &'static str,
    ) -> EmbeddingOutput {
        let input_size = chunks.len();
        let mut warnings = Vec::new();

        if chunks.is_empty() {
            debug!("no text to embed");
            warnings.push(ProcessingWarning::EmptyInput);
            self.sink
                .record(&DiagnosticEvent::new(operation, started.elapsed(), 0, 0));
            return EmbeddingOutput {
                chunks: Vec::new(),
                vocabulary: Vocabulary::empty(),
                config: self.config.clone(),
                config_errors: self.config_errors.clone(),
                warnings,
            };
        }

        let config = if self.config.auto_tune {
            let texts: Vec<&str> = chunks.iter().map(|(_, t)| t.as_str()).collect();
            let tuned = tuning::tune(&self.config, &texts);
            if tuned != self.config {
                info!(
                    ngram_sizes = ?tuned.ngram_sizes,
                    tfidf_weight = tuned.tfidf_weight,
                    stemming = tuned.enable_stemming,
                    "auto-tuned embedding config"
                );
            }
            tuned
        } else {
            self.config.clone()
        };

        let (_, dropped) = config.effective_ngram_sizes();
        if !dropped.is_empty() {
            let max = config.processing_limits.max_ngram_size;
            warn!("n-gram sizes {dropped:?} exceed max_ngram_size {max}");
            warnings.push(ProcessingWarning::NgramSizeCapped {
                requested: dropped,
                max,
            });
        }

        let processor = TextProcessor::from_config(&config);
        let limit_ms = config.processing_limits.max_processing_time_ms;
        let limit = Duration::from_millis(limit_ms);

        let mut degraded = 0usize;
        let mut processed: Vec<ProcessedText> = Vec::with_capacity(chunks.len());
        let mut timings: Vec<Duration> = Vec::with_capacity(chunks.len());
        for (_, text) in &chunks {
            let chunk_started = Instant::now();
            let p = if started.elapsed() > limit {
                degraded += 1;
                processor.process_unigrams(text)
            } else {
                processor.process(text)
            };
            timings.push(chunk_started.elapsed());
            processed.push(p);
        }

        let (vocabulary, truncated) =
            VocabularyBuilder::from_config(&config).build_with_warnings(&processed);
        if let Some(w) = truncated {
            warn!("{w}");
            warnings.push(w);
        }

        let vectorizer = vectorizer_for(&config);
        let mut embedded = Vec::with_capacity(chunks.len());
        for (((position, text), p), elapsed) in chunks.into_iter().zip(&processed).zip(timings) {
            let vector_started = Instant::now();
            let vector = vectorizer.vectorize(p, &vocabulary);
            if is_zero_vector(&vector) {
                debug!(position, "dropping chunk without vocabulary terms");
                continue;
            }
            let processing_time = elapsed + vector_started.elapsed();
            embedded.push(EmbeddedChunk {
                text,
                vector,
                metadata: ChunkMetadata {
                    language: p.language,
                    word_count: p.words.len(),
                    ngram_count: p.ngrams.len(),
                    processing_time_ms: processing_time.as_millis() as u64,
                    position,
                },
            });
        }

        let elapsed = started.elapsed();
        if degraded > 0 {
            let w = ProcessingWarning::BudgetExceeded {
                elapsed_ms: elapsed.as_millis() as u64,
                limit_ms,
                degraded_chunks: degraded,
            };
            warn!("{w}");
            warnings.push(w);
        }

        info!(
            chunks = embedded.len(),
            dropped = input_size - embedded.len(),
            terms = vocabulary.len(),
            "embeddings generated"
        );
        self.sink.record(&DiagnosticEvent::new(
            operation,
            elapsed,
            input_size,
            embedded.len(),
        ));

        EmbeddingOutput {
            chunks: embedded,
            vocabulary,
            config,
            config_errors: self.config_errors.clone(),
            warnings,
        }
    }
}

impl Default for EmbeddingPipeline {
    fn default() -> Self {
        Self::new(&EmbeddingConfig::default())
    }
}
