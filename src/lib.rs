//! Lexical retrieval core.
//!
//! Documents are split into sentence chunks, normalized (tokenize, detect
//! language, drop stopwords, stem, expand n-grams) and vectorized against a
//! shared vocabulary with TF-IDF or bag-of-words weights. Queries are ranked
//! by cosine similarity with optional metadata boosts. Everything is local
//! and deterministic; there is no embedding service.
//!
//! ```no_run
//! use lexrag::{EmbeddingConfig, EmbeddingPipeline, RetrievalOptions, Retriever};
//!
//! let pipeline = EmbeddingPipeline::new(&EmbeddingConfig::default());
//! let output = pipeline.generate_embeddings("The cat sat. The dog ate.");
//! let retriever = Retriever::for_output(&output);
//! let hits = retriever.rank("dog", &output.chunks, &output.vocabulary, &RetrievalOptions::default());
//! ```

pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod embedding;
pub mod error;
pub mod retrieval;
pub mod text;

pub use config::{ConfigError, EmbeddingConfig, EmbeddingConfigOverride, ProcessingLimits};
pub use corpus::{Corpus, CorpusHit};
pub use diagnostics::{DiagnosticEvent, DiagnosticsSink, MemorySink, NullSink, TracingSink};
pub use embedding::pipeline::{ChunkMetadata, EmbeddedChunk, EmbeddingOutput, EmbeddingPipeline};
pub use embedding::tfidf::TfMode;
pub use embedding::tuning::CorpusStats;
pub use embedding::vocabulary::{Vocabulary, VocabularyError};
pub use embedding::{cosine_similarity, Embedding};
pub use error::{EmbeddingError, EmbeddingResult, ProcessingWarning};
pub use retrieval::{BoostConfig, RankedChunk, RetrievalOptions, Retriever};
pub use text::{Language, ProcessedText, TextProcessor};
