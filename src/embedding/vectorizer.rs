//! Vectorizers: TF-IDF or bag-of-words, chosen once at construction.
//!
//! Both variants sit behind the same trait so the pipeline and the retriever
//! never branch on the weighting scheme.

use serde::{Deserialize, Serialize};

use super::tfidf::{bag_of_words, TfIdfEngine};
use super::vocabulary::Vocabulary;
use super::Embedding;
use crate::config::EmbeddingConfig;
use crate::text::ProcessedText;

/// Which weighting a vectorizer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorizerKind {
    TfIdf,
    BagOfWords,
}

/// Turns processed text into a vector aligned to a vocabulary.
pub trait Vectorizer: Send + Sync {
    /// Vectorize `text`. Output length is always `vocabulary.len()`.
    fn vectorize(&self, text: &ProcessedText, vocabulary: &Vocabulary) -> Embedding;
    fn kind(&self) -> VectorizerKind;
}

/// Blended TF-IDF weights.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    engine: TfIdfEngine,
    weight: f32,
}

impl TfIdfVectorizer {
    pub fn new(engine: TfIdfEngine, weight: f32) -> Self {
        Self {
            engine,
            weight: weight.clamp(0.0, 1.0),
        }
    }
}

impl Vectorizer for TfIdfVectorizer {
    fn vectorize(&self, text: &ProcessedText, vocabulary: &Vocabulary) -> Embedding {
        self.engine.weighted_vector(text, vocabulary, self.weight)
    }

    fn kind(&self) -> VectorizerKind {
        VectorizerKind::TfIdf
    }
}

/// Raw term counts.
#[derive(Debug, Clone, Default)]
pub struct BagOfWordsVectorizer;

impl Vectorizer for BagOfWordsVectorizer {
    fn vectorize(&self, text: &ProcessedText, vocabulary: &Vocabulary) -> Embedding {
        bag_of_words(text, vocabulary)
    }

    fn kind(&self) -> VectorizerKind {
        VectorizerKind::BagOfWords
    }
}

/// Pick the vectorizer for `config` (`enable_tfidf` is the capability flag).
pub fn vectorizer_for(config: &EmbeddingConfig) -> Box<dyn Vectorizer> {
    if config.enable_tfidf {
        Box::new(TfIdfVectorizer::new(
            TfIdfEngine::new(config.tf_mode, config.smooth_idf),
            config.tfidf_weight,
        ))
    } else {
        Box::new(BagOfWordsVectorizer)
    }
}
