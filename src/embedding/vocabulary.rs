//! Corpus vocabulary: term index plus document frequencies.
//!
//! Built in one pass from every chunk of a corpus snapshot and immutable
//! afterwards. There is no incremental update: when the chunk set changes
//! the vocabulary is rebuilt, and the rebuild is deterministic.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EmbeddingConfig, DEFAULT_MAX_VOCABULARY_SIZE, DEFAULT_MIN_DOCUMENT_FREQUENCY};
use crate::error::ProcessingWarning;
use crate::text::ProcessedText;

/// Below this many documents, term extraction stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 64;

/// A stored vocabulary that violates the vocabulary invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VocabularyError {
    #[error("term '{0}' appears more than once")]
    DuplicateTerm(String),

    #[error("term '{0}' has no document frequency")]
    MissingFrequency(String),

    #[error("document frequency recorded for unknown term '{0}'")]
    UnknownTerm(String),

    #[error("term '{term}' has document frequency {df}, expected 1..={total}")]
    FrequencyOutOfRange { term: String, df: usize, total: usize },
}

/// Index-stable term set with document frequencies.
///
/// `terms[i]` is dimension `i` of every vector built against this vocabulary.
/// The serialized form omits the term index; it is rebuilt and checked on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredVocabulary", into = "StoredVocabulary")]
pub struct Vocabulary {
    terms: Vec<String>,
    term_to_index: HashMap<String, usize>,
    document_frequency: HashMap<String, usize>,
    total_documents: usize,
}

#[derive(Serialize, Deserialize)]
struct StoredVocabulary {
    terms: Vec<String>,
    document_frequency: HashMap<String, usize>,
    total_documents: usize,
}

impl TryFrom<StoredVocabulary> for Vocabulary {
    type Error = VocabularyError;

    fn try_from(stored: StoredVocabulary) -> Result<Self, Self::Error> {
        Vocabulary::from_parts(stored.terms, stored.document_frequency, stored.total_documents)
    }
}

impl From<Vocabulary> for StoredVocabulary {
    fn from(vocabulary: Vocabulary) -> Self {
        Self {
            terms: vocabulary.terms,
            document_frequency: vocabulary.document_frequency,
            total_documents: vocabulary.total_documents,
        }
    }
}

impl Vocabulary {
    /// An empty vocabulary over zero documents.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuild a vocabulary from its stored parts, checking every invariant.
    pub fn from_parts(
        terms: Vec<String>,
        document_frequency: HashMap<String, usize>,
        total_documents: usize,
    ) -> Result<Self, VocabularyError> {
        let mut term_to_index = HashMap::with_capacity(terms.len());
        for (index, term) in terms.iter().enumerate() {
            if term_to_index.insert(term.clone(), index).is_some() {
                return Err(VocabularyError::DuplicateTerm(term.clone()));
            }
            match document_frequency.get(term) {
                None => return Err(VocabularyError::MissingFrequency(term.clone())),
                Some(&df) if df == 0 || df > total_documents => {
                    return Err(VocabularyError::FrequencyOutOfRange {
                        term: term.clone(),
                        df,
                        total: total_documents,
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(unknown) = document_frequency.keys().find(|t| !term_to_index.contains_key(*t)) {
            return Err(VocabularyError::UnknownTerm(unknown.clone()));
        }

        Ok(Self {
            terms,
            term_to_index,
            document_frequency,
            total_documents,
        })
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn total_documents(&self) -> usize {
        self.total_documents
    }

    /// Vector dimension of `term`, if it is in the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.term_to_index.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.term_to_index.contains_key(term)
    }

    /// Document frequency of `term`; 0 when absent.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }
}

/// Builds a `Vocabulary` from processed chunks.
#[derive(Debug, Clone)]
pub struct VocabularyBuilder {
    min_document_frequency: usize,
    max_vocabulary_size: usize,
}

impl Default for VocabularyBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DOCUMENT_FREQUENCY, DEFAULT_MAX_VOCABULARY_SIZE)
    }
}

impl VocabularyBuilder {
    /// Zero limits are treated as 1.
    pub fn new(min_document_frequency: usize, max_vocabulary_size: usize) -> Self {
        Self {
            min_document_frequency: min_document_frequency.max(1),
            max_vocabulary_size: max_vocabulary_size.max(1),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(
            config.min_document_frequency,
            config.processing_limits.max_vocabulary_size,
        )
    }

    /// Build the vocabulary over `documents`.
    pub fn build(&self, documents: &[ProcessedText]) -> Vocabulary {
        self.build_with_warnings(documents).0
    }

    /// Build the vocabulary and report truncation, if any.
    pub fn build_with_warnings(
        &self,
        documents: &[ProcessedText],
    ) -> (Vocabulary, Option<ProcessingWarning>) {
        if documents.is_empty() {
            return (Vocabulary::empty(), None);
        }

        // Distinct terms per document, in first-occurrence order.
        let term_sets: Vec<Vec<&str>> = if documents.len() >= PARALLEL_THRESHOLD {
            documents.par_iter().map(distinct_terms).collect()
        } else {
            documents.iter().map(distinct_terms).collect()
        };

        // Reduction: one increment per document per term. `order` keeps
        // first-seen order for tie-breaking.
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for set in &term_sets {
            for &term in set {
                let count = counts.entry(term).or_insert_with(|| {
                    order.push(term);
                    0
                });
                *count += 1;
            }
        }

        let mut survivors: Vec<(&str, usize)> = order
            .into_iter()
            .map(|term| (term, counts[term]))
            .filter(|&(_, df)| df >= self.min_document_frequency)
            .collect();

        // Stable: equal frequencies keep first-seen order.
        survivors.sort_by(|a, b| b.1.cmp(&a.1));

        let candidates = survivors.len();
        let warning = if candidates > self.max_vocabulary_size {
            survivors.truncate(self.max_vocabulary_size);
            Some(ProcessingWarning::VocabularyTruncated {
                candidates,
                kept: self.max_vocabulary_size,
            })
        } else {
            None
        };

        let mut vocabulary = Vocabulary {
            terms: Vec::with_capacity(survivors.len()),
            term_to_index: HashMap::with_capacity(survivors.len()),
            document_frequency: HashMap::with_capacity(survivors.len()),
            total_documents: documents.len(),
        };
        for (index, (term, df)) in survivors.into_iter().enumerate() {
            vocabulary.terms.push(term.to_string());
            vocabulary.term_to_index.insert(term.to_string(), index);
            vocabulary.document_frequency.insert(term.to_string(), df);
        }

        debug!(
            documents = vocabulary.total_documents,
            candidates,
            terms = vocabulary.len(),
            "vocabulary built"
        );
        (vocabulary, warning)
    }
}

fn distinct_terms(document: &ProcessedText) -> Vec<&str> {
    let mut seen = HashSet::new();
    document
        .ngrams
        .iter()
        .map(|t| t.as_str())
        .filter(|t| seen.insert(*t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Language;

    fn doc(terms: &[&str]) -> ProcessedText {
        let words: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        ProcessedText {
            ngrams: words.clone(),
            words,
            language: Language::English,
        }
    }

    #[test]
    fn empty_corpus_gives_empty_vocabulary() {
        let vocab = VocabularyBuilder::default().build(&[]);
        assert!(vocab.is_empty());
        assert_eq!(vocab.total_documents(), 0);
        assert_eq!(vocab, Vocabulary::empty());
    }

    #[test]
    fn document_frequency_counts_once_per_document() {
        let docs = vec![doc(&["api", "api", "api", "key"]), doc(&["api"])];
        let vocab = VocabularyBuilder::default().build(&docs);
        assert_eq!(vocab.document_frequency("api"), 2);
        assert_eq!(vocab.document_frequency("key"), 1);
        assert_eq!(vocab.document_frequency("missing"), 0);
        assert_eq!(vocab.total_documents(), 2);
    }

    #[test]
    fn sorted_by_frequency_then_first_seen() {
        let docs = vec![
            doc(&["zeta", "alpha", "shared"]),
            doc(&["beta", "shared"]),
            doc(&["shared", "beta"]),
        ];
        let vocab = VocabularyBuilder::default().build(&docs);
        assert_eq!(vocab.terms(), &["shared", "beta", "zeta", "alpha"]);
        for (i, term) in vocab.terms().iter().enumerate() {
            assert_eq!(vocab.index_of(term), Some(i));
        }
    }

    #[test]
    fn min_document_frequency_drops_singletons() {
        let docs = vec![
            doc(&["api", "gateway", "timeout"]),
            doc(&["api", "database", "index"]),
        ];
        let vocab = VocabularyBuilder::new(2, 100).build(&docs);
        assert_eq!(vocab.terms(), &["api"]);
        assert!(!vocab.contains("gateway"));
        assert!(!vocab.contains("index"));
    }

    #[test]
    fn truncates_to_max_size_and_reports() {
        let docs = vec![doc(&["a", "b", "c"]), doc(&["a", "b"]), doc(&["a"])];
        let (vocab, warning) = VocabularyBuilder::new(1, 2).build_with_warnings(&docs);
        assert_eq!(vocab.terms(), &["a", "b"]);
        assert_eq!(
            warning,
            Some(ProcessingWarning::VocabularyTruncated {
                candidates: 3,
                kept: 2
            })
        );
    }

    #[test]
    fn invariants_hold() {
        let docs = vec![
            doc(&["x", "y", "x y"]),
            doc(&["y", "z", "y z"]),
            doc(&["x", "z"]),
        ];
        let vocab = VocabularyBuilder::default().build(&docs);
        assert_eq!(vocab.terms().len(), vocab.len());
        for term in vocab.terms() {
            let df = vocab.document_frequency(term);
            assert!(df >= 1 && df <= vocab.total_documents());
        }
    }

    #[test]
    fn stored_form_reloads_with_index() {
        let docs = vec![doc(&["api", "key"]), doc(&["api"])];
        let vocab = VocabularyBuilder::default().build(&docs);
        let json = serde_json::to_string(&vocab).unwrap();
        assert!(!json.contains("term_to_index"));
        let loaded: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, vocab);
        assert_eq!(loaded.index_of("key"), Some(1));
    }

    #[test]
    fn corrupt_stored_vocabulary_is_rejected() {
        let cases = [
            // Stale index from an older layout is ignored, but the frequency is missing
            r#"{"terms":["dog"],"term_to_index":{"dog":7},"document_frequency":{},"total_documents":1}"#,
            r#"{"terms":["dog","dog"],"document_frequency":{"dog":1},"total_documents":1}"#,
            r#"{"terms":["dog"],"document_frequency":{"dog":3},"total_documents":1}"#,
            r#"{"terms":["dog"],"document_frequency":{"dog":0},"total_documents":1}"#,
            r#"{"terms":["dog"],"document_frequency":{"dog":1,"cat":1},"total_documents":1}"#,
        ];
        for json in cases {
            assert!(serde_json::from_str::<Vocabulary>(json).is_err(), "{json}");
        }

        assert_eq!(
            Vocabulary::from_parts(vec!["a".into(), "a".into()], HashMap::from([("a".into(), 1)]), 1),
            Err(VocabularyError::DuplicateTerm("a".into()))
        );
    }

    #[test]
    fn parallel_and_serial_paths_agree() {
        let docs: Vec<ProcessedText> = (0..PARALLEL_THRESHOLD * 2)
            .map(|i| {
                let a = format!("term{}", i % 7);
                let b = format!("term{}", i % 11);
                doc(&[a.as_str(), b.as_str(), "common"])
            })
            .collect();
        let builder = VocabularyBuilder::default();
        let parallel = builder.build(&docs);
        let serial = builder.build(&docs[..PARALLEL_THRESHOLD - 1]);
        assert_eq!(parallel.terms()[0], "common");
        assert_eq!(serial.terms()[0], "common");
        // Deterministic across rebuilds
        assert_eq!(parallel, builder.build(&docs));
    }
}
