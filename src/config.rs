//! Embedding configuration: defaults, field-by-field validation, overrides.
//!
//! Configuration is an explicit struct owned by the caller. Out-of-range
//! fields are never accepted silently: `sanitize()` rejects them one by one,
//! substitutes the default for each rejected field, and reports the list.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::embedding::tfidf::TfMode;
use crate::error::{EmbeddingError, EmbeddingResult};
use crate::text::Language;

/// Smallest and largest n-gram size the generator accepts.
pub const MIN_NGRAM_SIZE: usize = 1;
pub const MAX_NGRAM_SIZE: usize = 5;

pub const DEFAULT_NGRAM_SIZES: [usize; 2] = [1, 2];
pub const DEFAULT_TFIDF_WEIGHT: f32 = 0.7;
pub const DEFAULT_MIN_DOCUMENT_FREQUENCY: usize = 1;
pub const DEFAULT_MAX_VOCABULARY_SIZE: usize = 10_000;
pub const DEFAULT_MAX_NGRAM_SIZE: usize = 3;
pub const DEFAULT_MAX_PROCESSING_TIME_MS: u64 = 30_000;
/// Characters per chunk.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1_000;

/// A single rejected configuration field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("tfidf_weight {0} outside [0, 1]")]
    TfidfWeight(f32),

    #[error("ngram_sizes contains {0}, expected values in [1, 5]")]
    NgramSize(usize),

    #[error("ngram_sizes is empty")]
    EmptyNgramSizes,

    #[error("min_document_frequency must be positive")]
    MinDocumentFrequency,

    #[error("max_vocabulary_size must be positive")]
    MaxVocabularySize,

    #[error("max_ngram_size {0} outside [1, 5]")]
    MaxNgramSize(usize),

    #[error("max_processing_time_ms must be positive")]
    MaxProcessingTime,

    #[error("max_chunk_size {0} must be positive")]
    MaxChunkSize(usize),
}

/// Hard limits on a single embedding run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingLimits {
    pub max_vocabulary_size: usize,
    pub max_ngram_size: usize,
    pub max_processing_time_ms: u64,
    pub max_chunk_size: usize,
}

impl Default for ProcessingLimits {
    fn default() -> Self {
        Self {
            max_vocabulary_size: DEFAULT_MAX_VOCABULARY_SIZE,
            max_ngram_size: DEFAULT_MAX_NGRAM_SIZE,
            max_processing_time_ms: DEFAULT_MAX_PROCESSING_TIME_MS,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }
}

/// Configuration for text processing, vocabulary building and vectorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// TF-IDF weighting; `false` selects plain bag-of-words counts.
    pub enable_tfidf: bool,
    pub enable_stemming: bool,
    pub enable_stopword_removal: bool,
    /// N-gram sizes, emitted in this order.
    pub ngram_sizes: Vec<usize>,
    /// Blend between TF-IDF (1.0) and raw counts (0.0).
    pub tfidf_weight: f32,
    /// Declared language. `None` detects per chunk.
    pub language: Option<Language>,
    pub tf_mode: TfMode,
    pub smooth_idf: bool,
    /// Terms seen in fewer chunks than this are dropped from the vocabulary.
    pub min_document_frequency: usize,
    /// Apply the content heuristics in `embedding::tuning` before processing.
    pub auto_tune: bool,
    pub processing_limits: ProcessingLimits,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enable_tfidf: true,
            enable_stemming: true,
            enable_stopword_removal: true,
            ngram_sizes: DEFAULT_NGRAM_SIZES.to_vec(),
            tfidf_weight: DEFAULT_TFIDF_WEIGHT,
            language: None,
            tf_mode: TfMode::Raw,
            smooth_idf: true,
            min_document_frequency: DEFAULT_MIN_DOCUMENT_FREQUENCY,
            auto_tune: false,
            processing_limits: ProcessingLimits::default(),
        }
    }
}

impl EmbeddingConfig {
    /// Parse a config from YAML. Missing fields take their defaults.
    ///
    /// The result is not sanitized; call `sanitize()` before use.
    pub fn from_yaml_str(yaml: &str) -> EmbeddingResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config file from disk.
    pub fn load(path: &Path) -> EmbeddingResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Validate every field. Rejected fields fall back to their default;
    /// accepted fields are kept as-is.
    pub fn sanitize(&self) -> (EmbeddingConfig, Vec<ConfigError>) {
        let defaults = EmbeddingConfig::default();
        let mut config = self.clone();
        let mut errors = Vec::new();

        if !(0.0..=1.0).contains(&config.tfidf_weight) {
            errors.push(ConfigError::TfidfWeight(config.tfidf_weight));
            config.tfidf_weight = defaults.tfidf_weight;
        }

        if config.ngram_sizes.is_empty() {
            errors.push(ConfigError::EmptyNgramSizes);
            config.ngram_sizes = defaults.ngram_sizes.clone();
        } else {
            // Sizes form a set; keep first occurrence order.
            let mut seen = Vec::with_capacity(config.ngram_sizes.len());
            for n in &config.ngram_sizes {
                if !seen.contains(n) {
                    seen.push(*n);
                }
            }
            let bad: Vec<usize> = seen
                .iter()
                .copied()
                .filter(|n| !(MIN_NGRAM_SIZE..=MAX_NGRAM_SIZE).contains(n))
                .collect();
            if bad.is_empty() {
                config.ngram_sizes = seen;
            } else {
                errors.extend(bad.into_iter().map(ConfigError::NgramSize));
                config.ngram_sizes = defaults.ngram_sizes.clone();
            }
        }

        if config.min_document_frequency == 0 {
            errors.push(ConfigError::MinDocumentFrequency);
            config.min_document_frequency = defaults.min_document_frequency;
        }

        let limits = &mut config.processing_limits;
        if limits.max_vocabulary_size == 0 {
            errors.push(ConfigError::MaxVocabularySize);
            limits.max_vocabulary_size = defaults.processing_limits.max_vocabulary_size;
        }
        if !(MIN_NGRAM_SIZE..=MAX_NGRAM_SIZE).contains(&limits.max_ngram_size) {
            errors.push(ConfigError::MaxNgramSize(limits.max_ngram_size));
            limits.max_ngram_size = defaults.processing_limits.max_ngram_size;
        }
        if limits.max_processing_time_ms == 0 {
            errors.push(ConfigError::MaxProcessingTime);
            limits.max_processing_time_ms = defaults.processing_limits.max_processing_time_ms;
        }
        if limits.max_chunk_size == 0 {
            errors.push(ConfigError::MaxChunkSize(limits.max_chunk_size));
            limits.max_chunk_size = defaults.processing_limits.max_chunk_size;
        }

        for e in &errors {
            warn!("rejected config field: {e}");
        }
        (config, errors)
    }

    /// Strict variant of `sanitize()`: any rejected field is an error.
    pub fn validate(&self) -> EmbeddingResult<()> {
        let (_, errors) = self.sanitize();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EmbeddingError::Configuration(errors))
        }
    }

    /// Reason strings for every rejected field (empty when valid).
    pub fn validation_messages(&self) -> Vec<String> {
        self.sanitize().1.iter().map(|e| e.to_string()).collect()
    }

    /// N-gram sizes that respect `max_ngram_size`, plus the sizes that were dropped.
    ///
    /// Never returns an empty size list: if every size is above the cap,
    /// unigrams are used.
    pub fn effective_ngram_sizes(&self) -> (Vec<usize>, Vec<usize>) {
        let max = self.processing_limits.max_ngram_size;
        let (kept, dropped): (Vec<usize>, Vec<usize>) =
            self.ngram_sizes.iter().copied().partition(|&n| n <= max);
        if kept.is_empty() {
            (vec![1], dropped)
        } else {
            (kept, dropped)
        }
    }
}

/// Partial override of an `EmbeddingConfig`. Unset fields keep the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfigOverride {
    pub enable_tfidf: Option<bool>,
    pub enable_stemming: Option<bool>,
    pub enable_stopword_removal: Option<bool>,
    pub ngram_sizes: Option<Vec<usize>>,
    pub tfidf_weight: Option<f32>,
    pub language: Option<Language>,
    pub tf_mode: Option<TfMode>,
    pub smooth_idf: Option<bool>,
    pub min_document_frequency: Option<usize>,
    pub auto_tune: Option<bool>,
    pub max_vocabulary_size: Option<usize>,
    pub max_ngram_size: Option<usize>,
    pub max_processing_time_ms: Option<u64>,
    pub max_chunk_size: Option<usize>,
}

impl EmbeddingConfigOverride {
    /// Merge onto `base` and sanitize the result.
    pub fn apply(&self, base: &EmbeddingConfig) -> (EmbeddingConfig, Vec<ConfigError>) {
        let mut merged = base.clone();
        if let Some(v) = self.enable_tfidf {
            merged.enable_tfidf = v;
        }
        if let Some(v) = self.enable_stemming {
            merged.enable_stemming = v;
        }
        if let Some(v) = self.enable_stopword_removal {
            merged.enable_stopword_removal = v;
        }
        if let Some(ref v) = self.ngram_sizes {
            merged.ngram_sizes = v.clone();
        }
        if let Some(v) = self.tfidf_weight {
            merged.tfidf_weight = v;
        }
        if let Some(v) = self.language {
            merged.language = Some(v);
        }
        if let Some(v) = self.tf_mode {
            merged.tf_mode = v;
        }
        if let Some(v) = self.smooth_idf {
            merged.smooth_idf = v;
        }
        if let Some(v) = self.min_document_frequency {
            merged.min_document_frequency = v;
        }
        if let Some(v) = self.auto_tune {
            merged.auto_tune = v;
        }

        let limits = &mut merged.processing_limits;
        if let Some(v) = self.max_vocabulary_size {
            limits.max_vocabulary_size = v;
        }
        if let Some(v) = self.max_ngram_size {
            limits.max_ngram_size = v;
        }
        if let Some(v) = self.max_processing_time_ms {
            limits.max_processing_time_ms = v;
        }
        if let Some(v) = self.max_chunk_size {
            limits.max_chunk_size = v;
        }

        merged.sanitize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let (config, errors) = EmbeddingConfig::default().sanitize();
        assert!(errors.is_empty());
        assert_eq!(config, EmbeddingConfig::default());
        assert!(EmbeddingConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_only_the_bad_field() {
        let config = EmbeddingConfig {
            tfidf_weight: 1.5,
            enable_stemming: false,
            ngram_sizes: vec![1, 3],
            ..Default::default()
        };
        let (sanitized, errors) = config.sanitize();
        assert_eq!(errors, vec![ConfigError::TfidfWeight(1.5)]);
        assert_eq!(sanitized.tfidf_weight, DEFAULT_TFIDF_WEIGHT);
        // Accepted fields survive untouched
        assert!(!sanitized.enable_stemming);
        assert_eq!(sanitized.ngram_sizes, vec![1, 3]);
    }

    #[test]
    fn nan_weight_is_rejected() {
        let config = EmbeddingConfig {
            tfidf_weight: f32::NAN,
            ..Default::default()
        };
        let (sanitized, errors) = config.sanitize();
        assert_eq!(errors.len(), 1);
        assert_eq!(sanitized.tfidf_weight, DEFAULT_TFIDF_WEIGHT);
    }

    #[test]
    fn ngram_size_out_of_range_falls_back() {
        let config = EmbeddingConfig {
            ngram_sizes: vec![1, 6],
            ..Default::default()
        };
        let (sanitized, errors) = config.sanitize();
        assert_eq!(errors, vec![ConfigError::NgramSize(6)]);
        assert_eq!(sanitized.ngram_sizes, DEFAULT_NGRAM_SIZES.to_vec());

        let several = EmbeddingConfig {
            ngram_sizes: vec![0, 2, 7, 7, 9],
            ..Default::default()
        };
        let (sanitized, errors) = several.sanitize();
        assert_eq!(
            errors,
            vec![
                ConfigError::NgramSize(0),
                ConfigError::NgramSize(7),
                ConfigError::NgramSize(9)
            ]
        );
        assert_eq!(sanitized.ngram_sizes, DEFAULT_NGRAM_SIZES.to_vec());

        let empty = EmbeddingConfig {
            ngram_sizes: vec![],
            ..Default::default()
        };
        assert_eq!(empty.sanitize().1, vec![ConfigError::EmptyNgramSizes]);
    }

    #[test]
    fn duplicate_ngram_sizes_collapse() {
        let config = EmbeddingConfig {
            ngram_sizes: vec![2, 1, 2],
            ..Default::default()
        };
        let (sanitized, errors) = config.sanitize();
        assert!(errors.is_empty());
        assert_eq!(sanitized.ngram_sizes, vec![2, 1]);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let config = EmbeddingConfig {
            min_document_frequency: 0,
            processing_limits: ProcessingLimits {
                max_vocabulary_size: 0,
                max_ngram_size: 9,
                max_processing_time_ms: 0,
                max_chunk_size: 0,
            },
            ..Default::default()
        };
        let (sanitized, errors) = config.sanitize();
        assert_eq!(errors.len(), 5);
        assert_eq!(sanitized.processing_limits, ProcessingLimits::default());
        assert_eq!(sanitized.min_document_frequency, 1);
        assert!(config.validate().is_err());
        assert_eq!(config.validation_messages().len(), 5);
    }

    #[test]
    fn effective_sizes_respect_cap() {
        let config = EmbeddingConfig {
            ngram_sizes: vec![1, 2, 4],
            ..Default::default()
        };
        let (kept, dropped) = config.effective_ngram_sizes();
        assert_eq!(kept, vec![1, 2]);
        assert_eq!(dropped, vec![4]);

        let only_large = EmbeddingConfig {
            ngram_sizes: vec![5],
            ..Default::default()
        };
        assert_eq!(only_large.effective_ngram_sizes().0, vec![1]);
    }

    #[test]
    fn override_merges_and_sanitizes() {
        let base = EmbeddingConfig::default();
        let over = EmbeddingConfigOverride {
            enable_tfidf: Some(false),
            tfidf_weight: Some(-0.2),
            max_chunk_size: Some(200),
            language: Some(Language::Portuguese),
            ..Default::default()
        };
        let (merged, errors) = over.apply(&base);
        assert!(!merged.enable_tfidf);
        assert_eq!(merged.language, Some(Language::Portuguese));
        assert_eq!(merged.processing_limits.max_chunk_size, 200);
        assert_eq!(merged.tfidf_weight, DEFAULT_TFIDF_WEIGHT);
        assert_eq!(errors, vec![ConfigError::TfidfWeight(-0.2)]);
    }

    #[test]
    fn parses_partial_yaml() {
        let yaml = r#"
enable_stemming: false
ngram_sizes: [1, 2, 3]
language: portuguese
tf_mode: log
processing_limits:
  max_chunk_size: 400
"#;
        let config = EmbeddingConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.enable_stemming);
        assert!(config.enable_tfidf);
        assert_eq!(config.ngram_sizes, vec![1, 2, 3]);
        assert_eq!(config.language, Some(Language::Portuguese));
        assert_eq!(config.tf_mode, TfMode::Log);
        assert_eq!(config.processing_limits.max_chunk_size, 400);
        assert_eq!(
            config.processing_limits.max_vocabulary_size,
            DEFAULT_MAX_VOCABULARY_SIZE
        );
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embedding.yaml");
        std::fs::write(&path, "tfidf_weight: 0.25\n").unwrap();
        let config = EmbeddingConfig::load(&path).unwrap();
        assert_eq!(config.tfidf_weight, 0.25);

        assert!(EmbeddingConfig::load(&dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = EmbeddingConfig::from_yaml_str("ngram_sizes: not-a-list");
        assert!(matches!(result, Err(EmbeddingError::Yaml(_))));
    }
}
