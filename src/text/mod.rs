//! Text normalization: tokenization, language detection, stopwords,
//! stemming and n-gram expansion.
//!
//! `TextProcessor` runs the whole chain for one chunk or one query and
//! produces an immutable `ProcessedText`.

pub mod lexical;
pub mod ngram;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

use crate::config::EmbeddingConfig;

/// Supported languages. Adding one means adding indicator words, a stopword
/// list and a stemming table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Portuguese,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::English, Language::Portuguese];

    /// Short code ("en", "pt").
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Portuguese => "pt",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::English => write!(f, "english"),
            Language::Portuguese => write!(f, "portuguese"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "pt" | "portuguese" => Ok(Language::Portuguese),
            _ => Err(format!("unknown language: '{s}' (expected en/pt)")),
        }
    }
}

/// Output of the normalization chain for one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedText {
    /// Tokens after stopword removal and stemming.
    pub words: Vec<String>,
    /// N-gram expansion of `words`; this is what gets vectorized.
    pub ngrams: Vec<String>,
    pub language: Language,
}

impl ProcessedText {
    pub fn is_empty(&self) -> bool {
        self.ngrams.is_empty()
    }
}

/// Runs tokenizer → stopwords → stemmer → n-grams with fixed settings.
#[derive(Debug, Clone)]
pub struct TextProcessor {
    language: Option<Language>,
    /// Detection tie-break when `language` is `None`.
    fallback_language: Language,
    enable_stopword_removal: bool,
    enable_stemming: bool,
    ngram_sizes: Vec<usize>,
}

impl TextProcessor {
    /// Create a processor. `language: None` detects the language per input.
    pub fn new(
        language: Option<Language>,
        enable_stopword_removal: bool,
        enable_stemming: bool,
        ngram_sizes: Vec<usize>,
    ) -> Self {
        Self {
            language,
            fallback_language: Language::default(),
            enable_stopword_removal,
            enable_stemming,
            ngram_sizes,
        }
    }

    /// Build from a (sanitized) config, honoring the n-gram size cap.
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        let (sizes, _) = config.effective_ngram_sizes();
        Self::new(
            config.language,
            config.enable_stopword_removal,
            config.enable_stemming,
            sizes,
        )
    }

    /// Resolve detection ties to `language` instead of the default.
    pub fn with_fallback_language(mut self, language: Language) -> Self {
        self.fallback_language = language;
        self
    }

    pub fn fallback_language(&self) -> Language {
        self.fallback_language
    }

    pub fn ngram_sizes(&self) -> &[usize] {
        &self.ngram_sizes
    }

    /// Process `text` with the configured n-gram sizes.
    pub fn process(&self, text: &str) -> ProcessedText {
        self.process_with_sizes(text, &self.ngram_sizes)
    }

    /// Process `text` unigram-only (degraded mode).
    pub fn process_unigrams(&self, text: &str) -> ProcessedText {
        self.process_with_sizes(text, &[1])
    }

    fn process_with_sizes(&self, text: &str, sizes: &[usize]) -> ProcessedText {
        let language = self
            .language
            .unwrap_or_else(|| tokenizer::detect_language_or(text, self.fallback_language));

        let mut words = tokenizer::tokenize(text);
        if self.enable_stopword_removal {
            words = lexical::remove_stopwords(&words, language);
        }
        if self.enable_stemming {
            words = lexical::apply_stemming(&words, language);
        }
        let ngrams = ngram::generate_ngrams(&words, sizes);

        ProcessedText {
            words,
            ngrams,
            language,
        }
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::from_config(&EmbeddingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_codes() {
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert_eq!("Portuguese".parse::<Language>().unwrap(), Language::Portuguese);
        assert!("klingon".parse::<Language>().is_err());
        assert_eq!(Language::Portuguese.code(), "pt");
    }

    #[test]
    fn full_chain_with_defaults() {
        let processed = TextProcessor::default().process("The parsers indexed the files.");
        assert_eq!(processed.language, Language::English);
        assert_eq!(processed.words, vec!["parser", "index", "file"]);
        assert_eq!(
            processed.ngrams,
            vec!["parser", "index", "file", "parser index", "index file"]
        );
    }

    #[test]
    fn chain_without_stopwords_or_stemming() {
        let processor = TextProcessor::new(None, false, false, vec![1]);
        let processed = processor.process("The files");
        assert_eq!(processed.words, vec!["the", "files"]);
        assert_eq!(processed.ngrams, processed.words);
    }

    #[test]
    fn declared_language_overrides_detection() {
        let processor = TextProcessor::new(Some(Language::Portuguese), true, true, vec![1]);
        let processed = processor.process("the arquivos");
        assert_eq!(processed.language, Language::Portuguese);
        assert_eq!(processed.words, vec!["the", "arquivo"]);
    }

    #[test]
    fn detected_language_drives_stopwords() {
        let processed = TextProcessor::default().process("O arquivo não está na pasta de dados");
        assert_eq!(processed.language, Language::Portuguese);
        assert!(!processed.words.contains(&"o".to_string()));
        assert!(!processed.words.contains(&"de".to_string()));
    }

    #[test]
    fn fallback_language_breaks_ties_only() {
        let processor = TextProcessor::default().with_fallback_language(Language::Portuguese);
        let processed = processor.process("servidores");
        assert_eq!(processed.language, Language::Portuguese);
        assert_eq!(processed.words, vec!["servidor"]);

        // Indicator words still decide
        assert_eq!(processor.process("the files").language, Language::English);

        let declared = TextProcessor::new(Some(Language::English), true, true, vec![1])
            .with_fallback_language(Language::Portuguese);
        assert_eq!(declared.process("servidores").language, Language::English);
    }

    #[test]
    fn unigram_mode_ignores_configured_sizes() {
        let processor = TextProcessor::new(None, true, false, vec![1, 2, 3]);
        let processed = processor.process_unigrams("alpha beta gamma");
        assert_eq!(processed.ngrams, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn empty_text_yields_empty_output() {
        let processed = TextProcessor::default().process("   ");
        assert!(processed.is_empty());
        assert!(processed.words.is_empty());
    }
}
