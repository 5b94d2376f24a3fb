//! Tokenizer and language detector.
//!
//! Lowercases, replaces everything that is not a word character, whitespace
//! or a supported accented letter with a space, then splits on whitespace.
//! Language detection counts distinct indicator words per language; it is a
//! closed enumeration, not a classifier.

use std::collections::HashSet;

use super::Language;

/// Accented letters kept intact by the tokenizer (lowercase only; input is
/// lowercased first).
const ACCENTED_LETTERS: &[char] = &[
    'á', 'à', 'â', 'ã', 'ä', 'é', 'è', 'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ó', 'ò', 'ô', 'õ', 'ö', 'ú',
    'ù', 'û', 'ü', 'ç', 'ñ',
];

/// Indicator words for English.
const ENGLISH_INDICATORS: &[&str] = &[
    "the", "and", "is", "are", "of", "to", "in", "that", "with", "for", "this", "it", "was",
    "be", "have", "from", "which", "you",
];

/// Indicator words for Portuguese.
const PORTUGUESE_INDICATORS: &[&str] = &[
    "de", "da", "dos", "das", "que", "não", "para", "com", "uma", "os", "em", "é", "são", "mais",
    "como", "mas", "pelo", "pela", "também", "você",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || ACCENTED_LETTERS.contains(&c)
}

/// Split text into lowercase tokens. Never yields empty strings.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if is_token_char(c) || c.is_whitespace() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

fn indicators(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => ENGLISH_INDICATORS,
        Language::Portuguese => PORTUGUESE_INDICATORS,
    }
}

/// Number of distinct indicator words of `language` present in `tokens`.
fn indicator_overlap(tokens: &HashSet<&str>, language: Language) -> usize {
    indicators(language)
        .iter()
        .filter(|w| tokens.contains(*w))
        .count()
}

/// Detect the language of `text`. Ties, including no indicators at all,
/// resolve to `Language::default()`.
pub fn detect_language(text: &str) -> Language {
    detect_language_or(text, Language::default())
}

/// Like `detect_language`, but ties resolve to `fallback`.
pub fn detect_language_or(text: &str, fallback: Language) -> Language {
    let tokens = tokenize(text);
    let distinct: HashSet<&str> = tokens.iter().map(|t| t.as_str()).collect();

    let mut best = fallback;
    let mut best_score = indicator_overlap(&distinct, fallback);
    for &language in Language::ALL {
        if language == fallback {
            continue;
        }
        let score = indicator_overlap(&distinct, language);
        if score > best_score {
            best = language;
            best_score = score;
        }
    }
    best
}
