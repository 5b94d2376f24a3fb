//! Stopword removal and rule-table stemming, keyed by language.
//!
//! Both tables are data, not logic. Stemming rules are scanned in order and
//! the first rule whose suffix matches (and whose minimum word length is met)
//! wins, so reordering or editing a rule changes every vector built with it.
//! Bump `STEMMER_RULES_VERSION` when a table changes.

use std::collections::HashSet;
use std::sync::LazyLock;

use super::Language;

/// Version of the stemming rule tables below.
pub const STEMMER_RULES_VERSION: u32 = 1;

/// One suffix-stripping rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StemRule {
    pub suffix: &'static str,
    pub replacement: &'static str,
    /// Minimum word length in characters for the rule to apply.
    pub min_length: usize,
}

const fn rule(suffix: &'static str, replacement: &'static str, min_length: usize) -> StemRule {
    StemRule {
        suffix,
        replacement,
        min_length,
    }
}

/// English suffix rules. Identity rules (`ss`, `us`, `is`) shield words from
/// the trailing `s` rule.
pub const ENGLISH_RULES: &[StemRule] = &[
    rule("sses", "ss", 5),
    rule("ies", "y", 5),
    rule("ied", "y", 5),
    rule("ingly", "", 7),
    rule("edly", "", 6),
    rule("ness", "", 6),
    rule("ments", "", 7),
    rule("ment", "", 7),
    rule("ings", "", 6),
    rule("ing", "", 5),
    rule("ed", "", 5),
    rule("ly", "", 5),
    rule("ches", "ch", 5),
    rule("shes", "sh", 5),
    rule("xes", "x", 4),
    rule("ss", "ss", 3),
    rule("us", "us", 3),
    rule("is", "is", 3),
    rule("s", "", 4),
];

/// Portuguese suffix rules.
pub const PORTUGUESE_RULES: &[StemRule] = &[
    rule("amentos", "", 9),
    rule("imentos", "", 9),
    rule("amento", "", 8),
    rule("imento", "", 8),
    rule("mente", "", 8),
    rule("ções", "ção", 6),
    rule("ões", "ão", 5),
    rule("ais", "al", 5),
    rule("éis", "el", 5),
    rule("eis", "el", 5),
    rule("res", "r", 5),
    rule("ns", "m", 4),
    rule("as", "a", 4),
    rule("os", "o", 4),
    rule("es", "e", 5),
];

/// Common English function words. Words with technical meaning stay.
const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "is", "are", "was", "were", "be", "been", "of", "to",
    "in", "on", "at", "by", "for", "with", "as", "this", "that", "these", "those", "it", "its",
    "from", "into", "than", "then", "so", "if", "i", "you", "he", "she", "we", "they",
];

/// Common Portuguese function words.
const PORTUGUESE_STOPWORDS: &[&str] = &[
    "a", "o", "as", "os", "um", "uma", "uns", "umas", "de", "do", "da", "dos", "das", "em", "no",
    "na", "nos", "nas", "por", "para", "com", "e", "ou", "que", "se", "é", "ao", "aos", "à", "às",
    "pelo", "pela", "este", "esta", "isso", "isto",
];

static ENGLISH_STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOPWORDS.iter().copied().collect());

static PORTUGUESE_STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| PORTUGUESE_STOPWORDS.iter().copied().collect());

fn stopwords(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::English => &ENGLISH_STOPWORD_SET,
        Language::Portuguese => &PORTUGUESE_STOPWORD_SET,
    }
}

/// Stemming rules for `language`, in match order.
pub fn stem_rules(language: Language) -> &'static [StemRule] {
    match language {
        Language::English => ENGLISH_RULES,
        Language::Portuguese => PORTUGUESE_RULES,
    }
}

/// Whether `word` is a stopword in `language`.
pub fn is_stopword(word: &str, language: Language) -> bool {
    stopwords(language).contains(word)
}

/// Drop every stopword of `language`, preserving order.
pub fn remove_stopwords(words: &[String], language: Language) -> Vec<String> {
    words
        .iter()
        .filter(|w| !is_stopword(w, language))
        .cloned()
        .collect()
}

/// Stem a single word with the first matching rule. Unmatched words are
/// returned unchanged.
pub fn stem(word: &str, language: Language) -> String {
    let length = word.chars().count();
    for r in stem_rules(language) {
        if length >= r.min_length {
            if let Some(base) = word.strip_suffix(r.suffix) {
                return format!("{base}{}", r.replacement);
            }
        }
    }
    word.to_string()
}

/// Stem every word, preserving order.
pub fn apply_stemming(words: &[String], language: Language) -> Vec<String> {
    words.iter().map(|w| stem(w, language)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(|w| w.to_string()).collect()
    }

    #[test]
    fn removes_english_stopwords() {
        let out = remove_stopwords(&words("the cat sat on the mat"), Language::English);
        assert_eq!(out, words("cat sat mat"));
    }

    #[test]
    fn keeps_technical_words() {
        let out = remove_stopwords(&words("not null return error"), Language::English);
        assert_eq!(out, words("not null return error"));
    }

    #[test]
    fn removes_portuguese_stopwords() {
        let out = remove_stopwords(&words("o arquivo de configuração da api"), Language::Portuguese);
        assert_eq!(out, words("arquivo configuração api"));
    }

    #[test]
    fn stopwords_are_language_specific() {
        // "de" is only a Portuguese stopword
        assert!(is_stopword("de", Language::Portuguese));
        assert!(!is_stopword("de", Language::English));
    }

    #[test]
    fn english_stemming_rules() {
        let cases = [
            ("queries", "query"),
            ("applied", "apply"),
            ("indexed", "index"),
            ("indexes", "index"),
            ("files", "file"),
            ("deployment", "deploy"),
            ("quickly", "quick"),
            ("classes", "class"),
            ("class", "class"),
            ("status", "status"),
            ("analysis", "analysis"),
            ("running", "runn"),
        ];
        for (input, expected) in cases {
            assert_eq!(stem(input, Language::English), expected, "stem({input})");
        }
    }

    #[test]
    fn min_length_guards_short_words() {
        assert_eq!(stem("used", Language::English), "used");
        assert_eq!(stem("sing", Language::English), "sing");
        assert_eq!(stem("gas", Language::English), "gas");
        assert_eq!(stem("ties", Language::English), "tie");
    }

    #[test]
    fn first_matching_rule_wins() {
        // "sses" precedes "s"
        assert_eq!(stem("processes", Language::English), "process");
        // "ings" precedes "ing" and "s"
        assert_eq!(stem("mappings", Language::English), "mapp");
    }

    #[test]
    fn portuguese_stemming_rules() {
        let cases = [
            ("configurações", "configuração"),
            ("botões", "botão"),
            ("manuais", "manual"),
            ("servidores", "servidor"),
            ("arquivos", "arquivo"),
            ("casas", "casa"),
            ("clientes", "cliente"),
            ("rapidamente", "rapida"),
            ("processamento", "process"),
        ];
        for (input, expected) in cases {
            assert_eq!(stem(input, Language::Portuguese), expected, "stem({input})");
        }
    }

    #[test]
    fn unmatched_word_is_unchanged() {
        assert_eq!(stem("api", Language::English), "api");
        assert_eq!(stem("dog", Language::English), "dog");
        assert_eq!(stem("api", Language::Portuguese), "api");
    }

    #[test]
    fn apply_stemming_preserves_order() {
        let out = apply_stemming(&words("files queries api"), Language::English);
        assert_eq!(out, words("file query api"));
    }
}
