//! N-gram expansion.

/// Expand `words` into n-grams for every size in `sizes`, in the order given.
///
/// Size 1 emits the words themselves; larger sizes emit each contiguous
/// window joined by a single space. Sizes longer than the input (and size 0)
/// contribute nothing.
pub fn generate_ngrams(words: &[String], sizes: &[usize]) -> Vec<String> {
    let mut ngrams = Vec::new();
    for &n in sizes {
        if n == 0 || n > words.len() {
            continue;
        }
        if n == 1 {
            ngrams.extend(words.iter().cloned());
        } else {
            ngrams.extend(words.windows(n).map(|w| w.join(" ")));
        }
    }
    ngrams
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(|w| w.to_string()).collect()
    }

    #[test]
    fn unigrams_are_the_words() {
        let w = words("alpha beta beta gamma");
        assert_eq!(generate_ngrams(&w, &[1]), w);
    }

    #[test]
    fn bigrams_and_trigrams() {
        let w = words("a b c d");
        assert_eq!(generate_ngrams(&w, &[2]), vec!["a b", "b c", "c d"]);
        assert_eq!(generate_ngrams(&w, &[3]), vec!["a b c", "b c d"]);
    }

    #[test]
    fn sizes_concatenate_in_given_order() {
        let w = words("x y z");
        assert_eq!(
            generate_ngrams(&w, &[2, 1]),
            vec!["x y", "y z", "x", "y", "z"]
        );
    }

    #[test]
    fn oversized_windows_contribute_nothing() {
        let w = words("only two");
        assert_eq!(generate_ngrams(&w, &[1, 3]), vec!["only", "two"]);
        assert!(generate_ngrams(&[], &[1, 2]).is_empty());
    }

    #[test]
    fn window_equal_to_length() {
        let w = words("one two three");
        assert_eq!(generate_ngrams(&w, &[3]), vec!["one two three"]);
    }
}
