//! Sentence chunking.
//!
//! Text is split on `.`, `!` and `?`; terminators are dropped and sentences
//! are rejoined with single spaces until the next one would push a chunk
//! past the size limit (in characters).

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// Split `text` into trimmed, non-empty sentences with internal whitespace
/// collapsed.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(SENTENCE_TERMINATORS)
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Chunk `text` into pieces of at most `max_chunk_size` characters.
///
/// A sentence longer than the limit is broken on word boundaries; a single
/// word longer than the limit is kept whole.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    let max = max_chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        for piece in split_oversized(&sentence, max) {
            let piece_len = piece.chars().count();
            if current_len > 0 && current_len + 1 + piece_len > max {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Break a sentence into word-aligned pieces no longer than `max`.
fn split_oversized(sentence: &str, max: usize) -> Vec<String> {
    if sentence.chars().count() <= max {
        return vec![sentence.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_len = 0usize;
    for word in sentence.split(' ') {
        let word_len = word.chars().count();
        if piece_len > 0 && piece_len + 1 + word_len > max {
            pieces.push(std::mem::take(&mut piece));
            piece_len = 0;
        }
        if piece_len > 0 {
            piece.push(' ');
            piece_len += 1;
        }
        piece.push_str(word);
        piece_len += word_len;
    }
    if piece_len > 0 {
        pieces.push(piece);
    }
    pieces
}
