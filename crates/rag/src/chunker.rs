//! Token-aware chunk splitting for Archival Storage inserts (spec §4.1,
//! `CHUNK_MAX_TOKENS`).
//!
//! Splits on whitespace-delimited words, packing as many as fit under the
//! token budget as measured by the caller's [`Tokenizer`], then backing off
//! word-by-word if a single run of words overshoots it. A real tokenizer
//! rarely maps 1 word to 1 token, so the packer re-measures after every
//! word it adds rather than assuming a fixed words-per-token ratio.

use hearth_core::traits::Tokenizer;

pub fn split_into_chunks(text: &str, tokenizer: &dyn Tokenizer, max_tokens: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in words {
        current.push(word);
        let candidate = current.join(" ");
        if tokenizer.count_tokens(&candidate) > max_tokens {
            current.pop();
            if !current.is_empty() {
                chunks.push(current.join(" "));
            }
            current = vec![word];
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WordCountTokenizer;
    impl Tokenizer for WordCountTokenizer {
        fn count_tokens(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    #[test]
    fn packs_words_under_budget() {
        let text = "one two three four five six seven eight nine ten";
        let chunks = split_into_chunks(text, &WordCountTokenizer, 3);
        assert_eq!(chunks, vec!["one two three", "four five six", "seven eight nine", "ten"]);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(split_into_chunks("   ", &WordCountTokenizer, 10).is_empty());
    }

    #[test]
    fn single_word_larger_than_budget_still_emitted() {
        let chunks = split_into_chunks("onlyword", &WordCountTokenizer, 0);
        assert_eq!(chunks, vec!["onlyword"]);
    }
}
