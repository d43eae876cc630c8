//! Token sequence preprocessing — filtering between tokenization and
//! alignment.
//!
//! Filters must be idempotent and must not reorder tokens: the fuzzy
//! aligner's candidate selection depends on sequence order.

use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

use crate::types::Token;

/// Filters a token sequence in place of the raw tokenizer output.
///
/// # Contract
///
/// - Idempotent: `filter(filter(seq)) == filter(seq)`.
/// - Order-preserving: surviving tokens keep their relative order.
pub trait TokenFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token>;
}

/// Default preprocessor: drops tokens shorter than a minimum character
/// count and, optionally, stopwords.
///
/// Short-token filtering is what removes the stray punctuation segments
/// the tokenizer emits for decorated product names.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    min_length: usize,
    stopwords: FxHashSet<String>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Preprocessor {
    /// Keep only tokens with at least `min_length` characters.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            stopwords: FxHashSet::default(),
        }
    }

    /// Also drop stopwords of the given language (matched case-insensitively).
    ///
    /// Product names routinely embed connective words ("для", "with") that
    /// carry no matching signal but inflate the union denominator.
    pub fn with_language(mut self, language: LANGUAGE) -> Self {
        self.stopwords
            .extend(get(language).into_iter().map(|w| w.to_lowercase()));
        self
    }

    /// Add a custom stopword list on top of any language lists.
    pub fn with_stopwords(mut self, words: &[&str]) -> Self {
        self.stopwords.extend(words.iter().map(|w| w.to_lowercase()));
        self
    }

    fn keeps(&self, token: &Token) -> bool {
        token.value.chars().count() >= self.min_length
            && (self.stopwords.is_empty() || !self.stopwords.contains(&token.value.to_lowercase()))
    }
}

impl TokenFilter for Preprocessor {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        tokens.into_iter().filter(|t| self.keeps(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(values: &[&str]) -> Vec<Token> {
        values.iter().copied().map(Token::new).collect()
    }

    #[test]
    fn test_drops_tokens_below_min_length() {
        let filtered = Preprocessor::new(2).filter(seq(&["(", "dove", ")", "мл"]));
        let values: Vec<_> = filtered.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["dove", "мл"]);
    }

    #[test]
    fn test_min_length_counts_chars_not_bytes() {
        // "мл" is 4 bytes but 2 characters.
        let filtered = Preprocessor::new(2).filter(seq(&["мл"]));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_preserves_order() {
        let filtered = Preprocessor::new(2).filter(seq(&["zz", "aa", "x", "mm"]));
        let values: Vec<_> = filtered.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["zz", "aa", "mm"]);
    }

    #[test]
    fn test_is_idempotent() {
        let pre = Preprocessor::new(3).with_stopwords(&["the"]);
        let once = pre.filter(seq(&["the", "dove", "ml", "shampoo"]));
        let twice = pre.filter(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_custom_stopwords_match_case_insensitively() {
        let pre = Preprocessor::new(1).with_stopwords(&["для"]);
        let filtered = pre.filter(seq(&["Гель", "Для", "душа"]));
        let values: Vec<_> = filtered.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["Гель", "душа"]);
    }

    #[test]
    fn test_language_stopwords_loaded() {
        let pre = Preprocessor::new(1).with_language(LANGUAGE::English);
        let filtered = pre.filter(seq(&["the", "shampoo", "with", "aloe"]));
        let values: Vec<_> = filtered.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["shampoo", "aloe"]);
    }

    #[test]
    fn test_keeps_weights_of_survivors() {
        let tokens = vec![Token::new("x"), Token::new("dove").with_weight(0.5)];
        let filtered = Preprocessor::new(2).filter(tokens);
        assert_eq!(filtered.len(), 1);
        assert!((filtered[0].custom_weight - 0.5).abs() < 1e-12);
    }
}
