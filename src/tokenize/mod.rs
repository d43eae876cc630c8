//! Tokenization stage — free text to weighted token sequences.
//!
//! The engine only requires deterministic `value`/`custom_weight` pairs;
//! how weights are assigned is up to the [`Tokenizer`] implementation.
//! [`BasicTokenizer`] assigns a uniform weight of `1.0`;
//! [`CharClassTokenizer`] weights each token by its dominant character
//! class, which lets mixed-script catalogs (e.g. cyrillic client names
//! against latin source listings) bias one script over another.

pub mod preprocess;

use serde::{Deserialize, Serialize};

use crate::types::Token;

/// Produces a token sequence from one free-text column value.
///
/// # Contract
///
/// - Deterministic: equal input text yields an identical sequence.
/// - Order follows the text; downstream fuzzy-candidate selection may
///   depend on it.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Character class used for segmentation and weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Numeric,
    Alphabetic,
    Other,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_digit() {
            CharClass::Numeric
        } else if c.is_alphabetic() {
            CharClass::Alphabetic
        } else {
            CharClass::Other
        }
    }
}

/// Split a whitespace-free chunk on character-class transitions, so glued
/// quantity suffixes come apart ("250ml" -> "250", "ml").
fn split_segments(chunk: &str) -> impl Iterator<Item = &str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut current: Option<CharClass> = None;

    for (idx, c) in chunk.char_indices() {
        let class = CharClass::of(c);
        match current {
            Some(prev) if prev == class => {}
            Some(_) => {
                segments.push(&chunk[start..idx]);
                start = idx;
                current = Some(class);
            }
            None => current = Some(class),
        }
    }
    if start < chunk.len() {
        segments.push(&chunk[start..]);
    }
    segments.into_iter()
}

// ============================================================================
// BasicTokenizer
// ============================================================================

/// Whitespace tokenizer with digit/letter boundary splitting and a uniform
/// weight of `1.0`. Case is preserved — `"Dove"` and `"dove"` are distinct
/// values left for the fuzzy aligner to pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTokenizer;

impl Tokenizer for BasicTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace()
            .flat_map(split_segments)
            .map(Token::new)
            .collect()
    }
}

// ============================================================================
// CharClassTokenizer
// ============================================================================

/// Per-character-class weight table for [`CharClassTokenizer`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LanguageWeights {
    pub cyrillic: f64,
    pub latin: f64,
    pub numeric: f64,
    pub other: f64,
}

impl Default for LanguageWeights {
    fn default() -> Self {
        Self {
            cyrillic: 1.0,
            latin: 1.0,
            numeric: 1.0,
            other: 1.0,
        }
    }
}

/// Tokenizer that assigns `custom_weight` by the dominant character class
/// of each token: cyrillic, latin, numeric, or other.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharClassTokenizer {
    weights: LanguageWeights,
}

impl CharClassTokenizer {
    pub fn new(weights: LanguageWeights) -> Self {
        Self { weights }
    }

    fn weight_for(&self, value: &str) -> f64 {
        let mut cyrillic = 0usize;
        let mut latin = 0usize;
        let mut numeric = 0usize;
        let mut other = 0usize;

        // Same predicates as `CharClass::of`, with alphabetic split into
        // cyrillic and (everything-else) latin.
        for c in value.chars() {
            if ('\u{0400}'..='\u{04FF}').contains(&c) {
                cyrillic += 1;
            } else if c.is_alphabetic() {
                latin += 1;
            } else if c.is_ascii_digit() {
                numeric += 1;
            } else {
                other += 1;
            }
        }

        let (_, weight) = [
            (cyrillic, self.weights.cyrillic),
            (latin, self.weights.latin),
            (numeric, self.weights.numeric),
            (other, self.weights.other),
        ]
        .into_iter()
        .max_by_key(|&(count, _)| count)
        .unwrap_or((0, 1.0));

        weight
    }
}

impl Tokenizer for CharClassTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_whitespace()
            .flat_map(split_segments)
            .map(|value| Token {
                custom_weight: self.weight_for(value),
                value: value.to_string(),
            })
            .collect()
    }
}
