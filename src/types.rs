//! Core value types shared by every pipeline stage.
//!
//! [`Token`] is the unit of comparison: a normalized text fragment plus a
//! weight multiplier. [`Batch`] and [`Row`] form the tabular boundary with
//! the surrounding validator chain — the engine reads the two name columns,
//! writes its output columns into [`Row::extra`], and leaves everything
//! else untouched.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Names of the columns the validator may write into [`Row::extra`].
///
/// `validate` reports the subset it actually produced via
/// `returning_columns`, so callers know exactly what to merge back.
pub mod columns {
    /// Mark computed against the union base set.
    pub const MARKS_UNION: &str = "marks_union";
    /// Mark computed against the client base set.
    pub const MARKS_CLIENT: &str = "marks_client";
    /// Mark computed against the source base set.
    pub const MARKS_SOURCE: &str = "marks_source";
    /// Boolean match decision.
    pub const VALIDATED: &str = "validated";
    /// Post-alignment client token values (debug mode only).
    pub const CLIENT_TOKENS: &str = "client_tokens";
    /// Post-alignment source token values (debug mode only).
    pub const SOURCE_TOKENS: &str = "source_tokens";
}

// ============================================================================
// Token
// ============================================================================

/// A normalized text fragment with a weight multiplier.
///
/// Equality and hashing are defined by `value` alone: two tokens with equal
/// text are interchangeable for set operations even when their weights
/// differ. Tokens are immutable values — weight adjustment produces a
/// replacement token via [`Token::with_weight`] rather than mutating in
/// place, so alignment can run over parallel partitions without aliasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// Normalized text of the fragment.
    pub value: String,
    /// Weight multiplier applied on top of the corpus rarity rate.
    pub custom_weight: f64,
}

impl Token {
    /// Create a token with the default weight of `1.0`.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            custom_weight: 1.0,
        }
    }

    /// Return a copy of this token carrying `weight` instead.
    pub fn with_weight(&self, weight: f64) -> Self {
        Self {
            value: self.value.clone(),
            custom_weight: weight,
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

// ============================================================================
// Batch / Row
// ============================================================================

/// One candidate pair: a client catalog entry against a scraped source row.
///
/// `validated` carries a prior stage's accept decision, if any. The engine
/// can only downgrade it — a row below the validation threshold ends up
/// not validated regardless of the prior flag, and a prior reject is never
/// overturned.
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Free-text product name from the client catalog.
    pub client_name: String,
    /// Free-text listing row from the scraped source.
    pub source_row: String,
    /// Accept flag from an earlier validator stage, when one ran.
    pub validated: Option<bool>,
    /// Caller-owned columns, preserved verbatim. The engine only inserts
    /// the keys listed in [`columns`].
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Row {
    pub fn new(client_name: impl Into<String>, source_row: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            source_row: source_row.into(),
            validated: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// An ordered batch of candidate pairs.
///
/// Row order is preserved end-to-end through validation, including under
/// parallel alignment.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub rows: Vec<Row>,
}

impl Batch {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a batch from `(client_name, source_row)` text pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            rows: pairs
                .into_iter()
                .map(|(client, source)| Row::new(client, source))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_token_equality_ignores_weight() {
        let a = Token::new("dove");
        let b = Token::new("dove").with_weight(0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_token_set_dedupes_by_value() {
        let mut set = FxHashSet::default();
        set.insert(Token::new("dove"));
        set.insert(Token::new("dove").with_weight(0.5));
        set.insert(Token::new("250"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_token_set_keeps_first_inserted_weight() {
        let mut set = FxHashSet::default();
        set.insert(Token::new("dove").with_weight(0.9));
        set.insert(Token::new("dove").with_weight(0.1));
        let kept = set.get(&Token::new("dove")).unwrap();
        assert!((kept.custom_weight - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_with_weight_leaves_original_untouched() {
        let a = Token::new("dove");
        let _b = a.with_weight(0.5);
        assert!((a.custom_weight - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_batch_from_pairs_preserves_order() {
        let batch = Batch::from_pairs(vec![("a", "b"), ("c", "d")]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.rows[0].client_name, "a");
        assert_eq!(batch.rows[1].source_row, "d");
    }

    #[test]
    fn test_new_row_has_no_prior_decision() {
        let row = Row::new("x", "y");
        assert!(row.validated.is_none());
        assert!(row.extra.is_empty());
    }
}
