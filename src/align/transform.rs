//! Token transformers — weight adjustment on successful pairings.
//!
//! Invoked by the aligner for every pairing. Implementations decide how the
//! matched source token's weight should reflect match confidence; the
//! aligner applies the returned weight by rebuilding the token, so the
//! incoming tokens are never mutated.

use crate::types::Token;

/// Maps a successful pairing to a replacement weight for the matched
/// (source-side) token.
pub trait TokenTransformer: Send + Sync {
    /// `matched` is the source token selected for `matching` (the client
    /// token); `is_exact` distinguishes definitional matches from fuzzy
    /// ones.
    fn transform(&self, matched: &Token, matching: &Token, is_exact: bool) -> f64;
}

/// Default transformer: exact pairings keep their weight, fuzzy pairings
/// are discounted by a constant factor.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceDiscount {
    fuzzy_factor: f64,
}

impl ConfidenceDiscount {
    pub fn new(fuzzy_factor: f64) -> Self {
        Self { fuzzy_factor }
    }
}

impl Default for ConfidenceDiscount {
    fn default() -> Self {
        Self { fuzzy_factor: 0.75 }
    }
}

impl TokenTransformer for ConfidenceDiscount {
    fn transform(&self, matched: &Token, _matching: &Token, is_exact: bool) -> f64 {
        if is_exact {
            matched.custom_weight
        } else {
            matched.custom_weight * self.fuzzy_factor
        }
    }
}

/// No-op transformer: every pairing keeps the matched token's weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepWeight;

impl TokenTransformer for KeepWeight {
    #[inline]
    fn transform(&self, matched: &Token, _matching: &Token, _is_exact: bool) -> f64 {
        matched.custom_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_keeps_exact_weight() {
        let tr = ConfidenceDiscount::default();
        let w = tr.transform(&Token::new("dove"), &Token::new("dove"), true);
        assert!((w - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_discount_scales_fuzzy_weight() {
        let tr = ConfidenceDiscount::new(0.5);
        let matched = Token::new("dove").with_weight(0.8);
        let w = tr.transform(&matched, &Token::new("Dove"), false);
        assert!((w - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_keep_weight_ignores_exactness() {
        let matched = Token::new("dove").with_weight(0.3);
        let matching = Token::new("Dove");
        let exact = KeepWeight.transform(&matched, &matching, true);
        let fuzzy = KeepWeight.transform(&matched, &matching, false);
        assert!((exact - 0.3).abs() < 1e-12);
        assert!((fuzzy - 0.3).abs() < 1e-12);
    }
}
