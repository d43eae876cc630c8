//! Fuzzy token alignment.
//!
//! For each row, the aligner pairs every client token with its best source
//! counterpart — exact value match preferred, else approximate string
//! similarity above a configured threshold. Alignment is a pure per-row
//! function: it produces a row-scoped [`RowAlignment`] record instead of
//! mutating tokens, so batches can be partitioned across a thread pool
//! without shared state.

pub mod fuzzy;
pub mod scorer;
pub mod transform;

pub use fuzzy::FuzzyAligner;
pub use transform::{ConfidenceDiscount, KeepWeight, TokenTransformer};

/// One client-to-source pairing within a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    /// Index into the row's client token sequence.
    pub client: usize,
    /// Index into the row's source token sequence.
    pub source: usize,
    /// Similarity score in `[0, 100]`; exact pairings carry `100.0`.
    pub score: f64,
    /// `true` when the token values were identical, `false` for a fuzzy
    /// pairing — callers use this to discount match confidence.
    pub exact: bool,
}

/// All pairings found for one row.
///
/// Tokens absent from `pairings` on the client side stayed unmatched; they
/// still contribute to set membership, rarity, and base denominators, just
/// not to intersection totals. A source index may appear in several
/// pairings — pairing does not remove a token from candidacy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowAlignment {
    pub pairings: Vec<Pairing>,
}

impl RowAlignment {
    /// Number of pairings found.
    pub fn len(&self) -> usize {
        self.pairings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairings.is_empty()
    }

    /// Iterate over fuzzy (inexact) pairings only.
    pub fn fuzzy_pairings(&self) -> impl Iterator<Item = &Pairing> {
        self.pairings.iter().filter(|p| !p.exact)
    }
}
