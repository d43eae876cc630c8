//! Corpus-wide token rarity rates.
//!
//! The rate table maps each distinct token value observed in a batch to a
//! weight inversely related to its frequency — the rarer a token, the more
//! a shared occurrence of it says about two listings being the same
//! product. The table is built once per batch, after alignment, and is
//! read-only from then on.

pub mod counter;
pub mod function;

pub use counter::RateCounter;
pub use function::RateFunction;

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Immutable token-value → rarity-rate mapping for one batch.
///
/// Every entry corresponds to a value with frequency >= 1 in the combined
/// client+source pool; unobserved values cannot exist here by
/// construction.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: FxHashMap<String, f64>,
}

/// One exported table entry — the debug dump row format.
#[derive(Debug, Clone, Serialize)]
pub struct RateEntry<'a> {
    pub token: &'a str,
    pub rate: f64,
}

impl RateTable {
    pub(crate) fn from_rates(rates: FxHashMap<String, f64>) -> Self {
        Self { rates }
    }

    /// Rate for a token value; `None` for values outside the batch corpus.
    pub fn get(&self, value: &str) -> Option<f64> {
        self.rates.get(value).copied()
    }

    /// Rate used during mark aggregation: unobserved values contribute
    /// nothing.
    pub fn rate(&self, value: &str) -> f64 {
        self.get(value).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Entries sorted by token value — deterministic order for the debug
    /// export and for diffing runs.
    pub fn sorted_entries(&self) -> Vec<RateEntry<'_>> {
        let mut entries: Vec<RateEntry<'_>> = self
            .rates
            .iter()
            .map(|(token, &rate)| RateEntry { token, rate })
            .collect();
        entries.sort_by(|a, b| a.token.cmp(b.token));
        entries
    }
}
