//! Frequency counting and rate derivation.

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::JakkarError;
use crate::pipeline::artifacts::AlignedPair;
use crate::rate::{RateFunction, RateTable};

/// Builds a [`RateTable`] from the full token pool of an aligned batch.
///
/// For each distinct value with frequency `f`:
/// rate = clamp(penalize(1 / rate_function(f)), min_ratio, max_ratio).
/// Clamping is the final step, so the configured window bounds the
/// published rate regardless of the uniqueness penalty, and
/// `min_ratio == max_ratio` collapses every rate to that constant.
#[derive(Debug, Clone)]
pub struct RateCounter {
    min_ratio: f64,
    max_ratio: f64,
    uniq_max_value: u64,
    uniq_penalty: f64,
    rate_function: RateFunction,
}

impl Default for RateCounter {
    fn default() -> Self {
        Self {
            min_ratio: 0.0,
            max_ratio: 1.0,
            uniq_max_value: 0,
            uniq_penalty: 1.0,
            rate_function: RateFunction::Identity,
        }
    }
}

impl RateCounter {
    /// Counter with a clamp window and rate function; no uniqueness
    /// penalty.
    pub fn new(
        min_ratio: f64,
        max_ratio: f64,
        rate_function: RateFunction,
    ) -> Result<Self, JakkarError> {
        if min_ratio > max_ratio {
            return Err(JakkarError::RateBounds {
                min: min_ratio,
                max: max_ratio,
            });
        }
        Ok(Self {
            min_ratio,
            max_ratio,
            rate_function,
            ..Self::default()
        })
    }

    /// Penalize values at or below `uniq_max_value` occurrences by the
    /// `uniq_penalty` multiplier. `uniq_max_value == 0` disables the
    /// penalty; a penalty of `1.0` is a no-op.
    pub fn with_uniq_penalty(mut self, uniq_max_value: u64, uniq_penalty: f64) -> Self {
        self.uniq_max_value = uniq_max_value;
        self.uniq_penalty = uniq_penalty;
        self
    }

    /// Rate for a single frequency. Public because the clamp/penalty
    /// behavior is part of the configuration contract.
    pub fn count_ratio(&self, frequency: u64) -> f64 {
        let damped = self.rate_function.apply(frequency);
        let raw = if damped != 0.0 { 1.0 / damped } else { 0.0 };

        if !raw.is_finite() {
            warn!(frequency, function = self.rate_function.as_str(), "rate degraded to 0");
            return 0.0;
        }

        let penalized = if self.uniq_max_value > 0 && frequency <= self.uniq_max_value {
            raw * self.uniq_penalty
        } else {
            raw
        };

        penalized.clamp(self.min_ratio, self.max_ratio)
    }

    /// Build the table from every token on either side of every row.
    ///
    /// Pure in the batch's token multiset and this counter's tunables:
    /// identical inputs always produce identical tables.
    pub fn count(&self, rows: &[AlignedPair]) -> RateTable {
        let mut frequencies: FxHashMap<&str, u64> = FxHashMap::default();
        for row in rows {
            for token in row.client.iter().chain(&row.source) {
                *frequencies.entry(token.value.as_str()).or_insert(0) += 1;
            }
        }

        let rates = frequencies
            .into_iter()
            .map(|(value, frequency)| (value.to_string(), self.count_ratio(frequency)))
            .collect();

        RateTable::from_rates(rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::RowAlignment;
    use crate::types::Token;

    fn aligned(client: &[&str], source: &[&str]) -> AlignedPair {
        AlignedPair {
            client: client.iter().copied().map(Token::new).collect(),
            source: source.iter().copied().map(Token::new).collect(),
            alignment: RowAlignment::default(),
        }
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = RateCounter::new(0.5, 0.1, RateFunction::Identity).unwrap_err();
        assert_eq!(
            err,
            JakkarError::RateBounds {
                min: 0.5,
                max: 0.1
            }
        );
    }

    #[test]
    fn test_identity_inverts_frequency() {
        let counter = RateCounter::default();
        assert!((counter.count_ratio(1) - 1.0).abs() < 1e-12);
        assert!((counter.count_ratio(2) - 0.5).abs() < 1e-12);
        assert!((counter.count_ratio(4) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_sqrt_damping() {
        let counter = RateCounter::new(0.0, 1.0, RateFunction::Sqrt).unwrap();
        assert!((counter.count_ratio(4) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_rates_always_inside_clamp_window() {
        let counter = RateCounter::new(0.1, 0.2, RateFunction::Sqrt)
            .unwrap()
            .with_uniq_penalty(2, 0.0);
        for frequency in 1..200 {
            let rate = counter.count_ratio(frequency);
            assert!(
                (0.1..=0.2).contains(&rate),
                "rate {rate} escaped window at frequency {frequency}"
            );
        }
    }

    #[test]
    fn test_equal_bounds_collapse_all_rates() {
        let counter = RateCounter::new(0.3, 0.3, RateFunction::Identity)
            .unwrap()
            .with_uniq_penalty(1, 0.0);
        for frequency in 1..50 {
            assert!((counter.count_ratio(frequency) - 0.3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_uniq_penalty_applies_at_or_below_threshold() {
        let counter = RateCounter::new(0.0, 10.0, RateFunction::Identity)
            .unwrap()
            .with_uniq_penalty(2, 0.5);
        // f=1 -> 1.0 * 0.5; f=2 -> 0.5 * 0.5; f=3 -> unpenalized 1/3.
        assert!((counter.count_ratio(1) - 0.5).abs() < 1e-12);
        assert!((counter.count_ratio(2) - 0.25).abs() < 1e-12);
        assert!((counter.count_ratio(3) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_uniq_max_disables_penalty() {
        let counter = RateCounter::default().with_uniq_penalty(0, 0.0);
        assert!((counter.count_ratio(1) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_count_pools_both_sides_of_all_rows() {
        let counter = RateCounter::default();
        let rows = vec![
            aligned(&["dove", "250"], &["dove", "250", "ml"]),
            aligned(&["dove"], &["soap"]),
        ];
        let table = counter.count(&rows);
        // "dove" occurs 3 times, "250" twice, "ml"/"soap" once.
        assert!((table.rate("dove") - 1.0 / 3.0).abs() < 1e-12);
        assert!((table.rate("250") - 0.5).abs() < 1e-12);
        assert!((table.rate("ml") - 1.0).abs() < 1e-12);
        assert!((table.rate("soap") - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_only_observed_values_enter_table() {
        let counter = RateCounter::default();
        let table = counter.count(&[aligned(&["dove"], &["soap"])]);
        assert_eq!(table.len(), 2);
        assert!(table.get("shampoo").is_none());
    }

    #[test]
    fn test_identical_batches_yield_identical_tables() {
        let counter = RateCounter::new(0.1, 0.9, RateFunction::Sqrt)
            .unwrap()
            .with_uniq_penalty(2, 0.4);
        let rows = vec![aligned(&["dove", "250"], &["dove", "ml"])];
        let a = counter.count(&rows);
        let b = counter.count(&rows);
        for entry in a.sorted_entries() {
            assert!((entry.rate - b.rate(entry.token)).abs() < 1e-12);
        }
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn test_empty_batch_yields_empty_table() {
        let table = RateCounter::default().count(&[]);
        assert!(table.is_empty());
    }
}
