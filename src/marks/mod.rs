//! Mark aggregation — rarity-weighted set similarity per row.
//!
//! A mark is the ratio of intersection weight to base-set weight, where
//! every token contributes `rate(value) * custom_weight`. Marks are not
//! clamped to `[0, 1]`: upstream weight discounts can push the ratio
//! around, so downstream thresholds treat them strictly as "larger = more
//! similar".

use serde::{Deserialize, Serialize};

use crate::pipeline::artifacts::TokenSetPair;
use crate::rate::RateTable;
use crate::types::Token;

/// Denominator set for one mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseSet {
    /// `client ∪ source`.
    Union,
    /// Client tokens only.
    Client,
    /// Source tokens only.
    Source,
}

impl BaseSet {
    /// Output column name for this base set's mark.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Union => crate::types::columns::MARKS_UNION,
            Self::Client => crate::types::columns::MARKS_CLIENT,
            Self::Source => crate::types::columns::MARKS_SOURCE,
        }
    }
}

/// Aggregation mode.
///
/// `Multiple` computes all three marks per row; which one drives the
/// validation threshold is required configuration, not an implicit
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarksMode {
    /// Compute exactly one mark.
    Single(BaseSet),
    /// Compute all three marks; threshold against `authoritative`.
    Multiple { authoritative: BaseSet },
}

impl MarksMode {
    /// The base set whose mark drives validation.
    pub fn authoritative(&self) -> BaseSet {
        match *self {
            Self::Single(base) => base,
            Self::Multiple { authoritative } => authoritative,
        }
    }

    /// Column names this mode produces, in output order.
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            Self::Single(base) => vec![base.column()],
            Self::Multiple { .. } => vec![
                BaseSet::Union.column(),
                BaseSet::Client.column(),
                BaseSet::Source.column(),
            ],
        }
    }
}

/// Marks computed for one row; absent entries were not requested by the
/// configured mode.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowMarks {
    pub union: Option<f64>,
    pub client: Option<f64>,
    pub source: Option<f64>,
}

impl RowMarks {
    pub fn get(&self, base: BaseSet) -> Option<f64> {
        match base {
            BaseSet::Union => self.union,
            BaseSet::Client => self.client,
            BaseSet::Source => self.source,
        }
    }
}

/// Computes per-row marks from the rarity table and token sets.
#[derive(Debug, Clone, Copy)]
pub struct MarksCounter {
    mode: MarksMode,
}

impl MarksCounter {
    pub fn new(mode: MarksMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MarksMode {
        self.mode
    }

    /// The mark driving validation for a row, `0.0` when the mode somehow
    /// produced none (empty base).
    pub fn authoritative_mark(&self, marks: &RowMarks) -> f64 {
        marks.get(self.mode.authoritative()).unwrap_or(0.0)
    }

    fn weighted_sum<'a>(rates: &RateTable, tokens: impl Iterator<Item = &'a Token>) -> f64 {
        tokens
            .map(|t| rates.rate(&t.value) * t.custom_weight)
            .sum()
    }

    /// `intersection_sum / base_sum`, defined as `0.0` on a zero base.
    fn mark(intersection_sum: f64, base_sum: f64) -> f64 {
        if base_sum == 0.0 {
            0.0
        } else {
            intersection_sum / base_sum
        }
    }

    fn mark_for(&self, rates: &RateTable, row: &TokenSetPair, base: BaseSet) -> f64 {
        // Shared values contribute with client-side weights. Built by hand
        // rather than with `FxHashSet::intersection`/`union`, which iterate
        // whichever operand is smaller (or larger) and so would pick the
        // representing side by set cardinality.
        let intersection_sum = Self::weighted_sum(
            rates,
            row.client.iter().filter(|t| row.source.contains(*t)),
        );

        let base_sum = match base {
            BaseSet::Union => Self::weighted_sum(
                rates,
                row.client
                    .iter()
                    .chain(row.source.iter().filter(|t| !row.client.contains(*t))),
            ),
            BaseSet::Client => Self::weighted_sum(rates, row.client.iter()),
            BaseSet::Source => Self::weighted_sum(rates, row.source.iter()),
        };

        Self::mark(intersection_sum, base_sum)
    }

    /// Marks for one row under the configured mode.
    pub fn count_row(&self, rates: &RateTable, row: &TokenSetPair) -> RowMarks {
        let mut marks = RowMarks::default();
        match self.mode {
            MarksMode::Single(base) => {
                let value = self.mark_for(rates, row, base);
                match base {
                    BaseSet::Union => marks.union = Some(value),
                    BaseSet::Client => marks.client = Some(value),
                    BaseSet::Source => marks.source = Some(value),
                }
            }
            MarksMode::Multiple { .. } => {
                marks.union = Some(self.mark_for(rates, row, BaseSet::Union));
                marks.client = Some(self.mark_for(rates, row, BaseSet::Client));
                marks.source = Some(self.mark_for(rates, row, BaseSet::Source));
            }
        }
        marks
    }

    /// Marks for every row, in row order.
    pub fn count(&self, rates: &RateTable, rows: &[TokenSetPair]) -> Vec<RowMarks> {
        rows.iter().map(|row| self.count_row(rates, row)).collect()
    }
}
