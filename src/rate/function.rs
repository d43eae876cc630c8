//! Frequency dampening functions for the rate counter.

use serde::{Deserialize, Serialize};

/// Monotone dampening applied to a token's raw frequency before inversion.
///
/// A closed enum rather than an arbitrary callable: the set of functions is
/// part of the configuration contract and has to serialize cleanly and
/// behave identically on both sides of a process boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateFunction {
    /// Use the frequency as-is: rate = 1/f.
    Identity,
    /// Square-root dampening: rate = 1/sqrt(f). Softens the penalty on
    /// very common tokens.
    Sqrt,
}

impl RateFunction {
    pub fn apply(&self, frequency: u64) -> f64 {
        match self {
            Self::Identity => frequency as f64,
            Self::Sqrt => (frequency as f64).sqrt(),
        }
    }

    /// User-facing name used in configuration and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Sqrt => "sqrt",
        }
    }
}

impl Default for RateFunction {
    fn default() -> Self {
        Self::Identity
    }
}
