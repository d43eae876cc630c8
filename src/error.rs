//! Error types for the validation engine.
//!
//! Only fatal, constructor-time configuration errors surface as `Err`.
//! Per-token scoring misses and rate-function degradations are recovered
//! locally (the affected token scores toward "no match") and logged via
//! `tracing` instead.

use thiserror::Error;

/// Fatal configuration errors, raised at construction time.
#[derive(Debug, Error, PartialEq)]
pub enum JakkarError {
    /// Fuzzy similarity threshold outside the 0–100 window.
    #[error("fuzzy threshold must be in range 0-100, got {0}")]
    FuzzyThreshold(u32),

    /// Validation threshold outside the accepted `[0.0, 1.0]` range.
    #[error("validation threshold must be in range 0.0-1.0, got {0}")]
    ValidationThreshold(f64),

    /// Rate clamp window with inverted bounds.
    #[error("rate clamp bounds inverted: min {min} > max {max}")]
    RateBounds { min: f64, max: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_offending_value() {
        let err = JakkarError::FuzzyThreshold(140);
        assert!(err.to_string().contains("140"));

        let err = JakkarError::ValidationThreshold(1.5);
        assert!(err.to_string().contains("1.5"));

        let err = JakkarError::RateBounds { min: 2.0, max: 1.0 };
        assert!(err.to_string().contains("min 2"));
    }
}
