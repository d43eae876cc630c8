//! Batch orchestration: typed stage artifacts and the validation runner.

pub mod artifacts;
pub mod runner;

pub use artifacts::{AlignedPair, TokenSetPair, TokenizedPair};
pub use runner::{FuzzyJakkarValidator, JakkarBuilder, ValidationOutput};
