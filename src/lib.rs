//! Weighted fuzzy token matching for product-listing reconciliation.
//!
//! Given a batch of candidate pairs — a client catalog name against a
//! scraped source listing — this crate decides, per row, how likely the
//! two free-text names refer to the same product:
//!
//! 1. both names are stripped of noise symbols and tokenized;
//! 2. client tokens are aligned with source tokens (exact value match
//!    preferred, else best approximate similarity above a threshold);
//! 3. a corpus-wide rarity table weights each token inversely to its
//!    frequency across the whole batch;
//! 4. per row, a rarity-weighted set-similarity mark is aggregated over a
//!    configurable base set and thresholded into a boolean decision.
//!
//! # Quick start
//!
//! ```
//! use jakkar::{Batch, FuzzyJakkarValidator};
//!
//! let validator = FuzzyJakkarValidator::builder()
//!     .fuzzy_threshold(65)
//!     .validation_threshold(0.05)
//!     .build()
//!     .unwrap();
//!
//! let batch = Batch::from_pairs(vec![("Шампунь Dove 250 мл", "dove shampoo 250ml")]);
//! let output = validator.validate(batch, None).unwrap();
//! assert_eq!(output.batch.rows[0].validated, Some(true));
//! ```
//!
//! Alignment is the dominant cost; pass `Some(&rayon::ThreadPool)` to
//! `validate` to fan it out over contiguous batch partitions with
//! order-preserving recombination.

pub mod align;
pub mod error;
pub mod marks;
pub mod pipeline;
pub mod rate;
pub mod tokenize;
pub mod types;

pub use align::{ConfidenceDiscount, FuzzyAligner, KeepWeight, TokenTransformer};
pub use error::JakkarError;
pub use marks::{BaseSet, MarksCounter, MarksMode};
pub use pipeline::{FuzzyJakkarValidator, JakkarBuilder, ValidationOutput};
pub use rate::{RateCounter, RateFunction, RateTable};
pub use tokenize::preprocess::{Preprocessor, TokenFilter};
pub use tokenize::{BasicTokenizer, CharClassTokenizer, LanguageWeights, Tokenizer};
pub use types::{columns, Batch, Row, Token};
