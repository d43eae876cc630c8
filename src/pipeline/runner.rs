//! Batch validation runner — orchestrates stage execution and artifact
//! flow.
//!
//! [`FuzzyJakkarValidator`] holds a statically-composed set of stage
//! implementations. Calling [`FuzzyJakkarValidator::validate`] executes
//! them in order over the whole batch, threading typed artifacts between
//! stages; every transition is total, so a fatal error aborts the call
//! before any output column is written — there is no partial state.
//!
//! # Static dispatch
//!
//! The validator is generic over its tokenizer, preprocessor, and token
//! transformer, so each configuration monomorphizes into a concrete type.
//! Use [`JakkarBuilder`] to assemble one without spelling out the
//! generics.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use rayon::ThreadPool;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::align::{ConfidenceDiscount, FuzzyAligner, TokenTransformer};
use crate::error::JakkarError;
use crate::marks::{MarksCounter, MarksMode, RowMarks};
use crate::pipeline::artifacts::{AlignedPair, TokenSetPair, TokenizedPair};
use crate::rate::{RateCounter, RateTable};
use crate::tokenize::preprocess::{Preprocessor, TokenFilter};
use crate::tokenize::{BasicTokenizer, Tokenizer};
use crate::types::{columns, Batch};

/// Stage names reported in log events.
pub const STAGE_CLEAN: &str = "clean";
pub const STAGE_TOKENIZE: &str = "tokenize";
pub const STAGE_PREPROCESS: &str = "preprocess";
pub const STAGE_ALIGN: &str = "align";
pub const STAGE_RATE: &str = "rate";
pub const STAGE_SETS: &str = "sets";
pub const STAGE_MARKS: &str = "marks";
pub const STAGE_THRESHOLD: &str = "threshold";
pub const STAGE_FINALIZE: &str = "finalize";

/// Characters stripped from both text columns before tokenization.
pub const DEFAULT_STRIP_SYMBOLS: &[char] = &['\'', '"', '/'];

/// Result of one `validate` call: the batch with output columns written,
/// plus the exact set of column names the caller should merge back.
#[derive(Debug)]
pub struct ValidationOutput {
    pub batch: Batch,
    pub returning_columns: Vec<String>,
}

// ============================================================================
// FuzzyJakkarValidator
// ============================================================================

/// The weighted fuzzy text-similarity validator.
///
/// Construction-time configuration is immutable for the lifetime of the
/// object. See [`JakkarBuilder`] for assembly and validation of the
/// configuration surface.
#[derive(Debug, Clone)]
pub struct FuzzyJakkarValidator<Tok = BasicTokenizer, Pre = Preprocessor, Tr = ConfidenceDiscount> {
    tokenizer: Tok,
    preprocessor: Pre,
    aligner: FuzzyAligner<Tr>,
    rate_counter: RateCounter,
    marks_counter: MarksCounter,
    validation_threshold: f64,
    strip_symbols: Vec<char>,
    debug: bool,
    rate_dump_path: Option<PathBuf>,
    returning_columns: Vec<String>,
}

impl FuzzyJakkarValidator {
    /// Builder with default stages: [`BasicTokenizer`], [`Preprocessor`]
    /// with minimum length 2, and the default confidence-discount
    /// transformer.
    pub fn builder() -> JakkarBuilder {
        JakkarBuilder::new()
    }
}

impl<Tok, Pre, Tr> FuzzyJakkarValidator<Tok, Pre, Tr>
where
    Tok: Tokenizer,
    Pre: TokenFilter,
    Tr: TokenTransformer,
{
    /// Column names this configuration will write.
    pub fn returning_columns(&self) -> &[String] {
        &self.returning_columns
    }

    fn clean(&self, text: &str) -> String {
        text.chars()
            .filter(|c| !self.strip_symbols.contains(c))
            .collect()
    }

    fn tokenize_rows(&self, batch: &Batch) -> Vec<TokenizedPair> {
        batch
            .rows
            .iter()
            .map(|row| {
                let client = self.tokenizer.tokenize(&self.clean(&row.client_name));
                let source = self.tokenizer.tokenize(&self.clean(&row.source_row));
                TokenizedPair::new(client, source)
            })
            .collect()
    }

    fn preprocess_rows(&self, rows: Vec<TokenizedPair>) -> Vec<TokenizedPair> {
        rows.into_iter()
            .map(|pair| {
                TokenizedPair::new(
                    self.preprocessor.filter(pair.client),
                    self.preprocessor.filter(pair.source),
                )
            })
            .collect()
    }

    fn export_rates(&self, table: &RateTable) {
        let Some(path) = &self.rate_dump_path else {
            return;
        };
        let written = File::create(path).and_then(|file| {
            serde_json::to_writer_pretty(BufWriter::new(file), &table.sorted_entries())
                .map_err(std::io::Error::from)
        });
        match written {
            Ok(()) => debug!(path = %path.display(), entries = table.len(), "rate table exported"),
            // Observational only: the dump never affects validation.
            Err(error) => warn!(path = %path.display(), %error, "rate table export failed"),
        }
    }

    fn token_values(tokens: &[crate::types::Token]) -> Value {
        Value::Array(
            tokens
                .iter()
                .map(|t| Value::String(t.value.clone()))
                .collect(),
        )
    }

    fn finalize(
        &self,
        mut batch: Batch,
        aligned: &[AlignedPair],
        marks: Vec<RowMarks>,
    ) -> Batch {
        for ((row, row_marks), pair) in batch.rows.iter_mut().zip(marks).zip(aligned) {
            if let Some(mark) = row_marks.union {
                row.extra.insert(columns::MARKS_UNION.into(), json!(mark));
            }
            if let Some(mark) = row_marks.client {
                row.extra.insert(columns::MARKS_CLIENT.into(), json!(mark));
            }
            if let Some(mark) = row_marks.source {
                row.extra.insert(columns::MARKS_SOURCE.into(), json!(mark));
            }

            let mark = self.marks_counter.authoritative_mark(&row_marks);
            // Downgrade-only: a prior reject stands even above threshold.
            let accepted = mark >= self.validation_threshold && row.validated.unwrap_or(true);
            row.validated = Some(accepted);
            row.extra.insert(columns::VALIDATED.into(), json!(accepted));

            if self.debug {
                row.extra
                    .insert(columns::CLIENT_TOKENS.into(), Self::token_values(&pair.client));
                row.extra
                    .insert(columns::SOURCE_TOKENS.into(), Self::token_values(&pair.source));
            }
        }
        batch
    }

    /// Run the full stage sequence over `batch`.
    ///
    /// `pool`, when supplied, is borrowed for the alignment stage only;
    /// partitioned execution preserves row order exactly (see
    /// [`FuzzyAligner::align_batch`]). A panic inside a partition
    /// propagates and aborts the call with no partial results.
    pub fn validate(
        &self,
        batch: Batch,
        pool: Option<&ThreadPool>,
    ) -> Result<ValidationOutput, JakkarError> {
        info!(rows = batch.len(), "fuzzy jakkar validation started");

        debug!(stage = STAGE_CLEAN, "stripping noise symbols");
        debug!(stage = STAGE_TOKENIZE, "tokenizing both sides");
        let tokenized = self.tokenize_rows(&batch);

        debug!(stage = STAGE_PREPROCESS, "filtering token sequences");
        let preprocessed = self.preprocess_rows(tokenized);

        debug!(stage = STAGE_ALIGN, parallel = pool.is_some(), "running fuzzy search");
        let aligned = self.aligner.align_batch(preprocessed, pool);

        debug!(stage = STAGE_RATE, "building rarity rate table");
        let rates = self.rate_counter.count(&aligned);
        if self.debug {
            self.export_rates(&rates);
        }

        debug!(stage = STAGE_SETS, "converting sequences to sets");
        let sets: Vec<TokenSetPair> = aligned.iter().cloned().map(AlignedPair::into_sets).collect();

        debug!(stage = STAGE_MARKS, "aggregating marks");
        let marks = self.marks_counter.count(&rates, &sets);

        debug!(stage = STAGE_THRESHOLD, threshold = self.validation_threshold, "thresholding");
        debug!(stage = STAGE_FINALIZE, "writing output columns");
        let batch = self.finalize(batch, &aligned, marks);

        info!(
            rows = batch.len(),
            validated = batch
                .rows
                .iter()
                .filter(|r| r.validated == Some(true))
                .count(),
            "fuzzy jakkar validation finished"
        );

        Ok(ValidationOutput {
            batch,
            returning_columns: self.returning_columns.clone(),
        })
    }
}

// ============================================================================
// JakkarBuilder
// ============================================================================

/// Fluent builder for [`FuzzyJakkarValidator`].
///
/// Knob setters return `Self`; stage-override setters change the generic
/// parameters. `build()` validates the whole configuration surface and is
/// the only way to obtain a validator.
///
/// ```
/// # use jakkar::pipeline::runner::JakkarBuilder;
/// # use jakkar::marks::{BaseSet, MarksMode};
/// let validator = JakkarBuilder::new()
///     .fuzzy_threshold(75)
///     .marks_mode(MarksMode::Multiple { authoritative: BaseSet::Union })
///     .validation_threshold(0.5)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct JakkarBuilder<Tok = BasicTokenizer, Pre = Preprocessor, Tr = ConfidenceDiscount> {
    tokenizer: Tok,
    preprocessor: Pre,
    transformer: Tr,
    fuzzy_threshold: u8,
    rate_counter: RateCounter,
    marks_mode: MarksMode,
    validation_threshold: f64,
    strip_symbols: Vec<char>,
    debug: bool,
    rate_dump_path: Option<PathBuf>,
}

impl JakkarBuilder {
    pub fn new() -> Self {
        Self {
            tokenizer: BasicTokenizer,
            preprocessor: Preprocessor::default(),
            transformer: ConfidenceDiscount::default(),
            fuzzy_threshold: 75,
            rate_counter: RateCounter::default(),
            marks_mode: MarksMode::Single(crate::marks::BaseSet::Union),
            validation_threshold: 0.5,
            strip_symbols: DEFAULT_STRIP_SYMBOLS.to_vec(),
            debug: false,
            rate_dump_path: None,
        }
    }
}

impl Default for JakkarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tok, Pre, Tr> JakkarBuilder<Tok, Pre, Tr> {
    /// Override the tokenizer stage.
    pub fn tokenizer<T2: Tokenizer>(self, tokenizer: T2) -> JakkarBuilder<T2, Pre, Tr> {
        JakkarBuilder {
            tokenizer,
            preprocessor: self.preprocessor,
            transformer: self.transformer,
            fuzzy_threshold: self.fuzzy_threshold,
            rate_counter: self.rate_counter,
            marks_mode: self.marks_mode,
            validation_threshold: self.validation_threshold,
            strip_symbols: self.strip_symbols,
            debug: self.debug,
            rate_dump_path: self.rate_dump_path,
        }
    }

    /// Override the preprocessor stage.
    pub fn preprocessor<P2: TokenFilter>(self, preprocessor: P2) -> JakkarBuilder<Tok, P2, Tr> {
        JakkarBuilder {
            tokenizer: self.tokenizer,
            preprocessor,
            transformer: self.transformer,
            fuzzy_threshold: self.fuzzy_threshold,
            rate_counter: self.rate_counter,
            marks_mode: self.marks_mode,
            validation_threshold: self.validation_threshold,
            strip_symbols: self.strip_symbols,
            debug: self.debug,
            rate_dump_path: self.rate_dump_path,
        }
    }

    /// Override the token transformer invoked on successful pairings.
    pub fn transformer<T2: TokenTransformer>(self, transformer: T2) -> JakkarBuilder<Tok, Pre, T2> {
        JakkarBuilder {
            tokenizer: self.tokenizer,
            preprocessor: self.preprocessor,
            transformer,
            fuzzy_threshold: self.fuzzy_threshold,
            rate_counter: self.rate_counter,
            marks_mode: self.marks_mode,
            validation_threshold: self.validation_threshold,
            strip_symbols: self.strip_symbols,
            debug: self.debug,
            rate_dump_path: self.rate_dump_path,
        }
    }

    /// Minimum fuzzy similarity score (0–100) for a pairing.
    pub fn fuzzy_threshold(mut self, threshold: u8) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Rarity rate derivation parameters.
    pub fn rate_counter(mut self, rate_counter: RateCounter) -> Self {
        self.rate_counter = rate_counter;
        self
    }

    /// Aggregation mode, including the authoritative mark under multiple.
    pub fn marks_mode(mut self, mode: MarksMode) -> Self {
        self.marks_mode = mode;
        self
    }

    /// Minimum authoritative mark for a row to be validated.
    pub fn validation_threshold(mut self, threshold: f64) -> Self {
        self.validation_threshold = threshold;
        self
    }

    /// Characters stripped from both text columns before tokenization.
    pub fn strip_symbols(mut self, symbols: &[char]) -> Self {
        self.strip_symbols = symbols.to_vec();
        self
    }

    /// Keep token-sequence debug columns in the output and enable the
    /// rate-table dump (when a path is set).
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Where to write the rate-table dump in debug mode.
    pub fn rate_dump_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rate_dump_path = Some(path.into());
        self
    }

    /// Validate the configuration and produce the validator.
    pub fn build(self) -> Result<FuzzyJakkarValidator<Tok, Pre, Tr>, JakkarError>
    where
        Tok: Tokenizer,
        Pre: TokenFilter,
        Tr: TokenTransformer,
    {
        if !(0.0..=1.0).contains(&self.validation_threshold) {
            return Err(JakkarError::ValidationThreshold(self.validation_threshold));
        }

        let aligner = FuzzyAligner::with_transformer(self.fuzzy_threshold, self.transformer)?;
        let marks_counter = MarksCounter::new(self.marks_mode);

        let mut returning_columns: Vec<String> = marks_counter
            .mode()
            .columns()
            .into_iter()
            .map(String::from)
            .collect();
        returning_columns.push(columns::VALIDATED.to_string());
        if self.debug {
            returning_columns.push(columns::CLIENT_TOKENS.to_string());
            returning_columns.push(columns::SOURCE_TOKENS.to_string());
        }

        Ok(FuzzyJakkarValidator {
            tokenizer: self.tokenizer,
            preprocessor: self.preprocessor,
            aligner,
            rate_counter: self.rate_counter,
            marks_counter,
            validation_threshold: self.validation_threshold,
            strip_symbols: self.strip_symbols,
            debug: self.debug,
            rate_dump_path: self.rate_dump_path,
            returning_columns,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
