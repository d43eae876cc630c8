//! The fuzzy aligner: per-row best-counterpart search plus partitioned
//! batch execution.

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::debug;

use crate::align::scorer::best_match;
use crate::align::transform::{ConfidenceDiscount, TokenTransformer};
use crate::align::{Pairing, RowAlignment};
use crate::error::JakkarError;
use crate::pipeline::artifacts::{AlignedPair, TokenizedPair};
use crate::types::Token;

/// Pairs client tokens with source tokens, exact match first, fuzzy
/// fallback above a 0–100 threshold.
///
/// Alignment is row-local and pure: partition boundaries never change the
/// result for any row, which is what makes [`FuzzyAligner::align_batch`]
/// safe to fan out over a borrowed thread pool.
#[derive(Debug, Clone)]
pub struct FuzzyAligner<T = ConfidenceDiscount> {
    threshold: u8,
    transformer: T,
}

impl FuzzyAligner<ConfidenceDiscount> {
    /// Aligner with the default [`ConfidenceDiscount`] transformer.
    ///
    /// `threshold` is the minimum similarity score for a fuzzy pairing;
    /// values above 100 are a configuration error.
    pub fn new(threshold: u8) -> Result<Self, JakkarError> {
        Self::with_transformer(threshold, ConfidenceDiscount::default())
    }
}

impl<T: TokenTransformer> FuzzyAligner<T> {
    /// Aligner with a custom transformer.
    pub fn with_transformer(threshold: u8, transformer: T) -> Result<Self, JakkarError> {
        if threshold > 100 {
            return Err(JakkarError::FuzzyThreshold(u32::from(threshold)));
        }
        Ok(Self {
            threshold,
            transformer,
        })
    }

    /// Find all pairings for one row without touching the tokens.
    ///
    /// Exact value matches win unconditionally and skip scoring entirely.
    /// Otherwise the best-scoring source candidate is paired when it clears
    /// the threshold; ties go to the earliest candidate. A source token
    /// stays eligible after being paired.
    pub fn align_row(&self, client: &[Token], source: &[Token]) -> RowAlignment {
        let mut pairings = Vec::new();

        for (client_idx, client_token) in client.iter().enumerate() {
            if let Some(source_idx) = source.iter().position(|s| s.value == client_token.value) {
                pairings.push(Pairing {
                    client: client_idx,
                    source: source_idx,
                    score: 100.0,
                    exact: true,
                });
                continue;
            }

            match best_match(&client_token.value, source) {
                Some((source_idx, score)) if score >= f64::from(self.threshold) => {
                    pairings.push(Pairing {
                        client: client_idx,
                        source: source_idx,
                        score,
                        exact: false,
                    });
                }
                Some(_) => {}
                None => {
                    // Nothing to score against; the token stays unmatched
                    // and the row keeps going.
                    debug!(token = %client_token.value, "no source candidates for token");
                }
            }
        }

        RowAlignment { pairings }
    }

    /// Align one row and apply the transformer to every paired source
    /// token, rebuilding rather than mutating.
    pub fn align_pair(&self, pair: TokenizedPair) -> AlignedPair {
        let alignment = self.align_row(&pair.client, &pair.source);
        let TokenizedPair { client, mut source } = pair;

        for pairing in &alignment.pairings {
            let weight = self.transformer.transform(
                &source[pairing.source],
                &client[pairing.client],
                pairing.exact,
            );
            source[pairing.source] = source[pairing.source].with_weight(weight);
        }

        AlignedPair {
            client,
            source,
            alignment,
        }
    }

    /// Align a batch of independent rows, optionally over a borrowed pool.
    ///
    /// With a pool, the batch splits into contiguous partitions (one per
    /// pool thread); partitions are reassembled by explicit index order,
    /// so output row order always equals input row order and per-row
    /// results are identical to the single-threaded path. A panic in any
    /// partition propagates and aborts the batch — no partial results.
    pub fn align_batch(
        &self,
        rows: Vec<TokenizedPair>,
        pool: Option<&ThreadPool>,
    ) -> Vec<AlignedPair> {
        let Some(pool) = pool else {
            return rows.into_iter().map(|pair| self.align_pair(pair)).collect();
        };

        let workers = pool.current_num_threads().max(1);
        let chunk_size = rows.len().div_ceil(workers).max(1);

        let mut partitions = Vec::with_capacity(workers);
        let mut rest = rows;
        while rest.len() > chunk_size {
            let tail = rest.split_off(chunk_size);
            partitions.push(rest);
            rest = tail;
        }
        partitions.push(rest);

        let mut aligned: Vec<(usize, Vec<AlignedPair>)> = pool.install(|| {
            partitions
                .into_par_iter()
                .enumerate()
                .map(|(index, partition)| {
                    let part = partition
                        .into_iter()
                        .map(|pair| self.align_pair(pair))
                        .collect();
                    (index, part)
                })
                .collect()
        });

        // Stable reassembly in original partition order.
        aligned.sort_by_key(|&(index, _)| index);
        aligned.into_iter().flat_map(|(_, part)| part).collect()
    }
}
