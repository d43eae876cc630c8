//! Typed artifacts flowing between pipeline stages.
//!
//! Each type encodes one stage of a row's working state, so stage ordering
//! is enforced by the type system: the aligner only accepts
//! [`TokenizedPair`]s, the rate counter only [`AlignedPair`]s, and the
//! marks counter only [`TokenSetPair`]s. Sequence-to-set conversion is
//! lossy for weight bookkeeping and therefore consumes the aligned form —
//! there is no way to aggregate marks over an unaligned sequence.

use rustc_hash::FxHashSet;

use crate::align::RowAlignment;
use crate::types::Token;

/// Sequence-state row: both sides tokenized and preprocessed, alignment
/// not yet run. Order matters for fuzzy-candidate selection.
#[derive(Debug, Clone, Default)]
pub struct TokenizedPair {
    pub client: Vec<Token>,
    pub source: Vec<Token>,
}

impl TokenizedPair {
    pub fn new(client: Vec<Token>, source: Vec<Token>) -> Self {
        Self { client, source }
    }
}

/// Post-alignment row: token sequences plus the row-scoped alignment
/// record. Source tokens already carry transformer-adjusted weights.
#[derive(Debug, Clone)]
pub struct AlignedPair {
    pub client: Vec<Token>,
    pub source: Vec<Token>,
    pub alignment: RowAlignment,
}

impl AlignedPair {
    /// Convert to set state. On duplicated values the first occurrence
    /// (and its weight) wins, matching sequence order.
    pub fn into_sets(self) -> TokenSetPair {
        let mut client = FxHashSet::default();
        for token in self.client {
            client.insert(token);
        }
        let mut source = FxHashSet::default();
        for token in self.source {
            source.insert(token);
        }
        TokenSetPair { client, source }
    }
}

/// Set-state row: the only form the marks counter accepts.
#[derive(Debug, Clone, Default)]
pub struct TokenSetPair {
    pub client: FxHashSet<Token>,
    pub source: FxHashSet<Token>,
}
