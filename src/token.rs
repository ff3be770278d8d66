//! Global token ordering: q-grams across both input tables are ranked by
//! ascending combined document frequency, ties broken lexicographically on
//! the q-gram bytes, and assigned dense ids in `[0, V)`. Low-frequency
//! tokens land on small ids, which concentrates them at the front of every
//! ordered token vector's prefix and is what makes the prefix filter
//! selective.

use indexmap::IndexSet;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A dense identifier assigned to a distinct q-gram by `TokenOrdering`.
pub type TokenId = usize;

/// Insertion order into the backing `IndexSet` *is* the token id, computed
/// once up front instead of being re-derived (and re-cloned) on every
/// lookup.
#[derive(Debug, Default)]
pub struct TokenOrdering {
    order: IndexSet<Vec<u8>>,
}

impl TokenOrdering {
    /// Build the ordering from the raw q-gram streams of both tables.
    /// `left` and `right` each yield one token sequence per row; a q-gram
    /// occurring only on one side still has a combined frequency (the
    /// other side contributes 0).
    pub fn build<'a, L, R>(left: L, right: R) -> Self
    where
        L: IntoIterator<Item = &'a [Vec<u8>]>,
        R: IntoIterator<Item = &'a [Vec<u8>]>,
    {
        let mut freq: HashMap<Vec<u8>, usize> = HashMap::new();
        for row in left {
            for tok in row {
                *freq.entry(tok.clone()).or_insert(0) += 1;
            }
        }
        for row in right {
            for tok in row {
                *freq.entry(tok.clone()).or_insert(0) += 1;
            }
        }

        let mut tokens: Vec<(Vec<u8>, usize)> = freq.into_iter().collect();
        tokens.par_sort_unstable_by(|(a_tok, a_freq), (b_tok, b_freq)| {
            match a_freq.cmp(b_freq) {
                Ordering::Equal => a_tok.cmp(b_tok),
                other => other,
            }
        });

        let order: IndexSet<Vec<u8>> = tokens.into_iter().map(|(tok, _freq)| tok).collect();
        Self { order }
    }

    /// The id assigned to a q-gram, or `None` if it never occurred on
    /// either side this ordering was built from.
    pub fn id_of(&self, token: &[u8]) -> Option<TokenId> {
        self.order.get_index_of(token)
    }

    /// `V`, the total distinct q-gram count across both tables.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
