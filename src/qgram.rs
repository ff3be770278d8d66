//! The tokenizer collaborator interface and the ordered token vector
//! representation of a row's join string.
//!
//! The tokenizer is polymorphic over one capability set — `qval`,
//! `tokenize`, `get/set_return_set` — and no other tokenizer variant is
//! valid for this engine. Full tabular tokenization (column discovery,
//! multi-column join keys) stays with the collaborator that owns the input
//! tables; this module only needs the capability set the join entry point
//! actually calls.

use crate::errors::*;
use crate::token::{TokenId, TokenOrdering};

/// Produces q-grams for a join attribute and reports its own tuning
/// parameter and set/multiset mode. `tokenize` is fallible: a tokenizer
/// failure on one row is fatal to the whole join, not a silently skipped
/// row.
pub trait Tokenizer {
    /// Length of each q-gram. Must be a positive integer.
    fn qval(&self) -> usize;

    /// q-grams of `s`, in order of occurrence; duplicates retained unless
    /// `return_set()` is true. The engine always forces this false for
    /// the duration of a join.
    fn tokenize(&self, s: &str) -> Result<Vec<Vec<u8>>>;

    fn return_set(&self) -> bool;
    fn set_return_set(&mut self, value: bool);
}

/// Forces a tokenizer's `return_set` flag off for the duration of a join
/// and restores the original value on every exit path, including one that
/// unwinds through it — the only mutation of an external object this
/// engine performs must be restored no matter how the join exits.
pub struct ReturnSetGuard<'a, T: Tokenizer + ?Sized> {
    tokenizer: &'a mut T,
    previous: bool,
}

impl<'a, T: Tokenizer + ?Sized> ReturnSetGuard<'a, T> {
    pub fn engage(tokenizer: &'a mut T) -> Self {
        let previous = tokenizer.return_set();
        tokenizer.set_return_set(false);
        Self { tokenizer, previous }
    }
}

impl<'a, T: Tokenizer + ?Sized> Drop for ReturnSetGuard<'a, T> {
    fn drop(&mut self) {
        self.tokenizer.set_return_set(self.previous);
    }
}

impl<'a, T: Tokenizer + ?Sized> std::ops::Deref for ReturnSetGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.tokenizer
    }
}

impl<'a, T: Tokenizer + ?Sized> std::ops::DerefMut for ReturnSetGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.tokenizer
    }
}

/// The default q-gram tokenizer: overlapping byte windows of length
/// `qval`. A string shorter than `qval` has zero q-grams.
#[derive(Clone, Debug)]
pub struct QGramTokenizer {
    qval: usize,
    return_set: bool,
}

impl QGramTokenizer {
    pub fn new(qval: usize) -> Self {
        Self {
            qval,
            return_set: false,
        }
    }
}

impl Tokenizer for QGramTokenizer {
    fn qval(&self) -> usize {
        self.qval
    }

    fn tokenize(&self, s: &str) -> Result<Vec<Vec<u8>>> {
        if self.qval == 0 {
            bail!(ErrorKind::InvalidTokenizer("qval must be >= 1".to_string()));
        }
        let bytes = s.as_bytes();
        if bytes.len() < self.qval {
            return Ok(Vec::new());
        }
        let grams: Vec<Vec<u8>> = bytes.windows(self.qval).map(|w| w.to_vec()).collect();
        if self.return_set {
            let mut seen = std::collections::HashSet::new();
            Ok(grams.into_iter().filter(|g| seen.insert(g.clone())).collect())
        } else {
            Ok(grams)
        }
    }

    fn return_set(&self) -> bool {
        self.return_set
    }

    fn set_return_set(&mut self, value: bool) {
        self.return_set = value;
    }
}

/// The ordered token vector of a row: its q-grams mapped through the
/// global `TokenOrdering` and sorted ascending by id, with duplicates
/// retained.
#[derive(Clone, Debug, Default)]
pub struct OrderedTokenVector {
    ids: Vec<TokenId>,
}

impl OrderedTokenVector {
    pub fn build(raw_tokens: &[Vec<u8>], ordering: &TokenOrdering) -> Self {
        let mut ids: Vec<TokenId> = raw_tokens
            .iter()
            .map(|t| {
                ordering
                    .id_of(t)
                    .expect("token missing from global ordering built over the same inputs")
            })
            .collect();
        ids.sort_unstable();
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `p(m) = min(q·τ + 1, m)` — the prefix length past which two rows
    /// with `d ≤ τ` are guaranteed to share a token.
    pub fn prefix_len(&self, q: usize, tau: usize) -> usize {
        std::cmp::min(q * tau + 1, self.ids.len())
    }

    pub fn prefix(&self, q: usize, tau: usize) -> &[TokenId] {
        &self.ids[..self.prefix_len(q, tau)]
    }
}
