//! The missing-pair collaborator: rows whose join attribute is absent
//! never reach the q-gram pipeline, but when `allow_missing` is set, every
//! pair where at least one side is missing still belongs in the result.
//! Full dataframe concatenation is the orchestrator's caller's job; this
//! only enumerates the key pairs.

use std::collections::HashSet;
use std::hash::Hash;

use crate::options::Row;

/// Cross product of `(rows with a missing join value) x (the other side's
/// full row set)`, unioned over both directions and deduplicated so a pair
/// missing on *both* sides isn't emitted twice.
pub fn cross_product<K, A>(left: &[Row<K, A>], right: &[Row<K, A>]) -> Vec<(usize, usize)>
where
    K: Eq + Hash,
{
    let mut pairs = HashSet::new();

    for (li, l) in left.iter().enumerate() {
        if l.join_str.is_none() {
            for ri in 0..right.len() {
                pairs.insert((li, ri));
            }
        }
    }
    for (ri, r) in right.iter().enumerate() {
        if r.join_str.is_none() {
            for li in 0..left.len() {
                pairs.insert((li, ri));
            }
        }
    }

    let mut pairs: Vec<(usize, usize)> = pairs.into_iter().collect();
    pairs.sort_unstable();
    pairs
}
