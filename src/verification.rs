//! The candidate enumerator: probes the inverted index with a right row's
//! prefix tokens, unions postings into a candidate set, applies the length
//! filter, and verifies survivors with the bounded edit-distance kernel.

use std::collections::HashSet;

use crate::distance::edit_distance_bounded;
use crate::index::InvertedIndex;
use crate::options::CompOp;
use crate::qgram::OrderedTokenVector;

/// Per-task candidate set, reused across right rows.
#[derive(Default)]
pub struct CandidateScratch {
    set: HashSet<usize>,
}

impl CandidateScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn fill(&mut self, right_vector: &OrderedTokenVector, q: usize, tau: usize, index: &InvertedIndex) {
        self.set.clear();
        for &tok in right_vector.prefix(q, tau) {
            if let Some(list) = index.postings_of(tok) {
                self.set.extend(list.iter().copied());
            }
        }
        #[cfg(feature = "cli")]
        trace!("candidate set after prefix probe: {:?}", &self.set);
    }
}

/// `(left_row_id, edit_distance)` for one verified, accepted pair.
pub type Match = (usize, usize);

/// Runs candidate enumeration, the length filter, and edit-distance
/// verification for a single right row, appending every accepted
/// `(left_id, distance)` to `out`. Iteration order over the candidate set
/// is unspecified.
#[allow(clippy::too_many_arguments)]
pub fn verify_right_row(
    scratch: &mut CandidateScratch,
    right_vector: &OrderedTokenVector,
    right_string: &str,
    q: usize,
    tau: usize,
    comp_op: CompOp,
    index: &InvertedIndex,
    left_strings: &[String],
    out: &mut Vec<Match>,
) {
    scratch.fill(right_vector, q, tau, index);
    let m = right_vector.len();

    for &cand in scratch.set.iter() {
        let ml = index.size_of(cand);
        // Length filter in token-count units, not character units — see
        // DESIGN.md for why this form is kept over the tighter
        // character-length bound.
        if m.abs_diff(ml) > tau {
            continue;
        }

        let d = edit_distance_bounded(
            left_strings[cand].as_bytes(),
            right_string.as_bytes(),
            tau,
        );
        #[cfg(feature = "cli")]
        trace!("ed of `{}` against `{}`: {}", left_strings[cand], right_string, d);
        if comp_op.accepts(d, tau) {
            out.push((cand, d));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qgram::OrderedTokenVector;
    use crate::token::TokenOrdering;

    fn build_vector(raw: &[Vec<u8>], ordering: &TokenOrdering) -> OrderedTokenVector {
        OrderedTokenVector::build(raw, ordering)
    }

    #[test]
    fn candidate_within_tau_is_emitted() {
        // left = ["cat"], right = ["bat"], q=2, tau=1: bigrams "at" shared.
        let left_raw: Vec<Vec<u8>> = vec![b"ca".to_vec(), b"at".to_vec()];
        let right_raw: Vec<Vec<u8>> = vec![b"ba".to_vec(), b"at".to_vec()];
        let ordering = TokenOrdering::build(
            std::iter::once(left_raw.as_slice()),
            std::iter::once(right_raw.as_slice()),
        );
        let left_vector = build_vector(&left_raw, &ordering);
        let right_vector = build_vector(&right_raw, &ordering);
        let index = InvertedIndex::build(2, 1, &[left_vector]);

        let mut scratch = CandidateScratch::new();
        let mut out = Vec::new();
        verify_right_row(
            &mut scratch,
            &right_vector,
            "bat",
            2,
            1,
            CompOp::Le,
            &index,
            &["cat".to_string()],
            &mut out,
        );
        assert_eq!(out, vec![(0, 1)]);
    }

    #[test]
    fn length_filter_rejects_mismatched_token_counts() {
        let left_raw: Vec<Vec<u8>> = vec![b"ab".to_vec()];
        let right_raw: Vec<Vec<u8>> = vec![b"ab".to_vec(), b"bc".to_vec(), b"cd".to_vec(), b"de".to_vec()];
        let ordering = TokenOrdering::build(
            std::iter::once(left_raw.as_slice()),
            std::iter::once(right_raw.as_slice()),
        );
        let left_vector = build_vector(&left_raw, &ordering);
        let right_vector = build_vector(&right_raw, &ordering);
        // q*tau+1 with tau=3 >= left len, so left is fully indexed and would
        // share a token, but |1 - 4| = 3 > tau=1 after length filtering with tau=1.
        let index = InvertedIndex::build(2, 1, &[left_vector]);

        let mut scratch = CandidateScratch::new();
        let mut out = Vec::new();
        verify_right_row(
            &mut scratch,
            &right_vector,
            "bcdef",
            2,
            1,
            CompOp::Le,
            &index,
            &["ab".to_string()],
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn no_shared_qgram_means_no_candidate() {
        let left_raw: Vec<Vec<u8>> = vec![b"ca".to_vec(), b"at".to_vec()];
        let right_raw: Vec<Vec<u8>> = vec![b"do".to_vec(), b"og".to_vec()];
        let ordering = TokenOrdering::build(
            std::iter::once(left_raw.as_slice()),
            std::iter::once(right_raw.as_slice()),
        );
        let left_vector = build_vector(&left_raw, &ordering);
        let right_vector = build_vector(&right_raw, &ordering);
        let index = InvertedIndex::build(2, 1, &[left_vector]);

        let mut scratch = CandidateScratch::new();
        let mut out = Vec::new();
        verify_right_row(
            &mut scratch,
            &right_vector,
            "dog",
            2,
            1,
            CompOp::Le,
            &index,
            &["cat".to_string()],
            &mut out,
        );
        assert!(out.is_empty());
    }
}
