//! The q-gram prefix inverted index: maps a token id to the sorted,
//! deduplicated list of left row ids whose ordered-token-vector prefix
//! contains it, plus the size (token count) of every left row.
//!
//! Built once by the orchestrator before the driver starts; read-only and
//! immutable for the lifetime of the join.

use std::collections::HashMap;

use crate::qgram::OrderedTokenVector;
use crate::token::TokenId;

#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<TokenId, Vec<usize>>,
    size_vector: Vec<usize>,
}

impl InvertedIndex {
    /// Builds the index over the left table's ordered token vectors.
    ///
    /// For left row `i` with vector `T_i` of size `m_i`, the prefix length
    /// is `p_i = min(q*tau + 1, m_i)`; every token in that prefix gets `i`
    /// appended to its posting list. Duplicate q-grams within one row's
    /// prefix are deduplicated per `(token, row)` rather than inserted
    /// twice: since a row's prefix tokens are visited in ascending id
    /// order, repeats of the same token land as consecutive pushes, so
    /// checking the list's last entry is sufficient.
    pub fn build(q: usize, tau: usize, left_vectors: &[OrderedTokenVector]) -> Self {
        let mut postings: HashMap<TokenId, Vec<usize>> = HashMap::new();
        let mut size_vector = Vec::with_capacity(left_vectors.len());

        for (i, vector) in left_vectors.iter().enumerate() {
            size_vector.push(vector.len());
            for &tok in vector.prefix(q, tau) {
                let list = postings.entry(tok).or_insert_with(Vec::new);
                if list.last() != Some(&i) {
                    list.push(i);
                }
            }
        }

        Self {
            postings,
            size_vector,
        }
    }

    pub fn postings_of(&self, token: TokenId) -> Option<&[usize]> {
        self.postings.get(&token).map(Vec::as_slice)
    }

    /// `size_vector[left_row_id]`: the token-vector length of a left row.
    pub fn size_of(&self, left_row_id: usize) -> usize {
        self.size_vector[left_row_id]
    }

    pub fn left_len(&self) -> usize {
        self.size_vector.len()
    }
}
