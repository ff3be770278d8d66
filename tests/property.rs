//! Randomized property test: for random string pairs sharing at least one
//! q-gram, the engine's output must agree exactly with an independent
//! brute-force Levenshtein computation, under the chosen comparison
//! operator.

use std::collections::HashSet;

use ed_sim_join::matching::ed_join;
use ed_sim_join::options::{CompOp, JoinOptions, Row};
use ed_sim_join::qgram::QGramTokenizer;
use proptest::prelude::*;

/// A plain, uncapped Levenshtein DP kept independent of the crate's own
/// bounded kernel, so the property test isn't just testing the kernel
/// against itself.
fn brute_force_levenshtein(a: &str, b: &str) -> usize {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let mut dp = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        dp[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            dp[i][j] = if a[i - 1] == b[j - 1] {
                dp[i - 1][j - 1]
            } else {
                1 + dp[i - 1][j - 1].min(dp[i - 1][j]).min(dp[i][j - 1])
            };
        }
    }
    dp[a.len()][b.len()]
}

fn shares_qgram(a: &str, b: &str, q: usize) -> bool {
    if a.len() < q || b.len() < q {
        return false;
    }
    let grams_a: HashSet<&[u8]> = a.as_bytes().windows(q).collect();
    b.as_bytes().windows(q).any(|w| grams_a.contains(w))
}

fn mk_row(key: usize, s: &str) -> Row<usize, String> {
    Row::new(key, Some(s.to_string()), Vec::new())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn agrees_with_brute_force_when_qgram_shared(
        a in "[a-d]{3,10}",
        b in "[a-d]{3,10}",
        tau in 0usize..5,
    ) {
        let q = 2;
        prop_assume!(shares_qgram(&a, &b, q));

        let left = vec![mk_row(0, &a)];
        let right = vec![mk_row(0, &b)];
        let mut opts = JoinOptions::new("id", "id", "s", "s", tau as f64, QGramTokenizer::new(q));
        opts.out_sim_score = true;
        opts.comp_op = CompOp::Le;

        let out = ed_join(&left, &right, &mut opts).unwrap();
        let exact = brute_force_levenshtein(&a, &b);

        if exact <= tau {
            prop_assert_eq!(out.len(), 1);
            prop_assert_eq!(out[0].sim_score, Some(exact));
        } else {
            prop_assert!(out.is_empty());
        }
    }

    #[test]
    fn never_emits_a_pair_whose_token_counts_differ_by_more_than_tau(
        a in "[a-d]{2,12}",
        b in "[a-d]{2,12}",
        tau in 0usize..4,
    ) {
        let q = 2;
        let left = vec![mk_row(0, &a)];
        let right = vec![mk_row(0, &b)];
        let mut opts = JoinOptions::new("id", "id", "s", "s", tau as f64, QGramTokenizer::new(q));
        opts.comp_op = CompOp::Le;

        let out = ed_join(&left, &right, &mut opts).unwrap();
        if !out.is_empty() {
            let m_l = a.len().saturating_sub(q - 1);
            let m_r = b.len().saturating_sub(q - 1);
            prop_assert!(m_l.abs_diff(m_r) <= tau);
        }
    }
}
