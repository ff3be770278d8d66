//! The parallel driver and the join orchestrator: end-to-end, this is the
//! crate's single entry point — tokenize both tables, build the left index
//! once, fan the right side out across a worker pool, and materialize the
//! result.

use std::hash::Hash;

use crossbeam_channel::unbounded;
use rayon::prelude::*;

#[cfg(feature = "cli")]
use crate::cli::ProgressBarBuilder;
#[cfg(feature = "cli")]
use indicatif::{ParallelProgressIterator, ProgressBar};

use crate::errors::*;
use crate::index::InvertedIndex;
use crate::missing;
use crate::options::{resolve_n_jobs, CompOp, JoinOptions, Row};
use crate::output::OutputRow;
use crate::qgram::{OrderedTokenVector, ReturnSetGuard, Tokenizer};
use crate::token::TokenOrdering;
use crate::validate;
use crate::verification::{verify_right_row, CandidateScratch};

/// Splits `[0, r)` into `n_jobs` contiguous, near-equal ranges, clamped to
/// `[1, r]`.
fn partitions(r: usize, n_jobs: usize) -> Vec<(usize, usize)> {
    if r == 0 {
        return Vec::new();
    }
    let n_jobs = n_jobs.clamp(1, r);
    let chunk = (r + n_jobs - 1) / n_jobs;
    (0..r)
        .step_by(chunk)
        .map(|start| (start, (start + chunk).min(r)))
        .collect()
}

/// Dispatches one task per partition over a rayon worker pool. Each task
/// owns its candidate scratch and output buffer and only reads shared,
/// immutable state. Tasks fan their results into an unbounded channel
/// tagged with partition index; the receiver sorts by that index before
/// flattening so concatenation is deterministic regardless of which task
/// finishes first.
#[allow(clippy::too_many_arguments)]
fn run_driver(
    left_strings: &[String],
    right_vectors: &[OrderedTokenVector],
    right_strings: &[String],
    index: &InvertedIndex,
    q: usize,
    tau: usize,
    comp_op: CompOp,
    n_jobs: usize,
) -> Vec<(usize, usize, usize)> {
    let parts = partitions(right_vectors.len(), n_jobs);
    let (tx, rx) = unbounded::<(usize, Vec<(usize, usize, usize)>)>();

    #[cfg(not(feature = "cli"))]
    let parts_iter = parts.par_iter().enumerate();
    #[cfg(feature = "cli")]
    let parts_iter;
    #[cfg(feature = "cli")]
    {
        let pbar: ProgressBar = ProgressBarBuilder::new(parts.len(), "Joining").build();
        parts_iter = parts.par_iter().enumerate().progress_with(pbar);
    }

    parts_iter.for_each(|(part_idx, &(start, end))| {
        #[cfg(feature = "cli")]
        trace!("partition {}: right rows [{}, {})", part_idx, start, end);
        let mut scratch = CandidateScratch::new();
        let mut partition_out = Vec::new();

        for r_idx in start..end {
            let mut matches = Vec::new();
            verify_right_row(
                &mut scratch,
                &right_vectors[r_idx],
                &right_strings[r_idx],
                q,
                tau,
                comp_op,
                index,
                left_strings,
                &mut matches,
            );
            partition_out.extend(matches.into_iter().map(|(l_id, d)| (l_id, r_idx, d)));
        }

        tx.send((part_idx, partition_out))
            .expect("receiver outlives every sender: collected below before tx is dropped");
    });
    drop(tx);

    let mut collected: Vec<(usize, Vec<(usize, usize, usize)>)> = Vec::new();
    while let Ok(item) = rx.recv() {
        collected.push(item);
    }
    collected.sort_unstable_by_key(|(idx, _)| *idx);
    collected.into_iter().flat_map(|(_, v)| v).collect()
}

fn tokenize_present<K, A, T: Tokenizer>(
    rows: &[Row<K, A>],
    present: &[usize],
    tokenizer: &T,
    side: &str,
) -> Result<Vec<Vec<Vec<u8>>>> {
    present
        .iter()
        .map(|&i| {
            let s = rows[i]
                .join_str
                .as_ref()
                .expect("present index always has a join_str");
            tokenizer
                .tokenize(s)
                .chain_err(|| ErrorKind::TokenizationFailed(format!("{} row index {}", side, i)))
        })
        .collect()
}

/// The join entry point: validates the option surface it can check without
/// table-schema knowledge, drops rows with a missing join value, tokenizes
/// both sides under a forced `return_set = false`, builds the left index
/// once, runs the driver, and materializes output rows.
///
/// Full column/attribute-existence validation (`UnknownAttribute`,
/// `InvalidOutputAttribute`) is the external validation collaborator's job
/// and should run against the caller's table schema via
/// [`crate::validate::validate_out_attrs`] before this function is called;
/// this function re-checks only what it can see from `opts` and the rows
/// themselves (key uniqueness, threshold, tokenizer).
pub fn ed_join<K, A, T>(
    left_rows: &[Row<K, A>],
    right_rows: &[Row<K, A>],
    opts: &mut JoinOptions<T>,
) -> Result<Vec<OutputRow<K, A>>>
where
    K: Clone + Eq + Hash,
    A: Clone,
    T: Tokenizer,
{
    validate::validate_threshold(opts.threshold)?;
    validate::validate_tokenizer(&opts.tokenizer)?;
    let l_keys: Vec<K> = left_rows.iter().map(|r| r.key.clone()).collect();
    let r_keys: Vec<K> = right_rows.iter().map(|r| r.key.clone()).collect();
    validate::validate_unique_keys(&l_keys)?;
    validate::validate_unique_keys(&r_keys)?;

    let tau = opts.tau()?;
    let q = opts.tokenizer.qval();

    // Drop rows with a missing join attribute; keep their original indices
    // so output assembly can map back to full rows (key, out_attrs).
    let left_present: Vec<usize> = (0..left_rows.len())
        .filter(|&i| left_rows[i].join_str.is_some())
        .collect();
    let right_present: Vec<usize> = (0..right_rows.len())
        .filter(|&i| right_rows[i].join_str.is_some())
        .collect();

    // Tokenize both sides with return_set forced off for the duration,
    // restored on every exit path including this one's `?`s.
    let (left_raw, right_raw) = {
        let guard = ReturnSetGuard::engage(&mut opts.tokenizer);
        let left_raw = tokenize_present(left_rows, &left_present, &*guard, "left")?;
        let right_raw = tokenize_present(right_rows, &right_present, &*guard, "right")?;
        (left_raw, right_raw)
    };

    let ordering = TokenOrdering::build(
        left_raw.iter().map(Vec::as_slice),
        right_raw.iter().map(Vec::as_slice),
    );

    let left_vectors: Vec<OrderedTokenVector> = left_raw
        .iter()
        .map(|r| OrderedTokenVector::build(r, &ordering))
        .collect();
    let right_vectors: Vec<OrderedTokenVector> = right_raw
        .iter()
        .map(|r| OrderedTokenVector::build(r, &ordering))
        .collect();

    let left_strings: Vec<String> = left_present
        .iter()
        .map(|&i| left_rows[i].join_str.clone().unwrap())
        .collect();
    let right_strings: Vec<String> = right_present
        .iter()
        .map(|&i| right_rows[i].join_str.clone().unwrap())
        .collect();

    // Build the left index once.
    let index = InvertedIndex::build(q, tau, &left_vectors);
    #[cfg(feature = "cli")]
    debug!("left index built over {} rows", index.left_len());

    // Run the parallel driver.
    let n_jobs = resolve_n_jobs(opts.n_jobs);
    let raw_matches = run_driver(
        &left_strings,
        &right_vectors,
        &right_strings,
        &index,
        q,
        tau,
        opts.comp_op,
        n_jobs,
    );

    // Materialize output rows, score column optional.
    let mut next_id = 0usize;
    let mut outputs: Vec<OutputRow<K, A>> = raw_matches
        .into_iter()
        .map(|(l_local, r_local, d)| {
            let l_orig = left_present[l_local];
            let r_orig = right_present[r_local];
            let row = OutputRow::new(
                next_id,
                left_rows[l_orig].key.clone(),
                right_rows[r_orig].key.clone(),
                left_rows[l_orig].out_attrs.clone(),
                right_rows[r_orig].out_attrs.clone(),
                if opts.out_sim_score { Some(d) } else { None },
            );
            next_id += 1;
            row
        })
        .collect();

    // Optionally concatenate missing-value pairs.
    if opts.allow_missing {
        for (li, ri) in missing::cross_product(left_rows, right_rows) {
            outputs.push(OutputRow::new(
                next_id,
                left_rows[li].key.clone(),
                right_rows[ri].key.clone(),
                left_rows[li].out_attrs.clone(),
                right_rows[ri].out_attrs.clone(),
                None,
            ));
            next_id += 1;
        }
    }

    // `_id` was assigned contiguously above.
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qgram::QGramTokenizer;

    fn row(key: usize, join: Option<&str>) -> Row<usize, String> {
        Row::new(key, join.map(str::to_string), Vec::new())
    }

    fn opts(tau: f64) -> JoinOptions<QGramTokenizer> {
        let mut o = JoinOptions::new("id", "id", "s", "s", tau, QGramTokenizer::new(2));
        o.out_sim_score = true;
        o
    }

    #[test]
    fn s1_single_substitution_within_tau() {
        let left = vec![row(0, Some("cat"))];
        let right = vec![row(0, Some("bat"))];
        let mut o = opts(1.0);
        let out = ed_join(&left, &right, &mut o).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].l_key, 0);
        assert_eq!(out[0].r_key, 0);
        assert_eq!(out[0].sim_score, Some(1));
    }

    #[test]
    fn s2_no_shared_qgram_is_empty() {
        let left = vec![row(0, Some("cat"))];
        let right = vec![row(0, Some("dog"))];
        let mut o = opts(1.0);
        let out = ed_join(&left, &right, &mut o).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn s4_strings_shorter_than_q_never_match() {
        let left = vec![row(0, Some("a"))];
        let right = vec![row(0, Some("a"))];
        let mut o = opts(1.0);
        let out = ed_join(&left, &right, &mut o).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn s5_length_filter_excludes_mismatched_row() {
        let left = vec![row(0, Some("abcdef")), row(1, Some("xyzabc"))];
        let right = vec![row(0, Some("abcxef"))];
        let mut o = opts(1.0);
        let out = ed_join(&left, &right, &mut o).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].l_key, 0);
    }

    #[test]
    fn s6_threshold_controls_acceptance() {
        let left = vec![row(0, Some("kitten"))];
        let right = vec![row(0, Some("sitting"))];

        let mut too_tight = opts(2.0);
        assert!(ed_join(&left, &right, &mut too_tight).unwrap().is_empty());

        let mut loose_enough = opts(3.0);
        let out = ed_join(&left, &right, &mut loose_enough).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sim_score, Some(3));
    }

    #[test]
    fn duplicate_left_rows_both_appear() {
        let left = vec![row(0, Some("cat")), row(1, Some("cat"))];
        let right = vec![row(0, Some("bat"))];
        let mut o = opts(1.0);
        let out = ed_join(&left, &right, &mut o).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn output_count_is_independent_of_n_jobs() {
        let left: Vec<Row<usize, String>> = (0..20).map(|i| row(i, Some("abcdef"))).collect();
        let right: Vec<Row<usize, String>> = (0..20).map(|i| row(i, Some("abcdeg"))).collect();

        for n_jobs in [1, -1, 4] {
            let mut o = opts(1.0);
            o.n_jobs = n_jobs;
            let out = ed_join(&left, &right, &mut o).unwrap();
            assert_eq!(out.len(), 400, "n_jobs={} changed output cardinality", n_jobs);
        }
    }

    #[test]
    fn duplicate_keys_are_rejected_before_the_core_runs() {
        let left = vec![row(0, Some("cat")), row(0, Some("bat"))];
        let right = vec![row(0, Some("bat"))];
        let mut o = opts(1.0);
        assert!(ed_join(&left, &right, &mut o).is_err());
    }
}
