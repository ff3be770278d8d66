//! The join entry point's recognized options and the row shape both input
//! tables are expected in. Full tabular I/O, column discovery and
//! key/attribute *resolution* are out of scope; what's modeled here is the
//! option surface the join itself consumes once a caller has already
//! projected its table down to `Row` values.

use std::str::FromStr;

use crate::errors::*;
use crate::qgram::Tokenizer;

/// A single input row: an opaque key, an optional join string (`None` means
/// the join attribute was missing on this row), and whatever extra columns
/// the caller wants projected into the output.
#[derive(Clone, Debug)]
pub struct Row<K, A> {
    pub key: K,
    pub join_str: Option<String>,
    pub out_attrs: Vec<A>,
}

impl<K, A> Row<K, A> {
    pub fn new(key: K, join_str: Option<String>, out_attrs: Vec<A>) -> Self {
        Self {
            key,
            join_str,
            out_attrs,
        }
    }
}

/// The comparison operator applied to the verified edit distance against
/// `tau`. Default is `<=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompOp {
    Le,
    Lt,
    Eq,
}

impl Default for CompOp {
    fn default() -> Self {
        CompOp::Le
    }
}

impl CompOp {
    /// `d op tau`. Every variant still relies on the same pruning, since
    /// `d == tau` or `d < tau` both imply `d <= tau`.
    pub fn accepts(self, d: usize, tau: usize) -> bool {
        match self {
            CompOp::Le => d <= tau,
            CompOp::Lt => d < tau,
            CompOp::Eq => d == tau,
        }
    }
}

impl FromStr for CompOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "<=" => Ok(CompOp::Le),
            "<" => Ok(CompOp::Lt),
            "=" | "==" => Ok(CompOp::Eq),
            other => bail!(ErrorKind::InvalidComparisonOperator(other.to_string())),
        }
    }
}

/// The full option surface the join entry point accepts.
pub struct JoinOptions<T: Tokenizer> {
    pub l_key_attr: String,
    pub r_key_attr: String,
    pub l_join_attr: String,
    pub r_join_attr: String,
    pub threshold: f64,
    pub comp_op: CompOp,
    pub allow_missing: bool,
    pub l_out_attrs: Vec<String>,
    pub r_out_attrs: Vec<String>,
    pub l_out_prefix: String,
    pub r_out_prefix: String,
    pub out_sim_score: bool,
    pub n_jobs: isize,
    pub tokenizer: T,
}

impl<T: Tokenizer> JoinOptions<T> {
    pub fn new(l_key_attr: impl Into<String>, r_key_attr: impl Into<String>, l_join_attr: impl Into<String>, r_join_attr: impl Into<String>, threshold: f64, tokenizer: T) -> Self {
        Self {
            l_key_attr: l_key_attr.into(),
            r_key_attr: r_key_attr.into(),
            l_join_attr: l_join_attr.into(),
            r_join_attr: r_join_attr.into(),
            threshold,
            comp_op: CompOp::default(),
            allow_missing: false,
            l_out_attrs: Vec::new(),
            r_out_attrs: Vec::new(),
            l_out_prefix: "l_".to_string(),
            r_out_prefix: "r_".to_string(),
            out_sim_score: false,
            n_jobs: 1,
            tokenizer,
        }
    }

    /// Floor of `threshold`, validated non-negative.
    pub fn tau(&self) -> Result<usize> {
        if self.threshold < 0.0 || !self.threshold.is_finite() {
            bail!(ErrorKind::InvalidThreshold(self.threshold.to_string()));
        }
        Ok(self.threshold.floor() as usize)
    }
}

/// Resolves `n_jobs`: `1` sequential, `-1` all CPUs, `-k` maps to
/// `cpus + 1 - k`, anything resolving below 1 falls back to sequential.
pub fn resolve_n_jobs(n_jobs: isize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get() as isize)
        .unwrap_or(1);

    let resolved = if n_jobs == -1 {
        cpus
    } else if n_jobs < 0 {
        cpus + 1 + n_jobs
    } else {
        n_jobs
    };

    if resolved < 1 {
        1
    } else {
        resolved as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comp_op_parses_recognized_operators() {
        assert_eq!("<=".parse::<CompOp>().unwrap(), CompOp::Le);
        assert_eq!("<".parse::<CompOp>().unwrap(), CompOp::Lt);
        assert_eq!("=".parse::<CompOp>().unwrap(), CompOp::Eq);
        assert!("!=".parse::<CompOp>().is_err());
    }

    #[test]
    fn comp_op_accepts_consistently_with_le() {
        assert!(CompOp::Eq.accepts(3, 3));
        assert!(!CompOp::Eq.accepts(2, 3));
        assert!(CompOp::Lt.accepts(2, 3));
        assert!(!CompOp::Lt.accepts(3, 3));
        assert!(CompOp::Le.accepts(3, 3));
    }

    #[test]
    fn n_jobs_resolution() {
        assert_eq!(resolve_n_jobs(1), 1);
        // -1 => all cpus; just assert it's at least 1 without pinning a cpu count.
        assert!(resolve_n_jobs(-1) >= 1);
        // something resolving below 1 falls back to sequential.
        assert_eq!(resolve_n_jobs(-1_000_000), 1);
    }
}
