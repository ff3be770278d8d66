//! The validation collaborator contracts: checks raised *before* the core
//! join runs. The core assumes everything here already passed; none of
//! these checks run again once indexing starts.
//!
//! Each check follows the same shape: parse, match on a range, `bail!` a
//! named `ErrorKind`.

use std::collections::HashSet;
use std::hash::Hash;

use crate::errors::*;
use crate::options::{CompOp, JoinOptions};
use crate::qgram::Tokenizer;

/// Key uniqueness/non-null: values must be unique and non-null per table.
/// `None` keys aren't representable by an opaque, non-null `K` in this
/// crate's row model, so only uniqueness is checked here.
pub fn validate_unique_keys<K: Eq + Hash + Clone>(keys: &[K]) -> Result<()> {
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        if !seen.insert(key.clone()) {
            bail!(ErrorKind::NonUniqueOrMissingKey(
                "key column contains a duplicate value".to_string()
            ));
        }
    }
    Ok(())
}

/// `threshold` must be a non-negative, finite number.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || threshold.is_infinite() || threshold < 0.0 {
        bail!(ErrorKind::InvalidThreshold(threshold.to_string()));
    }
    Ok(())
}

/// `comp_op` must be one of `<=`, `<`, `=` — already guaranteed by the
/// `CompOp` type itself once constructed via `FromStr`, but kept as an
/// explicit pass-through so callers building `CompOp` by hand still route
/// through one named validation step.
pub fn validate_comp_op(_op: CompOp) -> Result<()> {
    Ok(())
}

/// Requested output attributes must be a subset of what the table actually
/// exposes.
pub fn validate_out_attrs(requested: &[String], available: &[String]) -> Result<()> {
    for attr in requested {
        if !available.iter().any(|a| a == attr) {
            bail!(ErrorKind::InvalidOutputAttribute(attr.clone()));
        }
    }
    Ok(())
}

/// `qval` must be a positive integer.
pub fn validate_tokenizer<T: Tokenizer>(tokenizer: &T) -> Result<()> {
    if tokenizer.qval() < 1 {
        bail!(ErrorKind::InvalidTokenizer("qval must be >= 1".to_string()));
    }
    Ok(())
}

/// Runs every table-independent check on a fully-populated `JoinOptions`
/// plus the two tables' available out-attrs, so a caller has one entry
/// point instead of threading each check through by hand.
pub fn validate_options<T: Tokenizer, K: Eq + Hash + Clone>(
    opts: &JoinOptions<T>,
    l_keys: &[K],
    r_keys: &[K],
    l_available_out_attrs: &[String],
    r_available_out_attrs: &[String],
) -> Result<()> {
    validate_threshold(opts.threshold)?;
    validate_comp_op(opts.comp_op)?;
    validate_tokenizer(&opts.tokenizer)?;
    validate_unique_keys(l_keys)?;
    validate_unique_keys(r_keys)?;
    validate_out_attrs(&opts.l_out_attrs, l_available_out_attrs)?;
    validate_out_attrs(&opts.r_out_attrs, r_available_out_attrs)?;
    Ok(())
}
