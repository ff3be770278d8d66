//! Output-row assembly: the shape a caller builds a result table from.
//! Full dataframe construction/column naming stays with the collaborator
//! that owns the tabular output; this only materializes the agreed-upon
//! row shape.

use crate::options::JoinOptions;
use crate::qgram::Tokenizer;

/// One joined pair, ready for a caller to fold into a table row in the
/// order `_id, l_<key>, r_<key>, l_<out_attrs...>, r_<out_attrs...>,
/// [_sim_score]`.
#[derive(Clone, Debug)]
pub struct OutputRow<K, A> {
    pub id: usize,
    pub l_key: K,
    pub r_key: K,
    pub l_out_attrs: Vec<A>,
    pub r_out_attrs: Vec<A>,
    pub sim_score: Option<usize>,
}

impl<K, A> OutputRow<K, A> {
    pub fn new(id: usize, l_key: K, r_key: K, l_out_attrs: Vec<A>, r_out_attrs: Vec<A>, sim_score: Option<usize>) -> Self {
        Self {
            id,
            l_key,
            r_key,
            l_out_attrs,
            r_out_attrs,
            sim_score,
        }
    }

    /// Column names for a caller building a table from a stream of
    /// `OutputRow`s, honoring `l_out_prefix`/`r_out_prefix` and
    /// `out_sim_score`. The engine itself never inspects these names; they
    /// exist only for the benefit of the output-assembly collaborator.
    pub fn column_names<T: Tokenizer>(opts: &JoinOptions<T>) -> Vec<String> {
        let mut names = vec![
            "_id".to_string(),
            format!("{}{}", opts.l_out_prefix, opts.l_key_attr),
            format!("{}{}", opts.r_out_prefix, opts.r_key_attr),
        ];
        names.extend(opts.l_out_attrs.iter().map(|a| format!("{}{}", opts.l_out_prefix, a)));
        names.extend(opts.r_out_attrs.iter().map(|a| format!("{}{}", opts.r_out_prefix, a)));
        if opts.out_sim_score {
            names.push("_sim_score".to_string());
        }
        names
    }
}
