#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

use env_logger;
use std::{
    fs::File,
    io::{prelude::*, BufReader, BufWriter},
};

pub mod cli;
pub mod distance;
pub mod errors;
pub mod index;
pub mod matching;
pub mod missing;
pub mod options;
pub mod output;
pub mod qgram;
pub mod token;
pub mod validate;
pub mod verification;

use crate::errors::*;
use crate::matching::ed_join;
use crate::options::{JoinOptions, Row};
use crate::qgram::QGramTokenizer;

/// Reads a newline-delimited file into rows keyed by line index. A blank
/// line is treated as a missing join value, surfaced through
/// `--allow-missing`.
fn read_rows(path: &std::path::Path) -> Result<Vec<Row<usize, String>>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let join_str = if line.is_empty() { None } else { Some(line) };
        rows.push(Row::new(i, join_str, Vec::new()));
    }
    Ok(rows)
}

fn main() -> Result<()> {
    // See https://docs.rs/env_logger/0.7.0/env_logger/ for details on controlling the log output
    env_logger::builder()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] \n {}",
                record.module_path().unwrap(),
                record.args()
            )
        })
        .init();

    let config: cli::Config = cli::parse_config().unwrap_or_else(|err| {
        eprintln!("Error when parsing CLI arguments:\n {}", err);
        std::process::exit(1);
    });

    info!(
        "doc_x: {:?}, doc_y: {:?}, q = {}, tau = {}",
        &config.doc_x, &config.doc_y, config.q, config.tau
    );

    let left_rows = read_rows(&config.doc_x)?;
    let right_rows = read_rows(&config.doc_y)?;

    let mut opts = JoinOptions::new(
        "line",
        "line",
        "line",
        "line",
        config.tau,
        QGramTokenizer::new(config.q),
    );
    opts.comp_op = config.comp_op;
    opts.allow_missing = config.allow_missing;
    opts.out_sim_score = config.out_sim_score;
    opts.n_jobs = config.n_jobs;

    let output = ed_join(&left_rows, &right_rows, &mut opts)?;

    let out_name = format!(
        "{}_out_q{}_tau{}.csv",
        config.doc_x.file_stem().unwrap().to_str().unwrap(),
        config.q,
        config.tau,
    );
    let mut writer = BufWriter::new(File::create(&out_name)?);
    for row in &output {
        match row.sim_score {
            Some(d) => writeln!(writer, "{},{},{},{}", row.id, row.l_key, row.r_key, d)?,
            None => writeln!(writer, "{},{},{}", row.id, row.l_key, row.r_key)?,
        }
    }

    info!("{} matched pairs written to {}", output.len(), out_name);
    Ok(())
}
