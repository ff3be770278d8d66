use clap::App;
use dialoguer::{theme::ColorfulTheme, Confirmation, Input};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::PathBuf;

use crate::errors::*;
use crate::options::CompOp;

pub(crate) struct ProgressBarBuilder<'a> {
    count: u64,
    messege: &'a str,
}

impl<'a> ProgressBarBuilder<'a> {
    pub fn new(count: usize, messege: &'a str) -> Self {
        Self {
            count: count as u64,
            messege,
        }
    }

    pub fn build(&self) -> ProgressBar {
        let pbar = ProgressBar::new(self.count);
        pbar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ({pos}/{len}, ETA {eta})",
                ).progress_chars("#>-")
        );
        pbar.set_draw_target(ProgressDrawTarget::stdout());
        pbar.set_message(self.messege);

        pbar
    }
}

/// Configuration for the thin line-oriented demo binary: two
/// newline-delimited files, row index as key, no extra out-attrs. Full
/// tabular I/O stays out of scope for this crate.
#[allow(dead_code)]
pub(crate) struct Config {
    pub doc_x: PathBuf,
    pub doc_y: PathBuf,
    pub q: usize,
    pub tau: f64,
    pub comp_op: CompOp,
    pub allow_missing: bool,
    pub out_sim_score: bool,
    pub n_jobs: isize,
}

fn input_file_validator(f: &str) -> Result<PathBuf> {
    if PathBuf::from(&f).is_file() {
        Ok(PathBuf::from(&f))
    } else {
        bail!(ErrorKind::InvalidInputTable(format!(
            "'{}' is not a readable file",
            f
        )));
    }
}

fn q_validator(v: &str) -> Result<usize> {
    match v.parse::<usize>() {
        Ok(q) if q >= 1 => Ok(q),
        Ok(q) => bail!(ErrorKind::InvalidTokenizer(format!(
            "qval must be >= 1, got {}",
            q
        ))),
        Err(_) => bail!("not a valid integer: q = {}", v),
    }
}

fn tau_validator(v: &str) -> Result<f64> {
    match v.parse::<f64>() {
        Ok(t) if t >= 0.0 => Ok(t),
        Ok(t) => bail!(ErrorKind::InvalidThreshold(t.to_string())),
        Err(_) => bail!("not a valid number: tau = {}", v),
    }
}

#[allow(dead_code)]
pub(crate) fn parse_config() -> Result<Config> {
    let matches = App::new("ed-sim-join")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Similarity join under edit-distance constraints")
        .usage(
            "\
             ed-sim-join FILE_1 [FILE_2] [-q Q] [-t TAU] [--op OP] [--jobs N] [--allow-missing] [--score]",
        )
        .args_from_usage(
            "\
            <doc_x> 'Newline-delimited file; each line is one left-side join string' \n
            [doc_y] '(Optional) Right-side file; defaults to doc_x (self-join)' \n
            [q] -q [INTEGER] 'q-gram length' \n
            [tau] -t [NUMBER] 'edit-distance threshold' \n
            [op] --op [OPERATOR] 'comparison operator: <=, <, =' \n
            [jobs] --jobs [INTEGER] 'n_jobs: 1 sequential, -1 all CPUs, -k => CPUs+1-k' \n
            [allow_missing] --allow-missing 'also emit the cross product of blank-line rows' \n
            [score] --score 'append the edit distance as a _sim_score column' \n
            [interactive] -i, --interactive 'interactive confirmation prompt' ",
        )
        .get_matches();

    println!("ed-sim-join: similarity join under edit-distance constraints");

    let doc_x: PathBuf = input_file_validator(matches.value_of("doc_x").unwrap())?;
    let doc_y: PathBuf = match matches.value_of("doc_y") {
        Some(f) => input_file_validator(f)?,
        None => doc_x.clone(),
    };

    let mut q: usize = q_validator(matches.value_of("q").unwrap_or("2"))?;
    let mut tau: f64 = tau_validator(matches.value_of("tau").unwrap_or("1"))?;
    let comp_op: CompOp = matches.value_of("op").unwrap_or("<=").parse()?;
    let n_jobs: isize = matches.value_of("jobs").unwrap_or("1").parse()?;
    let allow_missing = matches.is_present("allow_missing");
    let out_sim_score = matches.is_present("score");

    let theme: ColorfulTheme = ColorfulTheme::default();

    if matches.is_present("interactive")
        && !Confirmation::with_theme(&theme)
            .with_text(&format!(
                "Do you want to accept those values? \nFile_1: {}\nFile_2: {}\nq = {}, tau = {}: ",
                &doc_x.to_str().unwrap(),
                &doc_y.to_str().unwrap(),
                q,
                tau,
            ))
            .interact()?
    {
        loop {
            q = Input::with_theme(&theme)
                .with_prompt("q")
                .default(q)
                .validate_with(|v: &str| -> Result<()> { q_validator(v).map(|_| ()) })
                .interact()?;

            tau = Input::with_theme(&theme)
                .with_prompt("tau")
                .default(tau)
                .validate_with(|v: &str| -> Result<()> { tau_validator(v).map(|_| ()) })
                .interact()?;

            if Confirmation::with_theme(&theme)
                .with_text(&format!("q = {}, tau = {}: accept?", q, tau))
                .interact()?
            {
                break;
            }
        }
    }

    Ok(Config {
        doc_x,
        doc_y,
        q,
        tau,
        comp_op,
        allow_missing,
        out_sim_score,
        n_jobs,
    })
}
