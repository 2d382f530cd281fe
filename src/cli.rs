// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::options::{CorruptPolicy, PageSource, RunOptions};
use crate::data::GameKind;
use crate::progress::Progress;
use crate::runner::RunSummary;

pub const HELP: &str = include_str!("cli_help.txt");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgError {
    #[error("Missing value for {0}")]
    MissingValue(&'static str),
    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("Unknown arg: {0}")]
    Unknown(String),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Run { options: RunOptions, verbosity: u8 },
}

/// Parse everything after the program name. No arguments = one default live run.
pub fn parse_args<I, S>(args: I) -> Result<Command, ArgError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut options = RunOptions::default();
    let mut verbosity = 0u8;

    let mut args = args.into_iter().map(Into::into);
    while let Some(a) = args.next() {
        match a.as_str() {
            "-o" | "--out" => {
                let v = args.next().ok_or(ArgError::MissingValue("--out"))?;
                options.set_archive_path(&v);
            }
            "--url" => {
                let v = args.next().ok_or(ArgError::MissingValue("--url"))?;
                if !(v.starts_with("http://") || v.starts_with("https://")) {
                    return Err(ArgError::InvalidValue { flag: "--url", value: v });
                }
                options.page_url = v;
            }
            "--html" => {
                let v = args.next().ok_or(ArgError::MissingValue("--html"))?;
                options.source = PageSource::File(PathBuf::from(v));
            }
            "--timeout" => {
                let v = args.next().ok_or(ArgError::MissingValue("--timeout"))?;
                let secs: u64 = match v.parse() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ArgError::InvalidValue { flag: "--timeout", value: v }),
                };
                options.timeout = Duration::from_secs(secs);
            }
            "--reset-corrupt" => options.on_corrupt = CorruptPolicy::BackupAndReset,
            "--dry-run" => options.dry_run = true,
            "-v" | "--verbose" => verbosity = verbosity.saturating_add(1),
            "-h" | "--help" => return Ok(Command::Help),
            _ => return Err(ArgError::Unknown(a)),
        }
    }

    Ok(Command::Run { options, verbosity })
}

/// Prints one line per game as the snapshot is assembled.
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn game_done(&mut self, game: GameKind, period: u64) {
        println!("{game:<5} period {period}");
    }
    fn game_skipped(&mut self, game: GameKind, reason: &str) {
        println!("{game:<5} skipped ({reason})");
    }
}

/// Human-readable end-of-run lines.
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let r = &summary.report;
    let mut out = vec![format!(
        "merged: {} added, {} replaced, {} unchanged, {} stale",
        r.added, r.replaced, r.unchanged, r.stale
    )];
    for game in GameKind::ALL {
        let latest = summary
            .archive
            .latest(game)
            .map(|rec| rec.period.to_string())
            .unwrap_or_else(|| s!("-"));
        out.push(format!(
            "{game:<5} {:>5} record(s), latest {latest}",
            summary.archive.records(game).len()
        ));
    }
    match &summary.written {
        Some(p) => out.push(format!("Wrote {}", p.display())),
        None => out.push(s!("Dry run: archive not written")),
    }
    out
}
