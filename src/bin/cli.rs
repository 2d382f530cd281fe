// src/bin/cli.rs
use color_eyre::eyre::WrapErr;

use cwl_scrape::cli::{self, Command, ConsoleProgress};
use cwl_scrape::runner;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let (options, verbosity) = match cli::parse_args(std::env::args().skip(1))? {
        Command::Help => {
            eprintln!("{}", cli::HELP);
            return Ok(());
        }
        Command::Run { options, verbosity } => (options, verbosity),
    };
    cwl_scrape::log::init(verbosity);

    let mut progress = ConsoleProgress;
    let summary = runner::run(&options, Some(&mut progress))
        .wrap_err_with(|| format!("run against {} failed", options.archive_path.display()))?;

    if options.dry_run {
        println!("{}", serde_json::to_string_pretty(&summary.snapshot)?);
    }
    for line in cli::summary_lines(&summary) {
        println!("{line}");
    }
    Ok(())
}
