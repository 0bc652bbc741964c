use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use comfy_table::{Cell, Table};

use crate::config;
use crate::core::scanner::{self, BatchReport, FailurePolicy};
use crate::core::tagger::Tagger;
use crate::models::Outcome;
use crate::sources::bilibili::BilibiliClient;

#[derive(Parser)]
#[command(
    name = "bili-tagger",
    version,
    about = "Tag and rename audio downloaded from the Bilibili music service"
)]
pub struct Cli {
    /// File or directory of files named by track id
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output directory
    #[arg(value_name = "OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Cache directory for track and album JSON and cover images
    #[arg(short = 't', long = "temp-dir", value_name = "DIR", default_value = "temp")]
    pub temp_dir: PathBuf,

    /// Overwrite output files that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Keep going after a file fails and list the failures at the end.
    ///
    /// Without it the first failure aborts the batch. Every file in SOURCE is
    /// treated as a track, so a stray file such as `.DS_Store` or `cover.jpg`
    /// fails with "invalid input" and stops the run. Pass this flag to skip
    /// past such files.
    #[arg(long)]
    pub keep_going: bool,

    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn run(cli: Cli) -> Result<()> {
    if !cli.source.exists() {
        bail!("source not found: {}", cli.source.display());
    }
    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("cannot create output directory {}", cli.output_dir.display()))?;
    std::fs::create_dir_all(&cli.temp_dir)
        .with_context(|| format!("cannot create temp directory {}", cli.temp_dir.display()))?;

    let cfg = config::load_config();
    let policy = if cli.keep_going {
        FailurePolicy::Continue
    } else {
        cfg.batch.failure_policy
    };

    let client = BilibiliClient::new(&cfg.http).context("cannot set up HTTP client")?;
    let mut tagger = Tagger::new(&cli.temp_dir, &cfg.endpoints, client, cli.overwrite)
        .context("cannot set up cache directories")?;

    let report = scanner::process_path(
        &cli.source,
        &cli.output_dir,
        &mut tagger,
        policy,
        |input, result| match result {
            Ok(outcome @ Outcome::Written(_)) => println!("processed: {}", outcome.file_name()),
            Ok(outcome @ Outcome::Skipped(_)) => println!("{} exists, skipped", outcome.file_name()),
            Err(_) => println!("failed: {}", input.display()),
        },
    )?;

    for (kind, stats) in tagger.cache_stats() {
        tracing::debug!(
            "{kind} cache: {} memory, {} local, {} remote, {} missed",
            stats.memory_hits,
            stats.local_hits,
            stats.remote_fetches,
            stats.misses
        );
    }

    print_summary(&report);
    if !report.failures.is_empty() {
        bail!("{} file(s) failed", report.failures.len());
    }
    Ok(())
}

fn print_summary(report: &BatchReport) {
    if !report.failures.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["file", "error"]);
        for (path, err) in &report.failures {
            table.add_row(vec![Cell::new(path.display()), Cell::new(err)]);
        }
        println!("{table}");
    }

    println!(
        "\n{} written, {} skipped, {} failed",
        report.written(),
        report.skipped(),
        report.failures.len(),
    );
}
