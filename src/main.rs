use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::info;

use hhh_graph::config::{EntryWindow, GraphConfig};
use hhh_graph::pipeline::{artifact_up_to_date, convert};

#[derive(Parser)]
#[command(
    name = "hhh-graph",
    about = "Convert HHH→6b collision event ntuples into graph training examples",
    long_about = "One-shot converter: reads flat per-event jet ntuples from <ROOT>/raw/, \
                  builds one jet-pair graph per surviving event, and writes a single \
                  parquet artifact to <ROOT>/processed/."
)]
struct Args {
    /// Root storage directory (contains raw/, receives processed/)
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// First event index to process (inclusive)
    #[arg(long, value_name = "N")]
    entry_start: Option<usize>,

    /// Last event index to process (exclusive)
    #[arg(long, value_name = "N")]
    entry_stop: Option<usize>,

    /// Config file overriding <ROOT>/config.json
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Regenerate even when the artifact is newer than every source
    #[arg(long)]
    force: bool,
}

fn run(args: &Args) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => GraphConfig::from_file(path)?,
        None => GraphConfig::for_root(&args.root)?,
    };

    if !args.force && artifact_up_to_date(&args.root, &cfg) {
        info!(
            "artifact {} is up to date; nothing to do",
            cfg.processed_path(&args.root).display()
        );
        println!("up to date");
        return Ok(());
    }

    let window = EntryWindow {
        start: args.entry_start,
        stop: args.entry_stop,
    };
    let stats = convert(&args.root, &cfg, window)?;

    info!(
        "read {} events, removed {} padded jets, dropped {} thin events",
        stats.events_read, stats.jets_removed, stats.events_dropped
    );
    println!("wrote {} graph records", stats.records_written);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
