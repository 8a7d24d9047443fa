use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;
use pybale::{config::Config, orchestrator};

#[derive(Debug, Parser)]
#[command(name = "pybale", version, about = "Bundle per-function Python deployment directories")]
struct Cli {
    /// Path to a pybale.toml configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project root for first-party classification
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Source root containing shared first-party modules
    #[arg(long)]
    src: Option<PathBuf>,

    /// Directory containing one subdirectory per unit
    #[arg(long)]
    units_dir: Option<PathBuf>,

    /// Output directory (destructively recreated)
    #[arg(long)]
    dist: Option<PathBuf>,

    /// Entry filename a unit must contain
    #[arg(long)]
    entry: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(project_root) = &cli.project_root {
        config.project_root = project_root.clone();
    }
    if let Some(src) = &cli.src {
        config.src = src.clone();
    }
    if let Some(units_dir) = &cli.units_dir {
        config.units_dir = units_dir.clone();
    }
    if let Some(dist) = &cli.dist {
        config.dist = dist.clone();
    }
    if let Some(entry) = &cli.entry {
        config.entry_filename = entry.clone();
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}");
            return ExitCode::FAILURE;
        }
    };

    match orchestrator::bundle_all(&config) {
        Ok(summary) if summary.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
