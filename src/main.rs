use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use trip_lake::logging::init_logging;
use trip_lake::{run_exit_code, BatchConfig, BatchOrchestrator, LocalStorageFactory};

/// Clean every week partition of the enriched trips dataset.
#[derive(Parser, Debug)]
#[command(name = "trip-lake", version, about)]
struct Cli {
    /// TOML configuration file; built-in defaults are used without one.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input dataset root (overrides the config file).
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output dataset root (overrides the config file).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of worker threads (overrides the config file).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Reprocess partitions whose output already exists.
    #[arg(long)]
    force: bool,

    /// Log every partition step.
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<BatchConfig> {
    let mut config = match &cli.config {
        Some(path) => BatchConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BatchConfig::default(),
    };
    if let Some(input) = &cli.input {
        config.input_root = input.clone();
    }
    if let Some(output) = &cli.output {
        config.output_root = output.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.force_reprocess |= cli.force;
    config.verbose |= cli.verbose;
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            init_logging(cli.verbose);
            error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.verbose);

    let factory = Arc::new(LocalStorageFactory::new(config.credentials.clone()));
    let orchestrator = BatchOrchestrator::new(config, factory);

    let run = orchestrator.run();
    match &run {
        Ok(summary) => println!("{summary}"),
        Err(err) => error!("batch aborted: {err}"),
    }
    ExitCode::from(run_exit_code(&run))
}
