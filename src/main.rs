use std::path::PathBuf;

use clap::Parser;
use layoutboard::config::{ConfigError, EngineConfig};
use layoutboard::replay::{ReplayError, parse_script, run_script};
use layoutboard::worker::GeometryWorker;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "layoutboard", about = "Replay a layout gesture script and print the resulting hierarchy")]
struct Cli {
    /// JSON gesture script.
    script: PathBuf,

    /// Compute immediate pointer steps on the background geometry worker.
    #[arg(long, env = "LAYOUT_USE_WORKER")]
    worker: bool,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env()?;
    let json = std::fs::read_to_string(&cli.script).map_err(|source| CliError::Read { path: cli.script.clone(), source })?;
    let script = parse_script(&json)?;

    let worker = cli.worker.then(GeometryWorker::spawn);
    let report = run_script(&script, config, worker.as_ref()).await?;

    let out = if cli.compact { serde_json::to_string(&report)? } else { serde_json::to_string_pretty(&report)? };
    println!("{out}");
    Ok(())
}
