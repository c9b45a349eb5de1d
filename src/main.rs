// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

mod auth;
mod config;
mod db;
mod http;
mod ingest;
mod lap;
mod logging;
mod s3;
mod state;
#[cfg(test)]
mod test_utils;

use crate::ingest::IngestOutcome;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the lap upload endpoint
    Serve,
    /// Create the metadata table and its blob reference index
    Migrate,
    /// Run a single lap file through the ingestion pipeline
    IngestFile {
        /// Lap file, gzip-compressed or plain
        path: PathBuf,

        /// Record the lap on behalf of this user
        #[arg(long)]
        user_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {:#}", cli.config, e);
            process::exit(1);
        }
    };

    let _log_guard = logging::init_logging(config.logging.as_ref(), cli.verbose)?;

    info!("Lap ingest v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config);

    let result = match cli.command {
        Commands::Serve => serve(&config).await,
        Commands::Migrate => migrate(&config).await,
        Commands::IngestFile { path, user_id } => ingest_file(&config, path, user_id).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn serve(config: &config::Config) -> Result<()> {
    let context = state::app_context(config).await?;
    http::serve(&config.server.listen_addr, context.http_state(config)).await
}

async fn migrate(config: &config::Config) -> Result<()> {
    let context = state::app_context(config).await?;

    info!("Migrating metadata index...");
    context.database.migrate().await?;
    info!("Metadata index is ready");

    Ok(())
}

async fn ingest_file(
    config: &config::Config,
    path: PathBuf,
    user_id: Option<String>,
) -> Result<()> {
    let body = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read lap file {}", path.display()))?;

    let context = state::app_context(config).await?;
    let outcome = context
        .ingestor(config)
        .ingest(&body, user_id.as_deref())
        .await;

    println!("{}", outcome);
    match outcome {
        IngestOutcome::Recorded(_) | IngestOutcome::Duplicate => Ok(()),
        other => Err(anyhow::anyhow!(
            "Lap file {} was not recorded: {}",
            path.display(),
            other
        )),
    }
}
