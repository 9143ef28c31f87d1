//! Roleguard - access control engine service
//!
//! Loads configuration, seeds the permission template and keeps the cache
//! invalidation listeners running until interrupted.

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use roleguard::{AccessEngine, Config, utils::init_logging};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "roleguard", version, about = "Role based access control engine")]
struct Cli {
    /// YAML configuration file; `ACCESS_*` environment variables are used when omitted
    #[arg(short, long, env = "ACCESS_CONFIG")]
    config: Option<PathBuf>,

    /// Seed the permission template from this directory
    #[arg(long)]
    seed_dir: Option<PathBuf>,

    /// Re-seed even when the template already exists
    #[arg(long)]
    force_seed: bool,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    init_logging(config.logging()).context("initializing logging")?;
    info!("Starting roleguard {}", roleguard::VERSION);

    let engine = AccessEngine::new(config)
        .await
        .context("building access engine")?;

    if cli.seed_dir.is_some() || engine.config().seed().template_dir.is_some() {
        let report = engine
            .seed_template(cli.seed_dir.as_deref(), cli.force_seed)
            .await
            .context("seeding permission template")?;
        if !report.skipped {
            info!("Seeded modules: {}", report.modules.join(", "));
        }
    }

    let listeners = engine.start_listeners();
    info!("Access engine ready");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    engine.shutdown();
    for listener in listeners {
        if let Err(e) = listener.await {
            error!("Listener task failed: {}", e);
        }
    }
    info!("Access engine stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Display keeps the context chain readable
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
