//! rustro - libretro core staging and session bootstrap
//!
//! Main entry point: loads configuration, resolves the permission gate,
//! stages the requested core and emits the resulting session environment
//! for the execution engine.

use anyhow::anyhow;
use clap::Parser;
use rustro_core::permission::AutoGrantGate;
use rustro_core::{logging, Config};
use rustro_session::{ExecutionHandoff, LaunchRequest, SessionEnvironment, SessionLauncher};
use std::path::PathBuf;

/// Stage a libretro core and assemble a session environment
#[derive(Parser, Debug)]
#[command(name = "rustro", version, about)]
struct Cli {
    /// Content to load
    content: Option<PathBuf>,

    /// Candidate core to stage and load
    #[arg(short, long)]
    core: Option<PathBuf>,

    /// Re-stage the core even when a usable copy is already in place
    #[arg(long)]
    force_restage: bool,

    /// Explicit config file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Handoff that emits the environment map as JSON on stdout
struct JsonHandoff;

impl ExecutionHandoff for JsonHandoff {
    fn launch(&self, env: &SessionEnvironment) {
        match serde_json::to_string_pretty(&env.to_map()) {
            Ok(json) => println!("{}", json),
            Err(err) => tracing::error!("Failed to serialize session environment: {}", err),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|err| anyhow!("failed to load configuration: {}", err))?;

    logging::init(&config.debug);
    tracing::info!("Starting rustro session bootstrap");

    let request = LaunchRequest {
        content: cli.content,
        core: cli.core,
        force_restage: cli.force_restage,
    };

    let mut launcher = SessionLauncher::new(request, config);
    let env = launcher.run(&AutoGrantGate)?;

    JsonHandoff.launch(&env);
    Ok(())
}
