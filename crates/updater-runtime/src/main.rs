//! `pathfinder-updater` entry point.
//!
//! 1. Parse and validate configuration (invalid input exits before serving)
//! 2. Initialize logging, tracing and metrics
//! 3. Wire the subsystems and run until Ctrl-C or a fatal error

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{info, warn};

use updater_runtime::{CliArgs, UpdaterRuntime};
use updater_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match CliArgs::parse().validate() {
        Ok(config) => config,
        Err(e) => CliArgs::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting pathfinder updater");
    config.log_summary();

    let runtime = UpdaterRuntime::build(config).context("Failed to build the updater")?;
    let handle = runtime.shutdown_handle();

    let run = runtime.run();
    tokio::pin!(run);

    let result = tokio::select! {
        result = &mut run => result,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    info!("Shutdown signal received");
                    handle.shutdown();
                }
                Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
            }
            run.await
        }
    };

    result.context("Pathfinder updater stopped with an error")
}
