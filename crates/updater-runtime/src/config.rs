//! Command line and environment configuration.
//!
//! The six required settings are positional, each with an environment
//! fallback. Tuning knobs are optional flags.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pu_02_capacity_graph::describe_connection_string;
use pu_03_pathfinder_rpc::DEFAULT_RELOAD_METHOD;
use pu_04_health::DEFAULT_BIND_ADDRESS;
use shared_types::{ProtocolVersion, UnsupportedProtocolVersion};
use thiserror::Error;
use tracing::info;

/// Raw arguments as given on the command line.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pathfinder-updater",
    version,
    about = "Keeps a Circles pathfinder's capacity graph in sync with the chain"
)]
pub struct CliArgs {
    /// Circles protocol version, v1 or v2
    #[arg(env = "CIRCLES_VERSION")]
    pub circles_version: Option<String>,

    /// PostgreSQL connection string of the indexer database
    #[arg(env = "INDEXER_DB_CONNECTION_STRING", hide_env_values = true)]
    pub indexer_db_connection_string: Option<String>,

    /// Websocket URL of the indexer's block update feed
    #[arg(env = "INDEXER_WS_URL")]
    pub indexer_ws_url: Option<String>,

    /// Where the updater writes the snapshot (e.g. inside a container)
    #[arg(env = "INTERNAL_CAPACITY_GRAPH_PATH")]
    pub internal_capacity_graph_path: Option<String>,

    /// The same snapshot as the pathfinder sees it
    #[arg(env = "EXTERNAL_CAPACITY_GRAPH_PATH")]
    pub external_capacity_graph_path: Option<String>,

    /// Pathfinder JSON-RPC URL
    #[arg(env = "PATHFINDER_RPC_URL")]
    pub pathfinder_rpc_url: Option<String>,

    /// Address of the health listener
    #[arg(long, env = "HEALTH_BIND_ADDRESS", default_value = DEFAULT_BIND_ADDRESS)]
    pub health_bind_address: SocketAddr,

    /// Seconds between timer-driven cycles (v2 only)
    #[arg(long, env = "PERIODIC_UPDATE_INTERVAL_SECS", default_value_t = 60)]
    pub periodic_update_interval_secs: u64,

    /// JSON-RPC method asking the pathfinder to reload its graph
    #[arg(long, env = "PATHFINDER_RELOAD_METHOD", default_value = DEFAULT_RELOAD_METHOD)]
    pub pathfinder_reload_method: String,

    /// Request timeout for the reload call; unbounded when unset
    #[arg(long, env = "PATHFINDER_RPC_TIMEOUT_SECS")]
    pub pathfinder_rpc_timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required argument: {0}")]
    Missing(&'static str),

    #[error(transparent)]
    UnsupportedVersion(#[from] UnsupportedProtocolVersion),

    #[error("Invalid indexer db connection string: {0}")]
    InvalidConnectionString(String),

    #[error("Periodic update interval must be at least one second")]
    InvalidInterval,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    pub indexer_ws_url: String,
    pub indexer_db_connection_string: String,
    pub pathfinder_rpc_url: String,
    pub internal_capacity_graph_path: PathBuf,
    pub external_capacity_graph_path: String,
    pub version: ProtocolVersion,
    pub health_bind_address: SocketAddr,
    pub periodic_update_interval: Duration,
    pub pathfinder_reload_method: String,
    pub pathfinder_rpc_timeout: Option<Duration>,
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

impl CliArgs {
    pub fn validate(self) -> Result<UpdaterConfig, ConfigError> {
        let version: ProtocolVersion =
            required(self.circles_version, "circles_version")?.parse()?;
        let indexer_db_connection_string =
            required(self.indexer_db_connection_string, "indexer_db_connection_string")?;
        let indexer_ws_url = required(self.indexer_ws_url, "indexer_ws_url")?;
        let internal_capacity_graph_path =
            required(self.internal_capacity_graph_path, "internal_capacity_graph_path")?;
        let external_capacity_graph_path =
            required(self.external_capacity_graph_path, "external_capacity_graph_path")?;
        let pathfinder_rpc_url = required(self.pathfinder_rpc_url, "pathfinder_rpc_url")?;

        describe_connection_string(&indexer_db_connection_string)
            .map_err(|e| ConfigError::InvalidConnectionString(e.to_string()))?;

        if self.periodic_update_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        Ok(UpdaterConfig {
            indexer_ws_url,
            indexer_db_connection_string,
            pathfinder_rpc_url,
            internal_capacity_graph_path: PathBuf::from(internal_capacity_graph_path),
            external_capacity_graph_path,
            version,
            health_bind_address: self.health_bind_address,
            periodic_update_interval: Duration::from_secs(self.periodic_update_interval_secs),
            pathfinder_reload_method: self.pathfinder_reload_method,
            pathfinder_rpc_timeout: self.pathfinder_rpc_timeout_secs.map(Duration::from_secs),
        })
    }
}

impl UpdaterConfig {
    /// Log the effective configuration. The connection string is reduced
    /// to host, user and database.
    pub fn log_summary(&self) {
        let database = describe_connection_string(&self.indexer_db_connection_string)
            .unwrap_or_else(|_| "<unparseable>".to_string());
        info!(
            version = %self.version,
            indexer_ws_url = %self.indexer_ws_url,
            database = %database,
            pathfinder_rpc_url = %self.pathfinder_rpc_url,
            internal_capacity_graph_path = %self.internal_capacity_graph_path.display(),
            external_capacity_graph_path = %self.external_capacity_graph_path,
            health_bind_address = %self.health_bind_address,
            periodic_resync = self.version.has_periodic_resync(),
            "Pathfinder updater configuration"
        );
    }
}
