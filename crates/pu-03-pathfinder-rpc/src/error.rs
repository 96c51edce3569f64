use thiserror::Error;

/// Reload failures. All of them abort the current update cycle.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Pathfinder request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Pathfinder answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Pathfinder RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}
