use std::net::SocketAddr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("Failed to bind health endpoint to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Health endpoint server error: {0}")]
    Serve(#[from] std::io::Error),
}
