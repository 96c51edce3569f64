//! Error types for the indexer subscription.
//!
//! Every variant is fatal to the subscription: there is no reconnect, the
//! process is expected to restart.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("Failed to connect to indexer at {url}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("Websocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("Indexer closed the connection (code {code:?}): {reason}")]
    Closed { code: Option<u16>, reason: String },

    #[error("Received an invalid block update via websocket: {message}")]
    Malformed { message: String, detail: String },

    #[error("Indexer reported an error: {0}")]
    Indexer(String),

    #[error("Binary message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Block update consumer has gone away")]
    ConsumerGone,
}

impl SubscriptionError {
    pub(crate) fn malformed(message: &str, detail: impl ToString) -> Self {
        Self::Malformed {
            message: message.to_string(),
            detail: detail.to_string(),
        }
    }
}
