//! Websocket client for the indexer's block feed.

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use shared_types::{BlockUpdateEvent, ProtocolVersion};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::connect_async;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::decode_message;
use crate::error::SubscriptionError;

/// JSON-RPC request for the v2 subscription.
#[derive(Debug, Serialize)]
struct WsRequest<T: Serialize> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u64,
}

#[derive(Debug, Serialize)]
struct EmptyFilter {}

fn subscribe_request() -> WsRequest<(&'static str, EmptyFilter)> {
    WsRequest {
        jsonrpc: "2.0",
        method: "eth_subscribe",
        params: ("circles", EmptyFilter {}),
        id: 1,
    }
}

/// Streaming subscription to the indexer.
///
/// One connection, no reconnect. [`run`](Self::run) pushes every decoded
/// event into the channel until the connection fails or [`stop`](Self::stop)
/// is called.
pub struct IndexerSubscription {
    url: String,
    version: ProtocolVersion,
    cancel: CancellationToken,
}

impl IndexerSubscription {
    pub fn new(url: impl Into<String>, version: ProtocolVersion) -> Self {
        Self {
            url: url.into(),
            version,
            cancel: CancellationToken::new(),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Request cancellation. Takes effect at the next pending receive, which
    /// is then abandoned and the connection closed with code 1000.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Connect and stream events until stopped or failed.
    ///
    /// Returns `Ok(())` only after [`stop`](Self::stop).
    pub async fn run(&self, events: mpsc::Sender<BlockUpdateEvent>) -> Result<(), SubscriptionError> {
        let connected = tokio::select! {
            _ = self.cancel.cancelled() => return Ok(()),
            connected = connect_async(self.url.as_str()) => connected,
        };
        let (ws_stream, _) = connected.map_err(|source| SubscriptionError::Connect {
            url: self.url.clone(),
            source,
        })?;
        info!(url = %self.url, version = %self.version, "Connected to indexer");

        let (mut write, mut read) = ws_stream.split();

        if self.version == ProtocolVersion::V2 {
            let request = serde_json::to_string(&subscribe_request())
                .map_err(|e| SubscriptionError::malformed("eth_subscribe", e))?;
            write.send(Message::Text(request.into())).await?;
            debug!("Sent eth_subscribe for circles events");
        }

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => {
                    let goodbye = CloseFrame {
                        code: CloseCode::Normal,
                        reason: Utf8Bytes::from_static("Goodbye"),
                    };
                    if let Err(e) = write.send(Message::Close(Some(goodbye))).await {
                        warn!(error = %e, "Failed to send close frame");
                    }
                    info!("Indexer subscription stopped");
                    return Ok(());
                }
                next = read.next() => next,
            };

            let text = match next {
                Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
                Some(Ok(Message::Binary(bytes))) => std::str::from_utf8(&bytes)?.to_owned(),
                Some(Ok(Message::Ping(data))) => {
                    write.send(Message::Pong(data)).await?;
                    continue;
                }
                Some(Ok(Message::Close(frame))) => {
                    return Err(match frame {
                        Some(frame) => SubscriptionError::Closed {
                            code: Some(u16::from(frame.code)),
                            reason: frame.reason.as_str().to_owned(),
                        },
                        None => SubscriptionError::Closed {
                            code: None,
                            reason: String::new(),
                        },
                    });
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SubscriptionError::Transport(e)),
                None => {
                    return Err(SubscriptionError::Closed {
                        code: None,
                        reason: "stream ended".to_string(),
                    })
                }
            };

            match decode_message(self.version, &text)? {
                Some(event) => {
                    debug!(hashes = event.len(), "Block update received");
                    if events.send(event).await.is_err() {
                        // A consumer that went away during stop() is not a failure
                        if self.cancel.is_cancelled() {
                            info!("Indexer subscription stopped");
                            return Ok(());
                        }
                        return Err(SubscriptionError::ConsumerGone);
                    }
                }
                None => debug!("Skipping unrecognized indexer message"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_request_shape() {
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&subscribe_request()).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "eth_subscribe",
                "params": ["circles", {}],
                "id": 1
            })
        );
    }

    #[tokio::test]
    async fn test_stop_before_connect_returns_ok() {
        let subscription = IndexerSubscription::new("ws://127.0.0.1:1", ProtocolVersion::V1);
        subscription.stop();
        let (tx, _rx) = mpsc::channel(1);
        assert!(subscription.run(tx).await.is_ok());
    }
}
