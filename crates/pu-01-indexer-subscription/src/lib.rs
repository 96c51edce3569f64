//! # PU-01 Indexer Subscription
//!
//! Chain event subscriber. Holds one websocket connection to the Circles
//! indexer and turns every "new block" message into a [`BlockUpdateEvent`]
//! pushed onto an mpsc channel.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): pure decoding of v1 hash lists and v2
//!   JSON-RPC envelopes
//! - **Adapters Layer** (`adapters/`): the `tokio-tungstenite` client
//!
//! ## Failure model
//!
//! Decode failures, error envelopes, transport errors and remote closes all
//! end [`IndexerSubscription::run`] with a [`SubscriptionError`]. There is no
//! reconnect. Unrecognized v2 envelopes are skipped.
//!
//! The reorg sentinel is not interpreted here; it travels inside the event.
//!
//! ## Usage Example
//!
//! ```ignore
//! let subscription = Arc::new(IndexerSubscription::new(url, ProtocolVersion::V2));
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! tokio::spawn({
//!     let subscription = subscription.clone();
//!     async move { subscription.run(tx).await }
//! });
//! // ... later
//! subscription.stop();
//! ```

pub mod adapters;
pub mod domain;
pub mod error;

pub use adapters::IndexerSubscription;
pub use domain::{decode_message, Envelope};
pub use error::SubscriptionError;
pub use shared_types::BlockUpdateEvent;
