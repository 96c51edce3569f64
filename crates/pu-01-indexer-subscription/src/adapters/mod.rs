pub mod websocket;

pub use websocket::IndexerSubscription;
