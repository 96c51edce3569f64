pub mod http;

pub use http::{HealthEndpoint, DEFAULT_BIND_ADDRESS};
