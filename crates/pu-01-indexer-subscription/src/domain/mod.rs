pub mod envelope;

pub use envelope::{decode_message, decode_v1, decode_v2, Envelope};
