//! # Error Types
//!
//! Errors raised while constructing shared values.

use thiserror::Error;

/// The indexer protocol selector was not one of the two known versions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("The circles version must be 'v1' or 'v2' (got '{0}')")]
pub struct UnsupportedProtocolVersion(pub String);

/// An account identifier could not be normalised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Shorter than the two-character `0x` prefix.
    #[error("Account identifier '{0}' is too short to carry a 0x prefix")]
    TooShort(String),
}
