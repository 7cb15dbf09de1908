//! Error types for the ring library.
//!
//! Ring operations themselves never fail: lookups on an empty ring yield
//! `None`, and mutations always publish a complete table. Errors only arise
//! while turning external configuration into a ring.

/// Result type alias for the ring library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the ring library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration values are out of range.
    #[error("invalid ring configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be parsed.
    #[error("malformed ring configuration: {0}")]
    Config(#[from] serde_json::Error),
}
