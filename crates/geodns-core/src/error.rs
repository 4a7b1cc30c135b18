//! Error types for the geo-DNS service
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for geo-DNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the geo-DNS service
#[derive(Error, Debug)]
pub enum Error {
    /// Membership source errors
    #[error("membership source error: {0}")]
    Membership(String),

    /// DNS backend errors
    #[error("DNS backend error: {0}")]
    Backend(String),

    /// Hostname could not be resolved to an address
    #[error("name resolution failed for {hostname}: {message}")]
    Resolution {
        /// The hostname that failed to resolve
        hostname: String,
        /// Underlying cause
        message: String,
    },

    /// Geo-lookup service errors
    #[error("geo lookup error: {0}")]
    GeoLookup(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network-related errors
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a membership source error
    pub fn membership(msg: impl Into<String>) -> Self {
        Self::Membership(msg.into())
    }

    /// Create a DNS backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a name-resolution error
    pub fn resolution(hostname: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            hostname: hostname.into(),
            message: message.into(),
        }
    }

    /// Create a geo-lookup error
    pub fn geo_lookup(msg: impl Into<String>) -> Self {
        Self::GeoLookup(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
