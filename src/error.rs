//! Error types for the caching front
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Error Enum ==
/// Unified error type for all cachefront operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote client was unreachable or answered with a protocol error.
    /// Surfaced to the caller verbatim and never retried by this layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// A resource-exists check or resource-create call failed during mapping
    /// setup or series bucket rotation. Logged and non-fatal; the computed
    /// resource name is still used.
    #[error("mapping setup failed for \"{index}\": {message}")]
    MappingSetup { index: String, message: String },

    /// Invalid configuration, e.g. a reserved instance name or a zero TTL.
    /// Returned synchronously, fatal to that call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The cache backend failed. Distinguished from a plain miss so callers
    /// can tell "no data" from "cache unavailable".
    #[error("cache backend error: {0}")]
    CacheBackend(String),

    /// A payload could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for cachefront operations.
pub type Result<T> = std::result::Result<T, Error>;
