//! Error types for the licensing bridge.

use thiserror::Error;

/// Licensing bridge errors.
///
/// Licensing outcomes (denials, backend application errors) are never
/// errors at this level; they travel as replies. These cover the plumbing.
#[derive(Debug, Error)]
pub enum LicensingError {
    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The result dispatcher thread could not be started.
    #[error("failed to start result dispatcher: {0}")]
    DispatcherSpawn(#[from] std::io::Error),

    /// The reply for a call was dropped before it reached the caller.
    #[error("reply dropped before delivery")]
    ReplyDropped,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for licensing bridge operations.
pub type LicensingResult<T> = Result<T, LicensingError>;
