//! Checkpoint error types.

use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// A recorded name has no counterpart in the machine
    #[error("Unknown element in snapshot: {0}")]
    UnknownElement(String),

    /// The snapshot was taken from a differently named machine
    #[error("Snapshot of machine {found} cannot be restored into {expected}")]
    MachineMismatch { expected: String, found: String },
}
