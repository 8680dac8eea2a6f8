//! Marshaling error types

use thiserror::Error;

/// Errors raised by buffer storage management
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// Requested capacity exceeds the hard buffer limit
    #[error("requested capacity {requested} exceeds the buffer limit of {limit} bytes")]
    TooLarge { requested: usize, limit: usize },
}

/// Errors raised when marshaling through an event data stream
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MarshalError {
    /// The stream's buffer has been shared and is read-only
    #[error("buffer is shared and can no longer be written")]
    BufferShared,

    /// Storage management failed
    #[error("buffer error: {0}")]
    Buffer(#[from] BufferError),
}
