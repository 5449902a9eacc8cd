//! Error types for the clustering service.

use thiserror::Error;

/// Result type for service, framing and client operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur while framing, clustering or emitting batches.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Reading from or writing to a stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended in the middle of a frame.
    #[error("input truncated mid-frame: needed {needed} bytes, stream ended after {available}")]
    Truncated { needed: usize, available: usize },

    /// A frame declared more rows than the configured limit.
    #[error("frame declares {batch_size} rows, limit is {limit}")]
    FrameTooLarge { batch_size: usize, limit: usize },

    /// A startup parameter is out of range.
    #[error("invalid parameter '{parameter}': {reason}")]
    InvalidConfig {
        parameter: &'static str,
        reason: String,
    },

    /// The requested compute device is unknown or not compiled in.
    #[error("unsupported compute device: {0}")]
    UnsupportedDevice(String),

    /// Error from the underlying numr backend.
    #[error("numr error: {0}")]
    Backend(String),

    /// A buffer did not have the size its shape requires.
    #[error("shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    /// The clustering subprocess went away before answering.
    #[error("clustering service exited before producing output")]
    ServiceExited,
}

impl From<numr::error::Error> for ServiceError {
    fn from(err: numr::error::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

impl ServiceError {
    /// Whether this error is the mid-frame end-of-input fault.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}
