use thiserror::Error;

/// Errors that can occur while capturing, converting or storing audio.
///
/// An empty device buffer is not an error; see `BufferPoll::Empty`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("failed to start capture device: {0}")]
    DeviceStartFailure(String),

    #[error("transient poll failure: {0}")]
    TransientPollFailure(String),

    #[error("device stopped responding after {consecutive_failures} consecutive poll failures")]
    DeviceUnresponsive { consecutive_failures: u32 },

    #[error("malformed chunk: expected {expected} bytes, device returned {actual}")]
    MalformedChunk { expected: usize, actual: usize },

    #[error("invalid buffer length: {0} bytes is not a whole number of samples")]
    InvalidBufferLength(usize),

    #[error("invalid audio format: {0}")]
    InvalidFormat(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("write failed: {0}")]
    IoWrite(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("unknown error: {0}")]
    Unknown(String),
}
