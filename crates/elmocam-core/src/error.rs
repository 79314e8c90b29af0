//! Error types for the camera driver

use thiserror::Error;

use crate::transport::TransportError;

/// Result type for driver operations
pub type Result<T> = std::result::Result<T, CameraError>;

/// Errors reported by the camera driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// Operation attempted after the connection was invalidated
    #[error("camera is not connected")]
    NotConnected,

    /// Transport fault during a one-shot command exchange
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Image capture failed; the device has been drained and the connection
    /// invalidated. Not fatal - reopen the device and retry at the caller's
    /// cadence.
    #[error("image capture failed")]
    CaptureFailed,
}
