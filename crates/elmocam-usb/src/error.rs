//! Error types for device discovery and setup

use thiserror::Error;

/// Result type for connection establishment
pub type Result<T> = std::result::Result<T, UsbError>;

/// Errors that can occur while locating and configuring the camera
#[derive(Debug, Error)]
pub enum UsbError {
    /// No device with the requested vendor/product ids on the bus. Not
    /// retryable without a fresh scan; do not poll for this in a tight loop.
    #[error("no camera with VID {vid:04X} PID {pid:04X} found")]
    DeviceNotFound { vid: u16, pid: u16 },

    /// Device was found but could not be opened or reset
    #[error("failed to open device: {0}")]
    OpenFailed(String),

    /// Kernel-driver detach, interface claim or endpoint setup failed
    #[error("failed to claim interface: {0}")]
    ClaimFailed(String),

    /// Setting the active configuration failed
    #[error("failed to configure device: {0}")]
    ConfigureFailed(String),
}
