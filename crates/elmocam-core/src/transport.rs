//! Bulk transport seam
//!
//! The driver core never touches USB directly; it talks to a
//! [`BulkTransport`], which `elmocam-usb` implements over nusb and
//! `elmocam-dummy` implements in memory. Both operations are blocking with a
//! per-call timeout; there is no cancellation mid-transfer.

use std::time::Duration;

use thiserror::Error;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Faults a transport can report
///
/// `Timeout` is load-bearing for the driver: it terminates the drain loop and
/// is the ordinary end-of-stream signal during capture. Everything else is
/// treated the same way for recovery but kept distinguishable for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transfer timed out")]
    Timeout,

    #[error("device disconnected")]
    Disconnected,

    #[error("endpoint {0:#04x} is not part of the claimed interface")]
    InvalidEndpoint(u8),

    #[error("transfer failed: {0}")]
    Io(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout)
    }
}

/// Blocking bulk-transfer primitives against one claimed USB interface
///
/// Endpoint addresses are the raw USB values (IN endpoints have bit 7 set).
/// Implementations are not required to be reentrant; the driver serializes
/// access through `&mut self`.
pub trait BulkTransport {
    /// Write `data` to an OUT endpoint, blocking up to `timeout`.
    fn bulk_write(&mut self, endpoint: u8, data: &[u8], timeout: Duration) -> Result<()>;

    /// Read up to `len` bytes from an IN endpoint, blocking up to `timeout`.
    ///
    /// Returns the bytes the device actually delivered; a short return is
    /// possible and the caller decides whether that is an error.
    fn bulk_read(&mut self, endpoint: u8, len: usize, timeout: Duration) -> Result<Vec<u8>>;
}
