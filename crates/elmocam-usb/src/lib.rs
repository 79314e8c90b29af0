//! elmocam-usb - USB transport for the Elmo L-12 driver
//!
//! Device discovery and the blocking bulk transport behind
//! `elmocam_core::BulkTransport`, implemented with nusb. The camera exposes
//! two bulk endpoint pairs on interface 0: one for 32-byte command packets
//! and their acknowledgments, one for the chunked image stream.
//!
//! # Example
//!
//! ```no_run
//! let mut camera = elmocam_usb::open()?;
//! let jpeg = camera.capture_image()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;

pub use device::{open, open_with_ids, UsbTransport};
pub use error::{Result, UsbError};
