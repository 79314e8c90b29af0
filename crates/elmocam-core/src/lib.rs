//! elmocam-core - protocol driver for the Elmo L-12 document camera
//!
//! Command encoding, the request/acknowledgment exchange and the chunked
//! image reassembly loop, written against the [`transport::BulkTransport`]
//! seam so the whole driver runs unmodified over real USB (`elmocam-usb`)
//! or the in-memory emulator (`elmocam-dummy`).
//!
//! # Example
//!
//! ```ignore
//! use elmocam_core::{Camera, ZoomDirection};
//!
//! let mut camera = elmocam_usb::open()?;
//! camera.set_compression(80);
//! camera.zoom(ZoomDirection::In)?;
//! // ... later: second call stops the motion
//! camera.zoom(ZoomDirection::In)?;
//! let jpeg = camera.capture_image()?;
//! # Ok::<(), elmocam_core::CameraError>(())
//! ```

pub mod camera;
pub mod error;
pub mod protocol;
pub mod transport;

pub use camera::{BrightnessDirection, Camera, FocusDirection, ZoomDirection};
pub use error::{CameraError, Result};
pub use transport::{BulkTransport, TransportError};
