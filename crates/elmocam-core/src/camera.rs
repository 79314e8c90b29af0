//! Camera driver: command exchanges, toggled motions, image capture
//!
//! [`Camera`] owns a [`BulkTransport`] plus all mutable driver state: the
//! compression setting, the per-family motion flags and the connection flag.
//! Everything is blocking and single-owner; `&mut self` serializes calls
//! within safe Rust, and multi-threaded callers must add their own mutex
//! around the whole driver (the endpoint set is one shared resource with no
//! reentrancy guarantee).

use std::time::Duration;

use crate::error::{CameraError, Result};
use crate::protocol::*;
use crate::transport::{BulkTransport, TransportError};

const COMMAND_TIMEOUT: Duration = Duration::from_millis(1000);
const DATA_TIMEOUT: Duration = Duration::from_millis(3000);
// Drain only has to outlast the device's inter-packet gap, not a full frame
const DRAIN_TIMEOUT: Duration = Duration::from_millis(100);

/// Zoom motion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
    Stop,
}

/// Focus motion request
///
/// `Near` and `Wide` are toggled motions; `Auto` is a stateless one-shot
/// autofocus trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    Near,
    Wide,
    Auto,
    Stop,
}

/// Brightness motion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessDirection {
    Lighten,
    Darken,
    Auto,
    Stop,
}

/// Driver for one connected Elmo document camera
///
/// Construct it over an already claimed and configured transport (see
/// `elmocam-usb`), or over the in-memory emulator from `elmocam-dummy`.
pub struct Camera<T> {
    transport: T,
    compression: u8,
    zooming: bool,
    focusing: bool,
    brightening: bool,
    connected: bool,
}

impl<T: BulkTransport> Camera<T> {
    /// Wrap a connected transport with default settings (compression 60)
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            compression: COMPRESSION_DEFAULT,
            zooming: false,
            focusing: false,
            brightening: false,
            connected: true,
        }
    }

    /// Whether the connection is still considered valid
    ///
    /// Becomes false after any transport failure during [`capture_image`];
    /// from then on every operation fails with
    /// [`CameraError::NotConnected`] until the device is reopened.
    ///
    /// [`capture_image`]: Camera::capture_image
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Current JPEG compression ratio
    pub fn compression(&self) -> u8 {
        self.compression
    }

    /// Set the compression ratio, clamped to 10..=100
    pub fn set_compression(&mut self, value: i32) {
        self.compression = clamp_compression(value);
    }

    /// Adjust the compression ratio by a delta, saturating at the bounds
    pub fn adjust_compression(&mut self, delta: i32) {
        self.compression = clamp_compression(self.compression as i32 + delta);
    }

    /// Query the firmware version; returns the raw 32-byte response
    pub fn version(&mut self) -> Result<Vec<u8>> {
        self.ensure_connected()?;
        self.exchange(Command::Version)
    }

    /// Query the front-panel button state; returns the raw 32-byte response
    pub fn read_buttons(&mut self) -> Result<Vec<u8>> {
        self.ensure_connected()?;
        self.exchange(Command::Buttons)
    }

    /// Start, reverse or stop zoom motion
    ///
    /// While a zoom is in progress, any call stops it first, whatever the
    /// requested direction. One write and one 32-byte acknowledgment read
    /// per call.
    pub fn zoom(&mut self, direction: ZoomDirection) -> Result<()> {
        self.ensure_connected()?;
        if self.zooming {
            self.exchange(Command::ZoomStop)?;
            self.zooming = false;
            return Ok(());
        }
        match direction {
            ZoomDirection::In => {
                self.exchange(Command::ZoomIn)?;
                self.zooming = true;
            }
            ZoomDirection::Out => {
                self.exchange(Command::ZoomOut)?;
                self.zooming = true;
            }
            // No motion in progress: a stop is harmless on the wire and
            // leaves no flag behind
            ZoomDirection::Stop => {
                self.exchange(Command::ZoomStop)?;
            }
        }
        Ok(())
    }

    /// Drive the focus motor, or trigger autofocus
    ///
    /// Near/wide use toggle semantics like zoom; auto is sent immediately
    /// and sets no flag. A focus motion in progress is always stopped first.
    pub fn focus(&mut self, direction: FocusDirection) -> Result<()> {
        self.ensure_connected()?;
        if self.focusing {
            self.exchange(Command::FocusStop)?;
            self.focusing = false;
            return Ok(());
        }
        match direction {
            FocusDirection::Near => {
                self.exchange(Command::FocusNear)?;
                self.focusing = true;
            }
            FocusDirection::Wide => {
                self.exchange(Command::FocusWide)?;
                self.focusing = true;
            }
            FocusDirection::Auto => {
                self.exchange(Command::FocusAuto)?;
            }
            FocusDirection::Stop => {
                self.exchange(Command::FocusStop)?;
            }
        }
        Ok(())
    }

    /// Drive the brightness adjustment, or trigger auto-brightness
    pub fn brightness(&mut self, direction: BrightnessDirection) -> Result<()> {
        self.ensure_connected()?;
        if self.brightening {
            self.exchange(Command::BrightnessStop)?;
            self.brightening = false;
            return Ok(());
        }
        match direction {
            BrightnessDirection::Lighten => {
                self.exchange(Command::BrightnessLight)?;
                self.brightening = true;
            }
            BrightnessDirection::Darken => {
                self.exchange(Command::BrightnessDark)?;
                self.brightening = true;
            }
            BrightnessDirection::Auto => {
                self.exchange(Command::BrightnessAuto)?;
            }
            BrightnessDirection::Stop => {
                self.exchange(Command::BrightnessStop)?;
            }
        }
        Ok(())
    }

    /// Capture one JPEG frame
    ///
    /// Sends the picture request with the current compression ratio baked
    /// into the parameter byte, then reassembles the chunked reply: 512-byte
    /// header packets whose bytes 4-5 announce the segment size, 504 payload
    /// bytes in the header packet itself, and the remainder of the segment
    /// in one further read. A size equal to the 0xFEF8 sentinel means more
    /// segments follow; a smaller size ends the image.
    ///
    /// Any failure (short read, timeout, transport fault) drains the data
    /// endpoint, invalidates the connection and returns
    /// [`CameraError::CaptureFailed`]. The caller decides whether to reopen
    /// and retry; nothing here is fatal.
    pub fn capture_image(&mut self) -> Result<Vec<u8>> {
        self.ensure_connected()?;

        let request = Command::Picture {
            compression: self.compression,
        }
        .encode();

        if let Err(e) = self.transport.bulk_write(DATA_OUT_EP, &request, COMMAND_TIMEOUT) {
            return Err(self.abort_capture("picture request write", &e));
        }
        // The device acknowledges the request before streaming; the content
        // of the acknowledgment is not interpreted
        if let Err(e) = self.transport.bulk_read(DATA_IN_EP, ACK_LEN, DATA_TIMEOUT) {
            return Err(self.abort_capture("picture request ack", &e));
        }

        let mut image = Vec::new();
        let mut size = SEGMENT_SENTINEL as usize;
        while size == SEGMENT_SENTINEL as usize {
            let header = match self.transport.bulk_read(DATA_IN_EP, DATA_PACKET_LEN, DATA_TIMEOUT)
            {
                Ok(packet) if packet.len() == DATA_PACKET_LEN => packet,
                Ok(packet) => {
                    return Err(self.abort_capture_short("segment header", packet.len()));
                }
                Err(e) => return Err(self.abort_capture("segment header", &e)),
            };
            size = segment_size(&header) as usize;
            image.extend_from_slice(&header[PAYLOAD_OFFSET..]);

            // 504 bytes of the segment arrived in the header packet; a final
            // segment below that size has no remainder to fetch
            let rest_len = size.saturating_sub(HEADER_PAYLOAD_LEN);
            if rest_len > 0 {
                let rest = match self.transport.bulk_read(DATA_IN_EP, rest_len, DATA_TIMEOUT) {
                    Ok(rest) if rest.len() == rest_len => rest,
                    Ok(rest) => {
                        return Err(self.abort_capture_short("segment payload", rest.len()));
                    }
                    Err(e) => return Err(self.abort_capture("segment payload", &e)),
                };
                image.extend_from_slice(&rest);
            }
            log::trace!("segment of {} bytes, {} total", size, image.len());
        }

        log::debug!("captured frame: {} bytes", image.len());
        Ok(image)
    }

    /// Flush stale data from the image endpoint until the device goes quiet
    ///
    /// Reads with a short timeout and discards everything; the timeout is
    /// the success criterion ("no more stale data"). Other transport faults
    /// end the loop too and are swallowed, since drain runs on paths that
    /// have already failed.
    pub fn drain(&mut self) {
        let mut discarded = 0usize;
        loop {
            match self
                .transport
                .bulk_read(DATA_IN_EP, DATA_PACKET_LEN, DRAIN_TIMEOUT)
            {
                Ok(packet) => discarded += packet.len(),
                Err(TransportError::Timeout) => break,
                Err(e) => {
                    log::debug!("drain ended on non-timeout fault: {}", e);
                    break;
                }
            }
        }
        if discarded > 0 {
            log::debug!("drained {} stale bytes", discarded);
        }
    }

    /// Consume the driver and hand back the transport
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(CameraError::NotConnected)
        }
    }

    /// One command exchange: write the packet, read the 32-byte acknowledgment
    fn exchange(&mut self, command: Command) -> Result<Vec<u8>> {
        log::trace!("sending {:?}", command);
        self.transport
            .bulk_write(CMD_OUT_EP, &command.encode(), COMMAND_TIMEOUT)?;
        let ack = self.transport.bulk_read(CMD_IN_EP, ACK_LEN, COMMAND_TIMEOUT)?;
        Ok(ack)
    }

    fn abort_capture(&mut self, stage: &str, fault: &TransportError) -> CameraError {
        if fault.is_timeout() {
            log::debug!("capture aborted at {}: timeout", stage);
        } else {
            log::warn!("capture aborted at {}: {}", stage, fault);
        }
        self.recover();
        CameraError::CaptureFailed
    }

    fn abort_capture_short(&mut self, stage: &str, got: usize) -> CameraError {
        log::warn!("capture aborted at {}: short read ({} bytes)", stage, got);
        self.recover();
        CameraError::CaptureFailed
    }

    /// Resynchronize after a failed capture and invalidate the connection
    fn recover(&mut self) {
        self.drain();
        self.connected = false;
    }
}

fn clamp_compression(value: i32) -> u8 {
    value.clamp(COMPRESSION_MIN as i32, COMPRESSION_MAX as i32) as u8
}
