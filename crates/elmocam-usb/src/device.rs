//! nusb-backed transport and connection establishment
//!
//! Uses nusb's blocking API throughout: transfers are submitted and reaped
//! with `wait_next_complete`, and a timeout cancels whatever is still in
//! flight so the endpoint is clean for the next call.

use std::time::Duration;

use nusb::transfer::{Buffer, Bulk, In, Out};
use nusb::{Endpoint, MaybeFuture};

use elmocam_core::protocol::{
    CMD_IN_EP, CMD_OUT_EP, DATA_IN_EP, DATA_OUT_EP, ELMO_USB_PRODUCT, ELMO_USB_VENDOR,
};
use elmocam_core::transport::{BulkTransport, TransportError};
use elmocam_core::Camera;

use crate::error::{Result, UsbError};

/// Blocking bulk transport over the camera's claimed interface
///
/// Holds the two endpoint pairs (commands and image data). The endpoints
/// keep the interface claim alive for the lifetime of this struct.
pub struct UsbTransport {
    cmd_out: Endpoint<Bulk, Out>,
    cmd_in: Endpoint<Bulk, In>,
    data_out: Endpoint<Bulk, Out>,
    data_in: Endpoint<Bulk, In>,
}

/// Open the first Elmo L-12 on the bus
pub fn open() -> Result<Camera<UsbTransport>> {
    open_with_ids(ELMO_USB_VENDOR, ELMO_USB_PRODUCT)
}

/// Open the first device matching the given vendor/product ids
///
/// Detaches a kernel-owned driver if one holds interface 0, claims the
/// interface, resets the device and sets its active configuration, then
/// wraps the four bulk endpoints in a [`Camera`].
pub fn open_with_ids(vid: u16, pid: u16) -> Result<Camera<UsbTransport>> {
    let device_info = nusb::list_devices()
        .wait()
        .map_err(|e| UsbError::OpenFailed(e.to_string()))?
        .find(|d| d.vendor_id() == vid && d.product_id() == pid)
        .ok_or(UsbError::DeviceNotFound { vid, pid })?;

    log::info!(
        "opening camera {:04X}:{:04X} at bus {} address {}",
        vid,
        pid,
        device_info.busnum(),
        device_info.device_address()
    );

    let device = device_info
        .open()
        .wait()
        .map_err(|e| UsbError::OpenFailed(e.to_string()))?;

    let interface = device
        .detach_and_claim_interface(0)
        .wait()
        .map_err(|e| UsbError::ClaimFailed(e.to_string()))?;

    device
        .reset()
        .wait()
        .map_err(|e| UsbError::OpenFailed(format!("reset failed: {}", e)))?;

    device
        .set_configuration(1)
        .wait()
        .map_err(|e| UsbError::ConfigureFailed(e.to_string()))?;

    let cmd_out = interface
        .endpoint::<Bulk, Out>(CMD_OUT_EP)
        .map_err(|e| UsbError::ClaimFailed(e.to_string()))?;
    let cmd_in = interface
        .endpoint::<Bulk, In>(CMD_IN_EP)
        .map_err(|e| UsbError::ClaimFailed(e.to_string()))?;
    let data_out = interface
        .endpoint::<Bulk, Out>(DATA_OUT_EP)
        .map_err(|e| UsbError::ClaimFailed(e.to_string()))?;
    let data_in = interface
        .endpoint::<Bulk, In>(DATA_IN_EP)
        .map_err(|e| UsbError::ClaimFailed(e.to_string()))?;

    log::debug!("camera interface claimed and configured");

    Ok(Camera::new(UsbTransport {
        cmd_out,
        cmd_in,
        data_out,
        data_in,
    }))
}

/// Cancel and reap whatever is still pending so the endpoint is reusable
/// after a timeout. A macro rather than a function sidesteps naming the
/// endpoint's direction parameter.
macro_rules! reap {
    ($ep:expr) => {{
        $ep.cancel_all();
        while $ep.pending() > 0 {
            if $ep.wait_next_complete(Duration::from_secs(1)).is_none() {
                break;
            }
        }
    }};
}

fn map_transfer_error(e: nusb::transfer::TransferError) -> TransportError {
    match e {
        nusb::transfer::TransferError::Disconnected => TransportError::Disconnected,
        other => TransportError::Io(other.to_string()),
    }
}

impl BulkTransport for UsbTransport {
    fn bulk_write(
        &mut self,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> std::result::Result<(), TransportError> {
        let ep = match endpoint {
            CMD_OUT_EP => &mut self.cmd_out,
            DATA_OUT_EP => &mut self.data_out,
            _ => return Err(TransportError::InvalidEndpoint(endpoint)),
        };

        ep.submit(Buffer::from(data.to_vec()));
        let completion = match ep.wait_next_complete(timeout) {
            Some(completion) => completion,
            None => {
                reap!(ep);
                return Err(TransportError::Timeout);
            }
        };
        completion.status.map_err(map_transfer_error)?;
        log::trace!("wrote {} bytes to {:#04x}", data.len(), endpoint);
        Ok(())
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        len: usize,
        timeout: Duration,
    ) -> std::result::Result<Vec<u8>, TransportError> {
        let ep = match endpoint {
            CMD_IN_EP => &mut self.cmd_in,
            DATA_IN_EP => &mut self.data_in,
            _ => return Err(TransportError::InvalidEndpoint(endpoint)),
        };

        // IN requests must be a whole number of max-size packets; the
        // transfer still ends at the device's short packet
        let max_packet = ep.max_packet_size();
        let request_len = len.div_ceil(max_packet) * max_packet;

        ep.submit(Buffer::new(request_len));
        let completion = match ep.wait_next_complete(timeout) {
            Some(completion) => completion,
            None => {
                reap!(ep);
                return Err(TransportError::Timeout);
            }
        };
        completion.status.map_err(map_transfer_error)?;

        let n = completion.actual_len.min(len);
        log::trace!("read {} bytes from {:#04x}", n, endpoint);
        Ok(completion.buffer[..n].to_vec())
    }
}
