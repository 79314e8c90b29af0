//! elmocam-dummy - in-memory camera emulator
//!
//! [`DummyCamera`] implements `BulkTransport` without hardware: command
//! packets are parsed and acknowledged, and a picture request queues a
//! correctly chunked segment stream built from a configured image. Useful
//! for tests and for running the CLI without a camera attached.
//!
//! The emulator reproduces the firmware's framing: 512-byte header packets
//! announcing the segment size in bytes 4-5 (0xFEF8 while more segments
//! follow), 504 payload bytes in the header packet, and the remainder of
//! the segment served by the following read. Reads against an empty queue
//! time out, which is exactly how the real device ends a drain loop.

use std::collections::VecDeque;
use std::time::Duration;

use elmocam_core::protocol::{
    Command, ACK_LEN, CMD_IN_EP, CMD_OUT_EP, COMMAND_LEN, DATA_IN_EP, DATA_OUT_EP,
    DATA_PACKET_LEN, HEADER_PAYLOAD_LEN, OPCODE_OFFSET, PARAM_OFFSET, PAYLOAD_OFFSET,
    SEGMENT_SENTINEL, SIZE_OFFSET,
};
use elmocam_core::transport::{BulkTransport, TransportError};

/// Emulated camera serving a fixed image
pub struct DummyCamera {
    image: Vec<u8>,
    cmd_replies: VecDeque<Vec<u8>>,
    data_replies: VecDeque<Vec<u8>>,
    /// Compression ratio seen in the most recent picture request
    pub last_compression: Option<u8>,
    /// Number of picture requests received
    pub captures_served: usize,
}

impl DummyCamera {
    /// Emulate a camera that delivers `image` for every picture request
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            cmd_replies: VecDeque::new(),
            data_replies: VecDeque::new(),
            last_compression: None,
            captures_served: 0,
        }
    }

    /// Replace the image served by subsequent picture requests
    pub fn set_image(&mut self, image: Vec<u8>) {
        self.image = image;
    }

    /// Queue the acknowledgment plus the full segment stream for one frame
    fn queue_frame(&mut self) {
        self.data_replies.push_back(vec![0u8; ACK_LEN]);

        let mut offset = 0;
        loop {
            let remaining = self.image.len() - offset;
            let size = remaining.min(SEGMENT_SENTINEL as usize);

            let mut header = vec![0u8; DATA_PACKET_LEN];
            header[SIZE_OFFSET..SIZE_OFFSET + 2]
                .copy_from_slice(&(size as u16).to_le_bytes());
            let in_header = size.min(HEADER_PAYLOAD_LEN);
            header[PAYLOAD_OFFSET..PAYLOAD_OFFSET + in_header]
                .copy_from_slice(&self.image[offset..offset + in_header]);
            self.data_replies.push_back(header);

            if size > HEADER_PAYLOAD_LEN {
                self.data_replies
                    .push_back(self.image[offset + HEADER_PAYLOAD_LEN..offset + size].to_vec());
            }

            offset += size;
            if size < SEGMENT_SENTINEL as usize {
                break;
            }
            // An image ending exactly on the sentinel boundary still needs a
            // final sub-sentinel segment so the reader's loop terminates
            if offset == self.image.len() {
                let header = vec![0u8; DATA_PACKET_LEN];
                self.data_replies.push_back(header);
                break;
            }
        }
    }

    fn handle_command(&mut self, packet: &[u8]) {
        let opcode = [packet[OPCODE_OFFSET], packet[OPCODE_OFFSET + 1]];
        log::trace!("dummy camera got command {:02X} {:02X}", opcode[0], opcode[1]);
        // Every control command is acknowledged with a 32-byte packet
        self.cmd_replies.push_back(vec![0u8; ACK_LEN]);
    }
}

impl BulkTransport for DummyCamera {
    fn bulk_write(
        &mut self,
        endpoint: u8,
        data: &[u8],
        _timeout: Duration,
    ) -> Result<(), TransportError> {
        if data.len() != COMMAND_LEN {
            return Err(TransportError::Io(format!(
                "unexpected packet length {}",
                data.len()
            )));
        }
        match endpoint {
            CMD_OUT_EP => {
                self.handle_command(data);
                Ok(())
            }
            DATA_OUT_EP => {
                let picture = Command::Picture { compression: 0 }.opcode();
                if data[OPCODE_OFFSET] == picture[0] && data[OPCODE_OFFSET + 1] == picture[1] {
                    self.last_compression = Some(data[PARAM_OFFSET]);
                    self.captures_served += 1;
                    self.queue_frame();
                    Ok(())
                } else {
                    Err(TransportError::Io("unexpected data-endpoint command".into()))
                }
            }
            other => Err(TransportError::InvalidEndpoint(other)),
        }
    }

    fn bulk_read(
        &mut self,
        endpoint: u8,
        len: usize,
        _timeout: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        let queue = match endpoint {
            CMD_IN_EP => &mut self.cmd_replies,
            DATA_IN_EP => &mut self.data_replies,
            other => return Err(TransportError::InvalidEndpoint(other)),
        };
        match queue.pop_front() {
            Some(mut reply) => {
                // A request shorter than the queued packet truncates it, as
                // a too-small host buffer would
                reply.truncate(len);
                Ok(reply)
            }
            None => Err(TransportError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elmocam_core::protocol::segment_size;
    use elmocam_core::{Camera, CameraError, FocusDirection, ZoomDirection};

    /// JPEG-shaped filler: SOI marker, deterministic body, EOI marker
    fn test_image(len: usize) -> Vec<u8> {
        assert!(len >= 4);
        let mut image = vec![0xFF, 0xD8];
        image.extend((0..len - 4).map(|i| (i % 251) as u8));
        image.extend([0xFF, 0xD9]);
        image
    }

    #[test]
    fn test_end_to_end_capture() {
        // Two full segments plus a final one comfortably above the 504-byte
        // header payload, so the reassembly is byte-exact
        let image = test_image(2 * SEGMENT_SENTINEL as usize + 30000);
        let mut cam = Camera::new(DummyCamera::new(image.clone()));
        cam.set_compression(75);

        let captured = cam.capture_image().unwrap();
        assert_eq!(captured, image);
        assert_eq!(cam.into_transport().last_compression, Some(75));
    }

    #[test]
    fn test_small_image_padded_to_header_payload() {
        let image = test_image(100);
        let mut cam = Camera::new(DummyCamera::new(image.clone()));

        let captured = cam.capture_image().unwrap();
        // The final (here: only) segment always contributes the full
        // header payload; the tail past the JPEG EOI is padding
        assert_eq!(captured.len(), HEADER_PAYLOAD_LEN);
        assert_eq!(&captured[..image.len()], &image[..]);
    }

    #[test]
    fn test_sentinel_boundary_image_terminates() {
        let image = test_image(SEGMENT_SENTINEL as usize);
        let mut cam = Camera::new(DummyCamera::new(image.clone()));

        let captured = cam.capture_image().unwrap();
        assert_eq!(&captured[..image.len()], &image[..]);
        // Terminating zero-size segment appends one header payload of padding
        assert_eq!(captured.len(), image.len() + HEADER_PAYLOAD_LEN);
    }

    #[test]
    fn test_repeated_captures() {
        let image = test_image(70000);
        let mut cam = Camera::new(DummyCamera::new(image.clone()));

        for _ in 0..3 {
            assert_eq!(cam.capture_image().unwrap(), image);
        }
        assert_eq!(cam.into_transport().captures_served, 3);
    }

    #[test]
    fn test_motion_commands_are_acknowledged() {
        let mut cam = Camera::new(DummyCamera::new(test_image(1000)));

        cam.zoom(ZoomDirection::In).unwrap();
        cam.zoom(ZoomDirection::In).unwrap(); // stop
        cam.focus(FocusDirection::Auto).unwrap();
        assert!(cam.is_connected());
    }

    #[test]
    fn test_drain_consumes_stale_stream() {
        let mut dummy = DummyCamera::new(test_image(70000));
        // A frame nobody reads, as after a half-finished capture
        dummy.queue_frame();
        let mut cam = Camera::new(dummy);

        cam.drain();
        // The stale packets are gone; the next capture starts clean
        assert_eq!(cam.capture_image().unwrap(), test_image(70000));
    }

    #[test]
    fn test_capture_times_out_without_queued_frame() {
        // Without a preceding picture request there is nothing to read
        let mut dummy = DummyCamera::new(test_image(1000));
        let err = dummy
            .bulk_read(DATA_IN_EP, DATA_PACKET_LEN, Duration::from_millis(10))
            .unwrap_err();
        assert_eq!(err, TransportError::Timeout);
    }

    #[test]
    fn test_segment_framing() {
        let mut dummy = DummyCamera::new(test_image(70000));
        dummy.queue_frame();

        let ack = dummy.data_replies.pop_front().unwrap();
        assert_eq!(ack.len(), ACK_LEN);

        let header = dummy.data_replies.pop_front().unwrap();
        assert_eq!(header.len(), DATA_PACKET_LEN);
        assert_eq!(segment_size(&header), SEGMENT_SENTINEL);

        let rest = dummy.data_replies.pop_front().unwrap();
        assert_eq!(rest.len(), SEGMENT_SENTINEL as usize - HEADER_PAYLOAD_LEN);

        let final_header = dummy.data_replies.pop_front().unwrap();
        assert_eq!(segment_size(&final_header) as usize, 70000 - SEGMENT_SENTINEL as usize);
    }

    #[test]
    fn test_connection_survives_capture() {
        let mut cam = Camera::new(DummyCamera::new(test_image(5000)));
        cam.capture_image().unwrap();
        assert!(cam.is_connected());
        assert!(cam.version().is_ok());
    }

    #[test]
    fn test_version_ack() {
        let mut cam = Camera::new(DummyCamera::new(test_image(1000)));
        let reply = cam.version().unwrap();
        assert_eq!(reply.len(), ACK_LEN);
        assert!(!matches!(
            cam.read_buttons(),
            Err(CameraError::NotConnected)
        ));
    }
}
