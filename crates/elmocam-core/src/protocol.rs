//! Wire protocol constants and command encoding
//!
//! The Elmo L-12 speaks a fixed-layout packet protocol over USB bulk
//! endpoints. Every command is a 32-byte packet: a length marker at byte 4
//! (always 0x18), a two-byte opcode at bytes 8-9 and a single parameter at
//! byte 12; all other bytes are zero. The device acknowledges each command
//! with a 32-byte packet on the matching IN endpoint.
//!
//! Image data arrives on a separate endpoint pair as a sequence of 512-byte
//! packets. Bytes 4-5 of a segment's first packet carry the number of image
//! bytes remaining in the segment (low byte first); the payload starts at
//! byte 8. A size equal to [`SEGMENT_SENTINEL`] means further segments
//! follow; a smaller size marks the final segment. The sentinel is a fixed
//! firmware constant (the maximum segment size), not a negotiated value.

// USB device identifiers (Elmo L-12)
pub const ELMO_USB_VENDOR: u16 = 0x09A1;
pub const ELMO_USB_PRODUCT: u16 = 0x001D;

// Bulk endpoints: one pair for control commands, one for the image stream
pub const CMD_OUT_EP: u8 = 0x02;
pub const CMD_IN_EP: u8 = 0x81;
pub const DATA_OUT_EP: u8 = 0x04;
pub const DATA_IN_EP: u8 = 0x83;

// Command packet layout
pub const COMMAND_LEN: usize = 32;
pub const ACK_LEN: usize = 32;
pub const LENGTH_OFFSET: usize = 4;
pub const LENGTH_MARKER: u8 = 0x18;
pub const OPCODE_OFFSET: usize = 8;
pub const PARAM_OFFSET: usize = 12;

// Image stream layout
pub const DATA_PACKET_LEN: usize = 512;
pub const SIZE_OFFSET: usize = 4;
pub const PAYLOAD_OFFSET: usize = 8;
/// Image bytes carried by a segment's header packet (512 - 8).
pub const HEADER_PAYLOAD_LEN: usize = DATA_PACKET_LEN - PAYLOAD_OFFSET;
/// Segment size meaning "more segments follow" (maximum segment size).
pub const SEGMENT_SENTINEL: u16 = 0xFEF8;

// Compression setting bounds (JPEG quality ratio)
pub const COMPRESSION_MIN: u8 = 10;
pub const COMPRESSION_MAX: u8 = 100;
pub const COMPRESSION_DEFAULT: u8 = 60;

/// Commands understood by the camera
///
/// A closed enumeration over the packet templates of the original firmware
/// protocol. [`Command::encode`] produces a fresh 32-byte packet, so the
/// templates are never mutated in place; the picture command's parameter
/// byte carries the compression ratio chosen at encode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Firmware version query; the raw 32-byte response is the answer.
    Version,
    /// Front-panel button state query.
    Buttons,
    /// Request one JPEG frame at the given compression ratio (10-100).
    Picture { compression: u8 },
    ZoomStop,
    ZoomIn,
    ZoomOut,
    FocusAuto,
    FocusWide,
    FocusNear,
    FocusStop,
    BrightnessStop,
    BrightnessLight,
    BrightnessDark,
    BrightnessAuto,
}

impl Command {
    /// Two-byte operation selector (packet bytes 8-9)
    pub const fn opcode(self) -> [u8; 2] {
        match self {
            Command::Version => [0x10, 0x8B],
            Command::Buttons => [0x00, 0x0F],
            Command::Picture { .. } => [0x8E, 0x80],
            Command::ZoomStop | Command::ZoomIn | Command::ZoomOut => [0xE0, 0x00],
            Command::FocusAuto => [0xE1, 0x00],
            Command::FocusWide | Command::FocusNear | Command::FocusStop => [0xEA, 0x00],
            Command::BrightnessStop
            | Command::BrightnessLight
            | Command::BrightnessDark
            | Command::BrightnessAuto => [0xE2, 0x00],
        }
    }

    /// Operation-specific parameter (packet byte 12)
    pub const fn param(self) -> u8 {
        match self {
            Command::Version | Command::Buttons => 0x00,
            Command::Picture { compression } => compression,
            Command::ZoomStop => 0x00,
            Command::ZoomIn => 0x01,
            Command::ZoomOut => 0x02,
            Command::FocusAuto => 0x00,
            Command::FocusWide => 0x00,
            Command::FocusNear => 0x01,
            Command::FocusStop => 0x02,
            Command::BrightnessLight => 0x02,
            Command::BrightnessDark => 0x03,
            Command::BrightnessStop => 0x04,
            Command::BrightnessAuto => 0x05,
        }
    }

    /// Build the 32-byte packet for this command
    pub fn encode(self) -> [u8; COMMAND_LEN] {
        let mut packet = [0u8; COMMAND_LEN];
        packet[LENGTH_OFFSET] = LENGTH_MARKER;
        let opcode = self.opcode();
        packet[OPCODE_OFFSET] = opcode[0];
        packet[OPCODE_OFFSET + 1] = opcode[1];
        packet[PARAM_OFFSET] = self.param();
        packet
    }
}

/// Decode a segment's remaining byte count from its header packet
///
/// Bytes 4-5, low byte first: `256 * byte5 + byte4`. The caller must have
/// verified the packet is at least [`PAYLOAD_OFFSET`] bytes long.
pub fn segment_size(packet: &[u8]) -> u16 {
    u16::from_le_bytes([packet[SIZE_OFFSET], packet[SIZE_OFFSET + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference packets from the original firmware tables
    fn reference(opcode: [u8; 2], param: u8) -> [u8; 32] {
        let mut p = [0u8; 32];
        p[4] = 0x18;
        p[8] = opcode[0];
        p[9] = opcode[1];
        p[12] = param;
        p
    }

    #[test]
    fn test_command_encoding_matches_firmware_tables() {
        assert_eq!(Command::Version.encode(), reference([0x10, 0x8B], 0x00));
        assert_eq!(Command::Buttons.encode(), reference([0x00, 0x0F], 0x00));
        assert_eq!(
            Command::Picture { compression: 60 }.encode(),
            reference([0x8E, 0x80], 60)
        );
        assert_eq!(Command::ZoomStop.encode(), reference([0xE0, 0x00], 0x00));
        assert_eq!(Command::ZoomIn.encode(), reference([0xE0, 0x00], 0x01));
        assert_eq!(Command::ZoomOut.encode(), reference([0xE0, 0x00], 0x02));
        assert_eq!(Command::FocusAuto.encode(), reference([0xE1, 0x00], 0x00));
        assert_eq!(Command::FocusWide.encode(), reference([0xEA, 0x00], 0x00));
        assert_eq!(Command::FocusNear.encode(), reference([0xEA, 0x00], 0x01));
        assert_eq!(Command::FocusStop.encode(), reference([0xEA, 0x00], 0x02));
        assert_eq!(
            Command::BrightnessLight.encode(),
            reference([0xE2, 0x00], 0x02)
        );
        assert_eq!(
            Command::BrightnessDark.encode(),
            reference([0xE2, 0x00], 0x03)
        );
        assert_eq!(
            Command::BrightnessStop.encode(),
            reference([0xE2, 0x00], 0x04)
        );
        assert_eq!(
            Command::BrightnessAuto.encode(),
            reference([0xE2, 0x00], 0x05)
        );
    }

    #[test]
    fn test_picture_carries_compression() {
        let packet = Command::Picture { compression: 85 }.encode();
        assert_eq!(packet[PARAM_OFFSET], 85);
        // Only the parameter byte differs between compression settings
        let other = Command::Picture { compression: 10 }.encode();
        for (i, (a, b)) in packet.iter().zip(other.iter()).enumerate() {
            if i != PARAM_OFFSET {
                assert_eq!(a, b, "byte {} differs", i);
            }
        }
    }

    #[test]
    fn test_segment_size_decoding() {
        let mut packet = [0u8; DATA_PACKET_LEN];
        packet[SIZE_OFFSET] = 0xF8;
        packet[SIZE_OFFSET + 1] = 0xFE;
        assert_eq!(segment_size(&packet), SEGMENT_SENTINEL);

        packet[SIZE_OFFSET] = 0x30;
        packet[SIZE_OFFSET + 1] = 0x75;
        assert_eq!(segment_size(&packet), 30000);

        packet[SIZE_OFFSET] = 0x00;
        packet[SIZE_OFFSET + 1] = 0x00;
        assert_eq!(segment_size(&packet), 0);
    }
}
