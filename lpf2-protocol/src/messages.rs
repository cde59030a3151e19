//! Command and system messages
//!
//! Message bytes are divided into two directions:
//! - Device → Hub: the handshake commands (TYPE, MODES, SPEED, VERSION)
//! - Hub → Device: SELECT, WRITE-DATA (EXT_MODE + DATA) and combo writes

use crate::frame::{Frame, FrameError, MessageKind};

// System messages (no payload, no checksum)
pub const SYS_SYNC: u8 = 0x00;
pub const SYS_NACK: u8 = 0x02;
pub const SYS_ACK: u8 = 0x04;

// Command numbers (header bits 0-2 of a Command message)
pub const CMD_TYPE: u8 = 0x00;
pub const CMD_MODES: u8 = 0x01;
pub const CMD_SPEED: u8 = 0x02;
pub const CMD_SELECT: u8 = 0x03;
pub const CMD_WRITE: u8 = 0x04;
pub const CMD_EXT_MODE: u8 = 0x06;
pub const CMD_VERSION: u8 = 0x07;

// Hub → Device leading bytes as they appear on the wire
/// SELECT with one mode byte
pub const HUB_SELECT: u8 = MessageKind::Command as u8 | CMD_SELECT;
/// EXT_MODE with one marker byte; prefixes every WRITE-DATA message
pub const HUB_EXT_MODE: u8 = MessageKind::Command as u8 | CMD_EXT_MODE;
/// Combo/WRITE reply with a two-byte payload
pub const HUB_COMBO: u8 = MessageKind::Command as u8 | (1 << 3) | CMD_WRITE;

/// Marker byte following EXT_MODE for modes 0–7
pub const EXT_MODE_LOW: u8 = 0x00;
/// Marker byte following EXT_MODE for modes 8–15
pub const EXT_MODE_HIGH: u8 = 0x01;

/// TYPE frame announcing the sensor type id
pub fn type_frame(type_id: u8) -> Result<Frame, FrameError> {
    Frame::packed(MessageKind::Command, CMD_TYPE, &[type_id])
}

/// MODES frame
///
/// `counts` holds the zero-based mode/view counts in wire order: two bytes
/// for Powered Up only devices, four when an EV3 view is advertised too.
pub fn modes_frame(counts: &[u8]) -> Result<Frame, FrameError> {
    Frame::packed(MessageKind::Command, CMD_MODES, counts)
}

/// SPEED frame requesting the given baud rate
pub fn speed_frame(baudrate: u32) -> Result<Frame, FrameError> {
    Frame::packed(MessageKind::Command, CMD_SPEED, &baudrate.to_le_bytes())
}

/// VERSION frame with firmware and hardware versions
pub fn version_frame(firmware: u32, hardware: u32) -> Result<Frame, FrameError> {
    let fw = firmware.to_le_bytes();
    let hw = hardware.to_le_bytes();
    Frame::packed(
        MessageKind::Command,
        CMD_VERSION,
        &[fw[0], fw[1], fw[2], fw[3], hw[0], hw[1], hw[2], hw[3]],
    )
}

/// EXT_MODE frame selecting the mode bank for the DATA frame that follows
pub fn ext_mode_frame(mode: u8) -> Result<Frame, FrameError> {
    Frame::packed(MessageKind::Command, CMD_EXT_MODE, &[ext_mode_marker(mode)])
}

/// Marker byte for the bank `mode` lives in
pub const fn ext_mode_marker(mode: u8) -> u8 {
    if mode >= 8 {
        EXT_MODE_HIGH
    } else {
        EXT_MODE_LOW
    }
}

/// DATA frame carrying `payload` for `mode` (low three bits)
pub fn data_frame(mode: u8, payload: &[u8]) -> Result<Frame, FrameError> {
    Frame::packed(MessageKind::Data, mode, payload)
}

/// SELECT frame as a hub sends it (for testing or simulation)
pub fn select_frame(mode: u8) -> Result<Frame, FrameError> {
    Frame::new(HUB_SELECT, &[mode])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hub_leading_bytes() {
        assert_eq!(HUB_SELECT, 0x43);
        assert_eq!(HUB_EXT_MODE, 0x46);
        assert_eq!(HUB_COMBO, 0x4C);
    }

    #[test]
    fn test_type_frame() {
        let bytes = type_frame(0x3E).unwrap().encode_to_vec().unwrap();
        assert_eq!(&bytes[..], &[0x40, 0x3E, 0x81]);
    }

    #[test]
    fn test_modes_frame_two_and_four_counts() {
        let short = modes_frame(&[7, 7]).unwrap().encode_to_vec().unwrap();
        assert_eq!(&short[..], &[0x49, 0x07, 0x07, 0xB6]);

        let long = modes_frame(&[7, 6, 8, 0]).unwrap().encode_to_vec().unwrap();
        assert_eq!(&long[..], &[0x51, 0x07, 0x06, 0x08, 0x00, 0xA7]);
    }

    #[test]
    fn test_speed_frame_115200() {
        let bytes = speed_frame(115200).unwrap().encode_to_vec().unwrap();
        assert_eq!(&bytes[..], &[0x52, 0x00, 0xC2, 0x01, 0x00, 0x6E]);
    }

    #[test]
    fn test_version_frame() {
        let bytes = version_frame(0x1000_0000, 0x1000_0000)
            .unwrap()
            .encode_to_vec()
            .unwrap();
        assert_eq!(
            &bytes[..],
            &[0x5F, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x10, 0xA0]
        );
    }

    #[test]
    fn test_ext_mode_markers_match_wire_checksums() {
        let low = ext_mode_frame(3).unwrap().encode_to_vec().unwrap();
        assert_eq!(&low[..], &[0x46, 0x00, 0xB9]);

        let high = ext_mode_frame(9).unwrap().encode_to_vec().unwrap();
        assert_eq!(&high[..], &[0x46, 0x01, 0xB8]);
    }

    #[test]
    fn test_select_frame() {
        let bytes = select_frame(2).unwrap().encode_to_vec().unwrap();
        assert_eq!(&bytes[..], &[0x43, 0x02, 0xBE]);
    }
}
