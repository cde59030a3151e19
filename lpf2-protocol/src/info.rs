//! Mode capability advertisement
//!
//! During the handshake the device describes every mode it supports with
//! seven INFO frames, always in the same order:
//!
//! ```text
//! NAME → RAW → PCT → SI → SYMBOL → MAPPING → FORMAT
//! ```
//!
//! INFO headers carry only the low three mode bits; modes 8–15 set
//! [`INFO_MODE_PLUS_8`] in the info type byte instead.

use crate::frame::{padded_len, pack_header, Frame, FrameError, MessageKind};

/// Info type flag for modes 8–15
pub const INFO_MODE_PLUS_8: u8 = 0x20;

/// Number of frames advertised per mode
pub const FRAMES_PER_MODE: usize = 7;

/// Width of the name field when capability flags follow it
const FLAGGED_NAME_LEN: usize = 6;

/// Kind of information an INFO frame carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum InfoType {
    Name = 0x00,
    Raw = 0x01,
    Pct = 0x02,
    Si = 0x03,
    Symbol = 0x04,
    Mapping = 0x05,
    /// Device identification block (hardware/serial information)
    Identity = 0x08,
    Format = 0x80,
}

/// Advertisement order for a single mode
pub const ADVERTISEMENT_ORDER: [InfoType; FRAMES_PER_MODE] = [
    InfoType::Name,
    InfoType::Raw,
    InfoType::Pct,
    InfoType::Si,
    InfoType::Symbol,
    InfoType::Mapping,
    InfoType::Format,
];

/// Numeric type of each value in a mode's data set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DataFormat {
    Int8 = 0,
    Int16 = 1,
    Int32 = 2,
    Float = 3,
}

/// Inclusive value range, sent as two little-endian f32
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn to_le_bytes(self) -> [u8; 8] {
        let min = self.min.to_le_bytes();
        let max = self.max.to_le_bytes();
        [min[0], min[1], min[2], min[3], max[0], max[1], max[2], max[3]]
    }
}

/// Input/output capability bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mapping {
    pub input: u8,
    pub output: u8,
}

/// Data-set layout reported in the FORMAT frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValueLayout {
    /// Number of values per sample
    pub data_sets: u8,
    pub format: DataFormat,
    /// Digits shown by the hub UI
    pub figures: u8,
    pub decimals: u8,
}

/// Everything a hub learns about one mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeInfo {
    pub name: &'static str,
    /// EV3-style capability flags appended after a fixed six-byte name
    pub flags: Option<[u8; 6]>,
    pub raw: Range,
    pub pct: Range,
    pub si: Range,
    pub symbol: &'static str,
    pub mapping: Mapping,
    pub layout: ValueLayout,
}

impl ModeInfo {
    /// Build this mode's seven INFO frames in [`ADVERTISEMENT_ORDER`]
    pub fn advertisement(&self, mode: u8) -> Result<[Frame; FRAMES_PER_MODE], FrameError> {
        let symbol = self.symbol.as_bytes();
        let layout = &self.layout;

        Ok([
            self.name_frame(mode)?,
            info_frame(mode, InfoType::Raw as u8, &self.raw.to_le_bytes())?,
            info_frame(mode, InfoType::Pct as u8, &self.pct.to_le_bytes())?,
            info_frame(mode, InfoType::Si as u8, &self.si.to_le_bytes())?,
            info_frame(mode, InfoType::Symbol as u8, symbol)?,
            info_frame(
                mode,
                InfoType::Mapping as u8,
                &[self.mapping.input, self.mapping.output],
            )?,
            info_frame(
                mode,
                InfoType::Format as u8,
                &[
                    layout.data_sets,
                    layout.format as u8,
                    layout.figures,
                    layout.decimals,
                ],
            )?,
        ])
    }

    fn name_frame(&self, mode: u8) -> Result<Frame, FrameError> {
        let name = self.name.as_bytes();
        match self.flags {
            None => info_frame(mode, InfoType::Name as u8, name),
            Some(flags) => {
                // Name is NUL-terminated inside its fixed field
                if name.len() >= FLAGGED_NAME_LEN {
                    return Err(FrameError::NameTooLong);
                }
                let mut body = [0u8; FLAGGED_NAME_LEN + 6];
                body[..name.len()].copy_from_slice(name);
                body[FLAGGED_NAME_LEN..].copy_from_slice(&flags);
                info_frame(mode, InfoType::Name as u8, &body)
            }
        }
    }
}

/// Build a single INFO frame
///
/// `body` is zero-padded to a power of two; the header size field counts
/// the body only, not the info type byte that precedes it.
pub fn info_frame(mode: u8, info_type: u8, body: &[u8]) -> Result<Frame, FrameError> {
    let len = padded_len(body.len());
    let header = pack_header(MessageKind::Info, len, mode)?;

    let mut frame = Frame::new(header, &[info_type | bank_flag(mode)])?;
    frame
        .payload
        .extend_from_slice(body)
        .map_err(|_| FrameError::PayloadTooLarge)?;
    frame
        .payload
        .resize(len + 1, 0)
        .map_err(|_| FrameError::PayloadTooLarge)?;
    Ok(frame)
}

const fn bank_flag(mode: u8) -> u8 {
    if mode >= 8 {
        INFO_MODE_PLUS_8
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PCT: Range = Range::new(0.0, 100.0);

    fn float_array() -> ModeInfo {
        ModeInfo {
            name: "float_array",
            flags: None,
            raw: PCT,
            pct: PCT,
            si: PCT,
            symbol: "",
            mapping: Mapping {
                input: 0x10,
                output: 0x00,
            },
            layout: ValueLayout {
                data_sets: 4,
                format: DataFormat::Float,
                figures: 2,
                decimals: 1,
            },
        }
    }

    fn encoded(frame: &Frame) -> heapless::Vec<u8, { crate::frame::MAX_FRAME_SIZE }> {
        frame.encode_to_vec().unwrap()
    }

    #[test]
    fn test_unflagged_mode_advertisement() {
        let frames = float_array().advertisement(7).unwrap();

        assert_eq!(
            &encoded(&frames[0])[..],
            b"\xa7\x00float_array\x00\x00\x00\x00\x00\x0e"
        );
        assert_eq!(
            &encoded(&frames[1])[..],
            &[0x9F, 0x01, 0, 0, 0, 0, 0, 0, 0xC8, 0x42, 0xEB]
        );
        assert_eq!(&encoded(&frames[4])[..], &[0x87, 0x04, 0x00, 0x7C]);
        assert_eq!(&encoded(&frames[5])[..], &[0x8F, 0x05, 0x10, 0x00, 0x65]);
        assert_eq!(
            &encoded(&frames[6])[..],
            &[0x97, 0x80, 0x04, 0x03, 0x02, 0x01, 0xEC]
        );
    }

    #[test]
    fn test_flagged_name_for_extended_mode() {
        let calib = ModeInfo {
            name: "CALIB",
            flags: Some([0x40, 0x40, 0x00, 0x00, 0x04, 0x84]),
            raw: Range::new(0.0, 255.0),
            ..float_array()
        };
        let frames = calib.advertisement(8).unwrap();

        assert_eq!(
            &encoded(&frames[0])[..],
            b"\xa0\x20CALIB\x00\x40\x40\x00\x00\x04\x84\x00\x00\x00\x00\xba"
        );
        assert_eq!(
            &encoded(&frames[1])[..],
            &[0x98, 0x21, 0, 0, 0, 0, 0, 0, 0x7F, 0x43, 0x7A]
        );
    }

    #[test]
    fn test_short_symbol_is_padded_to_power_of_two() {
        let frame = info_frame(0, InfoType::Symbol as u8, b"PCT").unwrap();
        assert_eq!(&encoded(&frame)[..], b"\x90\x04PCT\x00\x2c");
    }

    #[test]
    fn test_flagged_name_too_long() {
        let mode = ModeInfo {
            name: "TOOLONG",
            flags: Some([0; 6]),
            ..float_array()
        };
        assert_eq!(mode.advertisement(0).err(), Some(FrameError::NameTooLong));
    }

    #[test]
    fn test_order_is_fixed() {
        assert_eq!(ADVERTISEMENT_ORDER[0], InfoType::Name);
        assert_eq!(ADVERTISEMENT_ORDER[6], InfoType::Format);
    }
}
