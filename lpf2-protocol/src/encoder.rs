//! Periodic value frame (device → hub)
//!
//! Sent once per tick after inbound messages were drained. The write's byte
//! count doubles as the link's liveness signal.

use heapless::Vec;

use crate::frame::FrameError;
use crate::messages::{data_frame, ext_mode_frame};

/// Largest value frame: EXT_MODE (3 bytes) + two-byte DATA (4 bytes)
pub const VALUE_FRAME_MAX: usize = 8;

/// Encoded value frame ready for the UART
pub type ValueFrame = Vec<u8, VALUE_FRAME_MAX>;

/// Shape of the value frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValueFormat {
    /// `C0 value chk`: one byte, always mode 0
    Byte,
    /// `46 ext chk C8|mode lo hi chk`: EXT_MODE prefix, then a
    /// little-endian 16-bit value for the current mode
    Word,
}

/// Encode `value` for `mode` in the given format
///
/// Values are truncated to the frame width; the hub interprets them with
/// the data format it was advertised.
pub fn encode_value(format: ValueFormat, mode: u8, value: i32) -> Result<ValueFrame, FrameError> {
    let mut out = ValueFrame::new();
    match format {
        ValueFormat::Byte => {
            let frame = data_frame(0, &[value as u8])?;
            append(&mut out, &frame.encode_to_vec()?)?;
        }
        ValueFormat::Word => {
            let ext = ext_mode_frame(mode)?;
            let data = data_frame(mode, &(value as u16).to_le_bytes())?;
            append(&mut out, &ext.encode_to_vec()?)?;
            append(&mut out, &data.encode_to_vec()?)?;
        }
    }
    Ok(out)
}

fn append(out: &mut ValueFrame, bytes: &[u8]) -> Result<(), FrameError> {
    out.extend_from_slice(bytes)
        .map_err(|_| FrameError::BufferTooSmall)
}
