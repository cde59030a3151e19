//! Frame encoding and checksum discipline for the LPF2 protocol.
//!
//! Frame format:
//! - HEADER (1 byte): kind (bits 6–7), size code (bits 3–5), cmd/mode (bits 0–2)
//! - PAYLOAD (2^size_code bytes)
//! - CHECKSUM (1 byte): 0xFF XOR HEADER XOR all PAYLOAD bytes
//!
//! A frame whose checksum does not match is dropped whole. Nothing in the
//! protocol acknowledges or retransmits individual frames; the hub simply
//! polls again.

use heapless::Vec;

/// Largest payload this device ever sends: a 32-byte body plus the INFO type byte
pub const MAX_PAYLOAD_SIZE: usize = 33;

/// Maximum complete frame size (HEADER + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = 1 + MAX_PAYLOAD_SIZE + 1;

/// Largest length the 3-bit size code can express
pub const MAX_DECLARED_LEN: usize = 128;

const KIND_MASK: u8 = 0b1100_0000;
const SIZE_MASK: u8 = 0b0011_1000;
const LOW_MASK: u8 = 0b0000_0111;
const SIZE_SHIFT: u8 = 3;

/// Errors that can occur during frame construction or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Length is not expressible in the header size field (not a power of two)
    InvalidLength,
    /// A mode name does not fit its field
    NameTooLong,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Message category encoded in the two high header bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MessageKind {
    /// Single-byte system messages (SYNC, NACK, ACK)
    System = 0x00,
    /// Commands (TYPE, MODES, SPEED, SELECT, ...)
    Command = 0x40,
    /// Mode capability information
    Info = 0x80,
    /// Mode data
    Data = 0xC0,
}

impl MessageKind {
    /// Extract the kind from a header byte
    pub const fn of(header: u8) -> Self {
        match header & KIND_MASK {
            0x00 => MessageKind::System,
            0x40 => MessageKind::Command,
            0x80 => MessageKind::Info,
            _ => MessageKind::Data,
        }
    }
}

/// Compute the protocol checksum over `bytes`
///
/// `0xFF` folded with XOR over every byte, header included.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0xFF, |acc, &b| acc ^ b)
}

/// Check a received frame: the last byte must be the checksum of the rest
pub fn verify_frame(bytes: &[u8]) -> bool {
    match bytes.split_last() {
        Some((&received, body)) if !body.is_empty() => checksum(body) == received,
        _ => false,
    }
}

/// Build `header ++ payload ++ checksum` as a byte vector
pub fn build_frame(header: u8, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    Frame::new(header, payload)?.encode_to_vec()
}

/// Size code for an exact power-of-two length up to 128
pub const fn size_code(len: usize) -> Option<u8> {
    if len == 0 || len > MAX_DECLARED_LEN || !len.is_power_of_two() {
        return None;
    }
    Some(len.trailing_zeros() as u8)
}

/// Length a size code declares
pub const fn payload_len(code: u8) -> usize {
    1 << (code & LOW_MASK)
}

/// Smallest expressible length that holds `len` bytes (at least one)
pub const fn padded_len(len: usize) -> usize {
    if len <= 1 {
        1
    } else {
        len.next_power_of_two()
    }
}

/// Pack kind, payload length and command/mode bits into a header byte
pub fn pack_header(kind: MessageKind, len: usize, low: u8) -> Result<u8, FrameError> {
    let code = size_code(len).ok_or(FrameError::InvalidLength)?;
    Ok(kind as u8 | (code << SIZE_SHIFT) | (low & LOW_MASK))
}

/// Split a packed size/mode byte into (declared length, low 3 bits)
///
/// Used both for full headers and for the size/mode byte that follows the
/// WRITE-DATA markers; the kind bits are ignored.
pub const fn unpack_size_mode(byte: u8) -> (usize, u8) {
    (payload_len((byte & SIZE_MASK) >> SIZE_SHIFT), byte & LOW_MASK)
}

/// A constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Header byte
    pub header: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame with the given header and payload
    pub fn new(header: u8, payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            header,
            payload: payload_vec,
        })
    }

    /// Create a frame whose header is packed from kind, length and low bits
    ///
    /// The payload is zero-padded up to the next power of two first.
    pub fn packed(kind: MessageKind, low: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let len = padded_len(payload.len());
        if len > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }
        let mut frame = Self::new(pack_header(kind, len, low)?, payload)?;
        frame
            .payload
            .resize(len, 0)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(frame)
    }

    /// Checksum byte this frame will carry
    pub fn checksum(&self) -> u8 {
        checksum(&self.payload) ^ self.header
    }

    /// Total encoded length
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 2
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.header;
        buffer[1..1 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[frame_len - 1] = self.checksum();

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}
