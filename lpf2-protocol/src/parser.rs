//! Parser for hub → device messages
//!
//! The hub's messages have no start marker: the leading byte alone decides
//! how many bytes follow. The parser is fed one byte at a time and keeps its
//! position between calls, so a message split across two reads resumes
//! where it stopped. It never reads past a message's declared end.
//!
//! Recognized messages:
//! - `0x00` filler and `0x02` keep-alive (single bytes)
//! - `0x43 mode chk` SELECT
//! - `0x46 marker chk size_mode payload.. chk` WRITE-DATA
//! - `0x4C data.. chk` combo write (1 or 2 data bytes depending on dialect)
//!
//! Anything else costs exactly one byte.

use heapless::Vec;

use crate::frame::{checksum, unpack_size_mode};
use crate::messages::{
    EXT_MODE_HIGH, EXT_MODE_LOW, HUB_COMBO, HUB_EXT_MODE, HUB_SELECT, SYS_NACK, SYS_SYNC,
};

/// Capacity of the diagnostic text buffer
pub const TEXT_BUFFER_LEN: usize = 13;

/// Largest combo payload any dialect uses
pub const MAX_COMBO_LEN: usize = 2;

/// Fixed-size text received through WRITE-DATA, space padded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextBuffer {
    bytes: [u8; TEXT_BUFFER_LEN],
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::blank()
    }
}

impl TextBuffer {
    /// All spaces
    pub const fn blank() -> Self {
        Self {
            bytes: [b' '; TEXT_BUFFER_LEN],
        }
    }

    /// Reset to spaces, then copy in as much of `data` as fits
    pub fn fill_from(&mut self, data: &[u8]) {
        self.bytes = [b' '; TEXT_BUFFER_LEN];
        let len = data.len().min(TEXT_BUFFER_LEN);
        self.bytes[..len].copy_from_slice(&data[..len]);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The text as UTF-8, if it is
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }
}

/// Per-profile differences in what the hub sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InboundFormat {
    /// Accept the `0x01` EXT_MODE marker addressing modes 8–15
    pub extended_modes: bool,
    /// Data bytes in a combo write
    pub combo_len: usize,
}

/// A fully received and checksum-validated hub message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HubMessage {
    /// `0x00` idle filler
    Filler,
    /// `0x02` keep-alive
    Keepalive,
    /// Hub selected a mode
    Select { mode: u8 },
    /// Hub wrote data to a mode
    WriteData {
        mode: u8,
        /// Declared payload length (may exceed what `text` holds)
        len: usize,
        text: TextBuffer,
    },
    /// Combo write; validated but carries no behavior yet
    Combo { data: Vec<u8, MAX_COMBO_LEN> },
}

/// Reasons a byte sequence was dropped
///
/// None of these are fatal; the parser is already positioned at the next
/// message when it returns one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Checksum mismatch on a message with the given leading byte
    InvalidChecksum(u8),
    /// EXT_MODE marker pair not valid for this dialect
    InvalidMarker,
    /// Leading byte of no known message
    UnknownByte(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for a leading byte
    Idle,
    /// Got SELECT, waiting for the mode byte
    SelectMode,
    /// Waiting for the SELECT checksum
    SelectChecksum { mode: u8 },
    /// Got EXT_MODE, waiting for the marker
    Marker,
    /// Waiting for the marker's checksum byte
    MarkerChecksum { marker: u8 },
    /// Waiting for the packed size/mode byte
    SizeMode { bank: u8 },
    /// Reading WRITE-DATA payload bytes
    Payload { mode: u8, len: usize, remaining: usize },
    /// Waiting for the WRITE-DATA checksum
    PayloadChecksum { mode: u8, len: usize },
    /// Reading combo data bytes
    Combo,
    /// Waiting for the combo checksum
    ComboChecksum,
}

/// State machine for parsing hub messages
#[derive(Debug, Clone)]
pub struct MessageParser {
    format: InboundFormat,
    state: ParseState,
    /// Running checksum over every byte of the current message
    acc: u8,
    text: Vec<u8, TEXT_BUFFER_LEN>,
    combo: Vec<u8, MAX_COMBO_LEN>,
}

impl MessageParser {
    /// Create a new parser for the given dialect
    pub fn new(format: InboundFormat) -> Self {
        Self {
            format,
            state: ParseState::Idle,
            acc: 0xFF,
            text: Vec::new(),
            combo: Vec::new(),
        }
    }

    /// Drop any partially received message
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.acc = 0xFF;
        self.text.clear();
        self.combo.clear();
    }

    /// True when no message is partially received
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::Idle
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(msg))` when a message completes, `Ok(None)` when
    /// more bytes are needed, or `Err` when the message was dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<HubMessage>, ParseError> {
        self.acc ^= byte;

        match self.state {
            ParseState::Idle => self.start(byte),
            ParseState::SelectMode => {
                self.state = ParseState::SelectChecksum { mode: byte };
                Ok(None)
            }
            ParseState::SelectChecksum { mode } => {
                self.finish(HUB_SELECT, || HubMessage::Select { mode })
            }
            ParseState::Marker => {
                self.state = ParseState::MarkerChecksum { marker: byte };
                Ok(None)
            }
            ParseState::MarkerChecksum { marker } => {
                // The marker pair is itself a complete EXT_MODE frame
                let pair_ok = checksum(&[HUB_EXT_MODE, marker]) == byte;
                let bank = match marker {
                    EXT_MODE_LOW => Some(0),
                    EXT_MODE_HIGH if self.format.extended_modes => Some(8),
                    _ => None,
                };
                match bank {
                    Some(bank) if pair_ok => {
                        self.state = ParseState::SizeMode { bank };
                        Ok(None)
                    }
                    _ => {
                        self.reset();
                        Err(ParseError::InvalidMarker)
                    }
                }
            }
            ParseState::SizeMode { bank } => {
                let (len, low) = unpack_size_mode(byte);
                self.text.clear();
                self.state = ParseState::Payload {
                    mode: bank + low,
                    len,
                    remaining: len,
                };
                Ok(None)
            }
            ParseState::Payload {
                mode,
                len,
                remaining,
            } => {
                // Bytes past the buffer still count toward the checksum
                let _ = self.text.push(byte);
                self.state = if remaining > 1 {
                    ParseState::Payload {
                        mode,
                        len,
                        remaining: remaining - 1,
                    }
                } else {
                    ParseState::PayloadChecksum { mode, len }
                };
                Ok(None)
            }
            ParseState::PayloadChecksum { mode, len } => {
                let mut text = TextBuffer::blank();
                text.fill_from(&self.text);
                self.finish(HUB_EXT_MODE, || HubMessage::WriteData { mode, len, text })
            }
            ParseState::Combo => {
                let _ = self.combo.push(byte);
                if self.combo.len() >= self.format.combo_len {
                    self.state = ParseState::ComboChecksum;
                }
                Ok(None)
            }
            ParseState::ComboChecksum => {
                let data = self.combo.clone();
                self.finish(HUB_COMBO, || HubMessage::Combo { data })
            }
        }
    }

    /// Feed multiple bytes, collecting every completed message
    ///
    /// Dropped messages are skipped; use [`feed`](Self::feed) to observe them.
    pub fn feed_bytes<const N: usize>(&mut self, bytes: &[u8]) -> Vec<HubMessage, N> {
        let mut messages = Vec::new();
        for &byte in bytes {
            if let Ok(Some(message)) = self.feed(byte) {
                if messages.push(message).is_err() {
                    break;
                }
            }
        }
        messages
    }

    fn start(&mut self, byte: u8) -> Result<Option<HubMessage>, ParseError> {
        match byte {
            SYS_SYNC => self.single(HubMessage::Filler),
            SYS_NACK => self.single(HubMessage::Keepalive),
            HUB_SELECT => {
                self.state = ParseState::SelectMode;
                Ok(None)
            }
            HUB_EXT_MODE => {
                self.state = ParseState::Marker;
                Ok(None)
            }
            HUB_COMBO => {
                self.combo.clear();
                self.state = if self.format.combo_len == 0 {
                    ParseState::ComboChecksum
                } else {
                    ParseState::Combo
                };
                Ok(None)
            }
            other => {
                self.reset();
                Err(ParseError::UnknownByte(other))
            }
        }
    }

    fn single(&mut self, message: HubMessage) -> Result<Option<HubMessage>, ParseError> {
        self.reset();
        Ok(Some(message))
    }

    /// Close the current message: after XOR-ing in the received checksum
    /// byte, a valid message leaves the accumulator at zero.
    fn finish(
        &mut self,
        header: u8,
        message: impl FnOnce() -> HubMessage,
    ) -> Result<Option<HubMessage>, ParseError> {
        let valid = self.acc == 0;
        let result = if valid {
            Ok(Some(message()))
        } else {
            Err(ParseError::InvalidChecksum(header))
        };
        self.reset();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::build_frame;
    use crate::messages::select_frame;

    const GENERIC: InboundFormat = InboundFormat {
        extended_modes: false,
        combo_len: 1,
    };

    const EV3: InboundFormat = InboundFormat {
        extended_modes: true,
        combo_len: 2,
    };

    /// WRITE-DATA as the hub sends it: one checksum over every byte
    fn write_data(marker: u8, size_mode: u8, payload: &[u8]) -> std::vec::Vec<u8> {
        let mut bytes = std::vec![HUB_EXT_MODE, marker, checksum(&[HUB_EXT_MODE, marker]), size_mode];
        bytes.extend_from_slice(payload);
        bytes.push(checksum(&bytes));
        bytes
    }

    fn feed_all(parser: &mut MessageParser, bytes: &[u8]) -> std::vec::Vec<Result<HubMessage, ParseError>> {
        bytes
            .iter()
            .filter_map(|&b| parser.feed(b).transpose())
            .collect()
    }

    #[test]
    fn test_select_valid() {
        let mut parser = MessageParser::new(GENERIC);
        let bytes = select_frame(3).unwrap().encode_to_vec().unwrap();
        assert_eq!(
            feed_all(&mut parser, &bytes),
            [Ok(HubMessage::Select { mode: 3 })]
        );
        assert!(parser.is_idle());
    }

    #[test]
    fn test_select_bad_checksum() {
        let mut parser = MessageParser::new(GENERIC);
        assert_eq!(
            feed_all(&mut parser, &[0x43, 0x03, 0x00]),
            [Err(ParseError::InvalidChecksum(HUB_SELECT))]
        );
        assert!(parser.is_idle());
    }

    #[test]
    fn test_filler_and_keepalive() {
        let mut parser = MessageParser::new(GENERIC);
        assert_eq!(
            feed_all(&mut parser, &[0x00, 0x02]),
            [Ok(HubMessage::Filler), Ok(HubMessage::Keepalive)]
        );
    }

    #[test]
    fn test_write_data_two_bytes_blanks_tail() {
        let mut parser = MessageParser::new(GENERIC);
        let bytes = write_data(0x00, 0b0000_1010, b"hi");

        let results = feed_all(&mut parser, &bytes);
        let Ok(HubMessage::WriteData { mode, len, text }) = &results[0] else {
            panic!("expected WriteData, got {:?}", results);
        };
        assert_eq!(*mode, 2);
        assert_eq!(*len, 2);
        assert_eq!(&text.as_bytes()[..2], b"hi");
        assert!(text.as_bytes()[2..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_write_data_high_bank_on_ev3() {
        let mut parser = MessageParser::new(EV3);
        let bytes = write_data(0x01, 0b0000_0101, b"x");

        let results = feed_all(&mut parser, &bytes);
        assert!(matches!(
            results[..],
            [Ok(HubMessage::WriteData { mode: 13, len: 1, .. })]
        ));
    }

    #[test]
    fn test_write_data_high_bank_rejected_on_generic() {
        let mut parser = MessageParser::new(GENERIC);
        // Marker pair rejected; the size/mode byte 0x3F is then unknown
        let results = feed_all(&mut parser, &[0x46, 0x01, 0xB8, 0x3F]);
        assert_eq!(
            results,
            [
                Err(ParseError::InvalidMarker),
                Err(ParseError::UnknownByte(0x3F))
            ]
        );
    }

    #[test]
    fn test_write_data_bad_checksum_dropped() {
        let mut parser = MessageParser::new(GENERIC);
        let mut bytes = write_data(0x00, 0b0001_0000, b"abcd");
        *bytes.last_mut().unwrap() ^= 0xFF;
        assert_eq!(
            feed_all(&mut parser, &bytes),
            [Err(ParseError::InvalidChecksum(HUB_EXT_MODE))]
        );
    }

    #[test]
    fn test_write_data_longer_than_buffer() {
        let mut parser = MessageParser::new(GENERIC);
        let payload = [b'z'; 16];
        let bytes = write_data(0x00, 0b0010_0000, &payload);

        let results = feed_all(&mut parser, &bytes);
        let Ok(HubMessage::WriteData { len, text, .. }) = &results[0] else {
            panic!("expected WriteData, got {:?}", results);
        };
        assert_eq!(*len, 16);
        assert_eq!(text.as_bytes(), &[b'z'; TEXT_BUFFER_LEN]);
    }

    #[test]
    fn test_combo_lengths_per_dialect() {
        let mut generic = MessageParser::new(GENERIC);
        let one = build_frame(HUB_COMBO, &[0x20]).unwrap();
        assert!(matches!(
            feed_all(&mut generic, &one)[..],
            [Ok(HubMessage::Combo { ref data })] if data[..] == [0x20]
        ));

        let mut ev3 = MessageParser::new(EV3);
        let two = build_frame(HUB_COMBO, &[0x20, 0x00]).unwrap();
        assert_eq!(&two[..], &[0x4C, 0x20, 0x00, 0x93]);
        assert!(matches!(
            feed_all(&mut ev3, &two)[..],
            [Ok(HubMessage::Combo { ref data })] if data[..] == [0x20, 0x00]
        ));
    }

    #[test]
    fn test_unknown_bytes_consume_one_each() {
        let mut parser = MessageParser::new(GENERIC);
        let mut bytes = std::vec![0x99, 0x7E];
        bytes.extend_from_slice(&select_frame(1).unwrap().encode_to_vec().unwrap());
        assert_eq!(
            feed_all(&mut parser, &bytes),
            [
                Err(ParseError::UnknownByte(0x99)),
                Err(ParseError::UnknownByte(0x7E)),
                Ok(HubMessage::Select { mode: 1 }),
            ]
        );
    }

    #[test]
    fn test_message_split_across_feeds_resumes() {
        let mut parser = MessageParser::new(EV3);
        let bytes = write_data(0x00, 0b0000_1000, b"ok");
        let (first, second) = bytes.split_at(3);

        assert!(feed_all(&mut parser, first).is_empty());
        assert!(!parser.is_idle());
        assert!(matches!(
            feed_all(&mut parser, second)[..],
            [Ok(HubMessage::WriteData { mode: 0, len: 2, .. })]
        ));
    }

    #[test]
    fn test_back_to_back_messages_keep_boundaries() {
        let mut parser = MessageParser::new(EV3);
        let mut bytes = write_data(0x00, 0b0000_1001, b"ab");
        bytes.extend_from_slice(&select_frame(0).unwrap().encode_to_vec().unwrap());
        bytes.push(0x02);

        let messages: Vec<HubMessage, 4> = parser.feed_bytes(&bytes);
        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], HubMessage::WriteData { mode: 1, .. }));
        assert_eq!(messages[1], HubMessage::Select { mode: 0 });
        assert_eq!(messages[2], HubMessage::Keepalive);
    }

    #[test]
    fn test_reset_discards_partial_message() {
        let mut parser = MessageParser::new(GENERIC);
        assert_eq!(parser.feed(HUB_SELECT), Ok(None));
        parser.reset();
        assert_eq!(parser.feed(SYS_NACK), Ok(Some(HubMessage::Keepalive)));
    }

    #[test]
    fn test_text_buffer_as_str() {
        let mut text = TextBuffer::blank();
        text.fill_from(b"hello");
        assert_eq!(text.as_str(), Some("hello        "));
    }
}
