//! LPF2 UART Sensor Protocol
//!
//! This crate implements the device side of the wire protocol LEGO hubs
//! (Powered Up, Spike Prime, and EV3 through a compatible profile) speak to
//! passive sensors. It is pure data transformation: nothing here touches a
//! UART or a timer.
//!
//! # Protocol Overview
//!
//! Apart from three single-byte system messages (SYNC, NACK, ACK), every
//! message is a checksummed frame:
//! ```text
//! ┌────────┬─────────────┬──────────┐
//! │ HEADER │ PAYLOAD     │ CHECKSUM │
//! │ 1B     │ 1–32B (2^n) │ 1B       │
//! └────────┴─────────────┴──────────┘
//! ```
//!
//! The header packs the message kind (bits 6–7), the payload size code
//! (bits 3–5, length `2^code`) and a command or mode number (bits 0–2).
//! The checksum is `0xFF` XOR every preceding byte of the frame.
//!
//! - [`frame`] - checksum, frame construction and header bit packing
//! - [`messages`] - command/system bytes and device command frames
//! - [`info`] - the per-mode capability advertisement
//! - [`parser`] - byte-driven parser for hub → device messages
//! - [`encoder`] - the periodic device → hub value frame

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod encoder;
pub mod frame;
pub mod info;
pub mod messages;
pub mod parser;

pub use encoder::{encode_value, ValueFormat, ValueFrame};
pub use frame::{
    build_frame, checksum, verify_frame, Frame, FrameError, MessageKind, MAX_FRAME_SIZE,
    MAX_PAYLOAD_SIZE,
};
pub use info::{DataFormat, InfoType, Mapping, ModeInfo, Range, ValueLayout};
pub use parser::{HubMessage, InboundFormat, MessageParser, ParseError, TextBuffer};
