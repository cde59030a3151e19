//! RP2040-specific HAL for the LPF2 sensor emulator
//!
//! Implements the `lpf2-hal` traits on top of embassy-rp:
//!
//! - [`uart::RpSensorLine`]: blocking UART with non-blocking reads and
//!   bounded writes, plus runtime baud changes
//! - [`uart::TxOverride`]: the UART's TX pin driven by hand through the
//!   IO bank output override, for autobaud pulses

#![no_std]

pub mod uart;

pub use uart::{RpSensorLine, TxOverride};
