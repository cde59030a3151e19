//! LPF2 Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the protocol engine needs from
//! a board. Chip-specific crates (RP2040, ...) implement them so the same
//! engine runs unchanged on every target, and host tests can substitute
//! scripted mocks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lpf2-core (handshake + tick engine)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lpf2-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ lpf2-hal-     │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (the autobaud line)
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`uart::SensorLine`] - A UART whose TX pin can be lent back to GPIO
//!
//! Delays come from `embedded-hal`'s `DelayNs`; nothing here duplicates it.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use uart::{SensorLine, Uart, UartConfig, UartRx, UartTx};
