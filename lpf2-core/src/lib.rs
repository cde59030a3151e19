//! Board-agnostic core of the LPF2 sensor emulator
//!
//! This crate contains everything that does not depend on a specific
//! chip:
//!
//! - Device profiles (mode tables, baud rates, handshake pacing)
//! - Link state machine
//! - The link engine: one-shot handshake plus the periodic tick that
//!   drains hub messages and answers with the current value
//!
//! The engine is passive. A driver calls [`link::SensorLink::connect`]
//! until it succeeds, then [`link::SensorLink::tick`] at a fixed period.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod link;
pub mod state;

pub use config::{DeviceProfile, LinkConfig};
pub use link::{HandshakeError, SensorLink, TickOutcome};
pub use state::{LinkEvent, LinkState};
