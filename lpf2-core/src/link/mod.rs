//! Link engine
//!
//! [`SensorLink`] owns the sensor line and all session state. It is driven
//! from outside:
//!
//! ```text
//! Disconnected ──connect()──> Handshaking ──hub ACK──> Connected
//!       ^                          │                      │
//!       └────── timeout / write ───┘      tick() ─────────┤
//!       └──────────────── short write / disconnect() ─────┘
//! ```
//!
//! Handshake and tick both run through `&mut self`, so they can never
//! overlap.

mod engine;
mod handshake;

#[cfg(test)]
mod mock;

pub use engine::{SensorLink, TickOutcome};
pub use handshake::HandshakeError;
