//! State shared between the link task and the application
//!
//! The reported value is a single word written by the application and
//! read by the link task once per tick, so a plain atomic is enough.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicI32, AtomicU8, Ordering};

use lpf2_core::LinkState;

/// Value sent to the hub on every tick
pub static REPORTED_VALUE: AtomicI32 = AtomicI32::new(0);

/// Mode the hub last selected (mirrored after every tick)
pub static CURRENT_MODE: AtomicU8 = AtomicU8::new(0);

/// Link state changes (connected / lost)
pub static LINK_STATE: Signal<CriticalSectionRawMutex, LinkState> = Signal::new();

/// Set the value the link reports from the next tick on
pub fn set_reported_value(value: i32) {
    REPORTED_VALUE.store(value, Ordering::Relaxed);
}

pub fn reported_value() -> i32 {
    REPORTED_VALUE.load(Ordering::Relaxed)
}

pub fn current_mode() -> u8 {
    CURRENT_MODE.load(Ordering::Relaxed)
}
