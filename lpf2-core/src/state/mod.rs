//! Link state machine
//!
//! The engine never assigns a state directly; it reports events and
//! takes whatever [`LinkState::transition`] returns.

mod events;
mod machine;

pub use events::LinkEvent;
pub use machine::LinkState;
