//! State machine definition

use super::events::LinkEvent;

/// Link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No session; the line may be released
    #[default]
    Disconnected,
    /// Advertising and waiting for the hub's ACK
    Handshaking,
    /// Exchanging messages every tick
    Connected,
}

impl LinkState {
    pub fn is_connected(&self) -> bool {
        matches!(self, LinkState::Connected)
    }

    /// Process an event and return the next state
    ///
    /// Pairs not listed are self-transitions.
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (Disconnected, HandshakeStarted) => Handshaking,

            (Handshaking, AckReceived) => Connected,
            (Handshaking, AckTimeout) => Disconnected,
            (Handshaking, WriteFailed) => Disconnected,
            (Handshaking, Closed) => Disconnected,

            (Connected, WriteFailed) => Disconnected,
            (Connected, Closed) => Disconnected,

            (state, _) => state,
        }
    }
}
