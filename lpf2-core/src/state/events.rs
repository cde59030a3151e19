//! Events that trigger link state transitions

/// Something that happened on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Autobaud pulse is about to be sent
    HandshakeStarted,
    /// Hub answered the advertisement with ACK
    AckReceived,
    /// No ACK within the timeout
    AckTimeout,
    /// A write failed or fell short; the peer is gone
    WriteFailed,
    /// The application dropped the session
    Closed,
}

impl LinkEvent {
    /// Check if this event ends a session or an attempt
    pub fn is_failure(&self) -> bool {
        matches!(self, LinkEvent::AckTimeout | LinkEvent::WriteFailed)
    }
}
