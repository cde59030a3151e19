//! Session state and the periodic tick

use embedded_hal::delay::DelayNs;
use lpf2_hal::{OutputPin, SensorLine};
use lpf2_protocol::{encode_value, HubMessage, MessageParser, TextBuffer};

use crate::config::{DeviceProfile, LinkConfig};
use crate::state::{LinkEvent, LinkState};

/// Highest mode number a hub can select
pub const MAX_MODE: u8 = 15;

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// Hub messages accepted and applied
    pub messages: usize,
    /// Byte sequences dropped by the parser
    pub rejected: usize,
    /// Whether the value frame went out in full
    pub sent: bool,
}

/// Device side of one LPF2 sensor port
pub struct SensorLink<L, D> {
    pub(super) line: L,
    pub(super) delay: D,
    pub(super) config: LinkConfig,
    pub(super) state: LinkState,
    /// Last mode the hub selected
    pub(super) mode: u8,
    pub(super) value: i32,
    pub(super) text: TextBuffer,
    pub(super) parser: MessageParser,
}

impl<L, D> SensorLink<L, D>
where
    L: SensorLine,
    D: DelayNs,
{
    pub fn new(line: L, delay: D, config: LinkConfig) -> Self {
        Self {
            line,
            delay,
            config,
            state: LinkState::Disconnected,
            mode: 0,
            value: 0,
            text: TextBuffer::blank(),
            parser: MessageParser::new(config.profile.inbound_format()),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn profile(&self) -> DeviceProfile {
        self.config.profile
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Value to report from the next tick on
    pub fn set_reported_value(&mut self, value: i32) {
        self.value = value;
    }

    pub fn reported_value(&self) -> i32 {
        self.value
    }

    /// Mode last selected by the hub (0 until it selects one)
    pub fn current_mode(&self) -> u8 {
        self.mode
    }

    /// Text from the last accepted WRITE-DATA message
    pub fn text(&self) -> &TextBuffer {
        &self.text
    }

    /// Give back the line and delay
    pub fn free(self) -> (L, D) {
        (self.line, self.delay)
    }

    /// One scheduler tick: drain the hub's messages, then send the value
    ///
    /// Does nothing unless connected. A failed or short write ends the
    /// session; nothing else does.
    pub fn tick(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.state.is_connected() {
            return outcome;
        }

        self.drain_inbound(&mut outcome);
        outcome.sent = self.send_value();
        outcome
    }

    /// Drop the session and idle the line high
    pub fn disconnect(&mut self) {
        if self.state != LinkState::Disconnected {
            info!("LPF2 link closed");
        }
        self.apply(LinkEvent::Closed);
        self.parser.reset();
        self.line.release().set_high();
    }

    pub(super) fn apply(&mut self, event: LinkEvent) {
        let next = self.state.transition(event);
        if next != self.state {
            debug!("Link {} -> {} on {}", self.state, next, event);
        }
        self.state = next;
    }

    /// Forget everything learned from the previous hub
    pub(super) fn reset_session(&mut self) {
        self.mode = 0;
        self.text = TextBuffer::blank();
        self.parser.reset();
    }

    fn drain_inbound(&mut self, outcome: &mut TickOutcome) {
        loop {
            let byte = match self.line.read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => break,
                Err(_) => {
                    warn!("LPF2 receive error");
                    break;
                }
            };

            match self.parser.feed(byte) {
                Ok(Some(message)) => {
                    self.handle_message(message);
                    outcome.messages += 1;
                }
                Ok(None) => {}
                Err(e) => {
                    debug!("Dropped hub bytes: {}", e);
                    outcome.rejected += 1;
                }
            }
        }
    }

    fn handle_message(&mut self, message: HubMessage) {
        match message {
            HubMessage::Filler | HubMessage::Keepalive => {}
            HubMessage::Select { mode } => {
                if mode > MAX_MODE {
                    warn!("Ignoring SELECT of mode {}", mode);
                } else if mode != self.mode {
                    info!("Hub selected mode {}", mode);
                    self.mode = mode;
                }
            }
            HubMessage::WriteData { mode, len, text } => {
                debug!("Hub wrote {} bytes to mode {}: {}", len, mode, text.as_bytes());
                self.text = text;
            }
            HubMessage::Combo { data } => {
                trace!("Combo write {}", &data[..]);
            }
        }
    }

    /// Encode and write the value frame; false means the link is gone
    fn send_value(&mut self) -> bool {
        let frame = match encode_value(self.config.profile.value_format(), self.mode, self.value) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Value frame encode failed: {}", e);
                return false;
            }
        };

        match self.line.write(&frame) {
            Ok(n) if n == frame.len() => true,
            Ok(n) => {
                warn!("Short write ({} of {} bytes), hub gone", n, frame.len());
                self.apply(LinkEvent::WriteFailed);
                false
            }
            Err(_) => {
                warn!("Value write failed, hub gone");
                self.apply(LinkEvent::WriteFailed);
                false
            }
        }
    }
}
