//! Autobaud pulse, capability advertisement and ACK wait
//!
//! One call makes one attempt. Retrying is up to the caller; every attempt
//! starts from a clean session.

use embedded_hal::delay::DelayNs;
use lpf2_hal::{OutputPin, SensorLine, UartConfig};
use lpf2_protocol::info::{info_frame, ADVERTISEMENT_ORDER};
use lpf2_protocol::messages::{modes_frame, speed_frame, type_frame, version_frame, SYS_ACK};
use lpf2_protocol::{Frame, FrameError, InfoType};

use super::engine::SensorLink;
use crate::config::Pacing;
use crate::state::LinkEvent;

/// Why a connection attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeError {
    /// The hub never answered with ACK
    AckTimeout,
    /// A write failed or was cut short
    WriteFailed,
    /// The UART could not be configured
    Open,
    /// A handshake frame could not be built
    Frame(FrameError),
}

impl From<FrameError> for HandshakeError {
    fn from(e: FrameError) -> Self {
        HandshakeError::Frame(e)
    }
}

impl HandshakeError {
    fn event(self) -> LinkEvent {
        match self {
            HandshakeError::AckTimeout => LinkEvent::AckTimeout,
            _ => LinkEvent::WriteFailed,
        }
    }
}

impl<L, D> SensorLink<L, D>
where
    L: SensorLine,
    D: DelayNs,
{
    /// One handshake attempt; true once the hub has acknowledged
    pub fn connect(&mut self) -> bool {
        match self.try_connect() {
            Ok(()) => true,
            Err(e) => {
                warn!("LPF2 handshake failed: {}", e);
                false
            }
        }
    }

    /// One handshake attempt, reporting why it failed
    ///
    /// Connecting an already connected link is a no-op.
    pub fn try_connect(&mut self) -> Result<(), HandshakeError> {
        if self.state.is_connected() {
            return Ok(());
        }

        self.apply(LinkEvent::HandshakeStarted);
        self.reset_session();

        match self.handshake() {
            Ok(()) => {
                self.apply(LinkEvent::AckReceived);
                info!("LPF2 connected as {}", self.config.profile);
                Ok(())
            }
            Err(e) => {
                self.apply(e.event());
                Err(e)
            }
        }
    }

    fn handshake(&mut self) -> Result<(), HandshakeError> {
        let profile = self.config.profile;
        let pacing = profile.pacing();

        self.pulse(profile.autobaud_pulse_ms());
        self.open(profile.initial_baud())?;

        self.advertise(&pacing)?;

        self.send(&[SYS_ACK])?;
        self.pause(pacing.after_ack_ms);
        self.wait_for_ack()?;

        if let Some(low_ms) = profile.rebaud_pulse_ms() {
            self.pulse(low_ms);
            self.open(profile.final_baud())?;
        }
        Ok(())
    }

    fn advertise(&mut self, pacing: &Pacing) -> Result<(), HandshakeError> {
        let profile = self.config.profile;
        let identity = profile.identity();

        self.send(&[identity.lead_in])?;
        self.pause(pacing.after_lead_in_ms);

        for frame in [
            type_frame(identity.type_id)?,
            modes_frame(identity.mode_counts)?,
            speed_frame(profile.final_baud())?,
        ] {
            self.send_frame(&frame)?;
            self.pause(pacing.after_command_ms);
        }

        let version = version_frame(identity.firmware_version, identity.hardware_version)?;
        self.send_frame(&version)?;
        self.pause(pacing.after_version_ms);

        for entry in profile.modes() {
            trace!("Advertising mode {} ({})", entry.mode, entry.info.name);
            let frames = entry.info.advertisement(entry.mode)?;
            for (frame, info_type) in frames.iter().zip(ADVERTISEMENT_ORDER) {
                self.send_frame(frame)?;
                self.pause(match info_type {
                    InfoType::Name => 0,
                    InfoType::Format => pacing.after_mode_ms,
                    _ => pacing.after_info_ms,
                });
            }
        }

        if let Some(trailer) = profile.trailer() {
            let frame = info_frame(trailer.mode, trailer.info_type as u8, trailer.body)?;
            self.send_frame(&frame)?;
        }
        Ok(())
    }

    /// Poll for the hub's ACK until the configured timeout
    ///
    /// Anything else the hub sends meanwhile is discarded.
    fn wait_for_ack(&mut self) -> Result<(), HandshakeError> {
        for _ in 0..self.config.ack_polls() {
            if self.ack_received() {
                return Ok(());
            }
            self.delay.delay_ms(self.config.ack_poll_ms);
        }
        Err(HandshakeError::AckTimeout)
    }

    fn ack_received(&mut self) -> bool {
        loop {
            match self.line.read_byte() {
                Ok(Some(SYS_ACK)) => return true,
                Ok(Some(byte)) => trace!("Discarding {=u8:#x} while waiting for ACK", byte),
                Ok(None) => return false,
                // Framing noise is expected right after the pulse
                Err(_) => return false,
            }
        }
    }

    /// Hold the TX line low, then release it high
    fn pulse(&mut self, low_ms: u32) {
        let pin = self.line.release();
        pin.set_low();
        self.delay.delay_ms(low_ms);
        pin.set_high();
    }

    fn open(&mut self, baudrate: u32) -> Result<(), HandshakeError> {
        debug!("Opening sensor line at {} baud", baudrate);
        self.line
            .open(&UartConfig::lpf2(baudrate))
            .map_err(|_| HandshakeError::Open)
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), HandshakeError> {
        let bytes = frame.encode_to_vec()?;
        self.send(&bytes)
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), HandshakeError> {
        match self.line.write(bytes) {
            Ok(n) if n == bytes.len() => Ok(()),
            _ => Err(HandshakeError::WriteFailed),
        }
    }

    fn pause(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }
}
