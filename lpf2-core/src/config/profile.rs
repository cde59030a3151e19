//! Device profiles
//!
//! A profile fixes everything the hub can observe about the emulated
//! sensor: baud rates, autobaud pulse, advertised modes, handshake pacing
//! and the shape of the messages exchanged once connected.

use lpf2_protocol::messages::{SYS_ACK, SYS_SYNC};
use lpf2_protocol::{InboundFormat, InfoType, ValueFormat};

use super::modes::{AdvertisedMode, EV3_MODES, GENERIC_MODES};

/// Sensor type id announced in the TYPE frame
pub const SENSOR_TYPE_ID: u8 = 0x3E;

/// Rate every profile ends up at once connected
pub const FINAL_BAUD: u32 = 115_200;

/// Identification bytes the EV3 profile sends after its last mode
const EV3_IDENTITY: [u8; 12] = [
    0x00, 0x2D, 0x00, 0x33, 0x05, 0x47, 0x38, 0x33, 0x30, 0x31, 0x32, 0x36,
];

/// Emulated sensor personality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceProfile {
    /// Powered Up / Spike Prime sensor with numeric array modes
    #[default]
    Generic,
    /// EV3 ultrasonic-style sensor with two-byte values and mode 8
    Ev3Compatible,
}

/// What the device announces before its mode advertisement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorIdentity {
    /// Single byte sent before TYPE
    pub lead_in: u8,
    pub type_id: u8,
    /// Payload of the MODES frame
    pub mode_counts: &'static [u8],
    pub firmware_version: u32,
    pub hardware_version: u32,
}

/// Opaque INFO frame appended after the last mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityBlock {
    pub mode: u8,
    pub info_type: InfoType,
    pub body: &'static [u8],
}

/// Handshake delays in milliseconds
///
/// A zero entry means the next frame follows immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pacing {
    pub after_lead_in_ms: u32,
    /// After TYPE, MODES and SPEED each
    pub after_command_ms: u32,
    pub after_version_ms: u32,
    /// After each RAW, PCT, SI, SYMBOL and MAPPING frame
    pub after_info_ms: u32,
    /// After the FORMAT frame closing a mode
    pub after_mode_ms: u32,
    /// After the device's own ACK, before listening for the hub's
    pub after_ack_ms: u32,
}

impl DeviceProfile {
    /// Preset name, as accepted by [`str::parse`]
    pub const fn name(self) -> &'static str {
        match self {
            DeviceProfile::Generic => "generic",
            DeviceProfile::Ev3Compatible => "ev3-compatible",
        }
    }

    /// Baud rate the advertisement is sent at
    pub const fn initial_baud(self) -> u32 {
        match self {
            DeviceProfile::Generic => 2400,
            DeviceProfile::Ev3Compatible => FINAL_BAUD,
        }
    }

    /// Baud rate requested in the SPEED frame and used once connected
    pub const fn final_baud(self) -> u32 {
        FINAL_BAUD
    }

    /// Length of the low level that wakes the hub's autobaud detection
    pub const fn autobaud_pulse_ms(self) -> u32 {
        match self {
            DeviceProfile::Generic => 500,
            DeviceProfile::Ev3Compatible => 410,
        }
    }

    /// Low pulse before reopening at the final rate, if the rate changes
    pub const fn rebaud_pulse_ms(self) -> Option<u32> {
        match self {
            DeviceProfile::Generic => Some(10),
            DeviceProfile::Ev3Compatible => None,
        }
    }

    pub const fn identity(self) -> SensorIdentity {
        match self {
            DeviceProfile::Generic => SensorIdentity {
                lead_in: SYS_SYNC,
                type_id: SENSOR_TYPE_ID,
                mode_counts: &[7, 7],
                firmware_version: 0x0200_0000,
                hardware_version: 0x0200_0000,
            },
            DeviceProfile::Ev3Compatible => SensorIdentity {
                lead_in: SYS_ACK,
                type_id: SENSOR_TYPE_ID,
                mode_counts: &[7, 6, 8, 0],
                firmware_version: 0x1000_0000,
                hardware_version: 0x1000_0000,
            },
        }
    }

    /// Advertised modes in transmission order
    pub fn modes(self) -> &'static [AdvertisedMode] {
        match self {
            DeviceProfile::Generic => &GENERIC_MODES,
            DeviceProfile::Ev3Compatible => &EV3_MODES,
        }
    }

    pub const fn trailer(self) -> Option<IdentityBlock> {
        match self {
            DeviceProfile::Generic => None,
            DeviceProfile::Ev3Compatible => Some(IdentityBlock {
                mode: 0,
                info_type: InfoType::Identity,
                body: &EV3_IDENTITY,
            }),
        }
    }

    pub const fn pacing(self) -> Pacing {
        match self {
            DeviceProfile::Generic => Pacing {
                after_lead_in_ms: 0,
                after_command_ms: 0,
                after_version_ms: 0,
                after_info_ms: 0,
                after_mode_ms: 5,
                after_ack_ms: 5,
            },
            DeviceProfile::Ev3Compatible => Pacing {
                after_lead_in_ms: 10,
                after_command_ms: 1,
                after_version_ms: 18,
                after_info_ms: 1,
                after_mode_ms: 18,
                after_ack_ms: 0,
            },
        }
    }

    /// Shape of the periodic value frame
    pub const fn value_format(self) -> ValueFormat {
        match self {
            DeviceProfile::Generic => ValueFormat::Byte,
            DeviceProfile::Ev3Compatible => ValueFormat::Word,
        }
    }

    /// What the hub may send once connected
    pub const fn inbound_format(self) -> InboundFormat {
        match self {
            DeviceProfile::Generic => InboundFormat {
                extended_modes: false,
                combo_len: 1,
            },
            DeviceProfile::Ev3Compatible => InboundFormat {
                extended_modes: true,
                combo_len: 2,
            },
        }
    }
}
