//! Link configuration and preset parsing

use core::fmt;
use core::str::FromStr;

use super::profile::DeviceProfile;

/// Period of the steady-state tick
pub const DEFAULT_TICK_PERIOD_MS: u32 = 200;

/// How long to wait for the hub's ACK after advertising
pub const DEFAULT_ACK_TIMEOUT_MS: u32 = 2000;

/// Interval between receive polls during the ACK wait
pub const DEFAULT_ACK_POLL_MS: u32 = 5;

/// Everything the link engine needs to know up front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub profile: DeviceProfile,
    /// Used by the driver that calls `tick()`, not by the engine itself
    pub tick_period_ms: u32,
    pub ack_timeout_ms: u32,
    pub ack_poll_ms: u32,
}

impl LinkConfig {
    pub const fn new(profile: DeviceProfile) -> Self {
        Self {
            profile,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
            ack_poll_ms: DEFAULT_ACK_POLL_MS,
        }
    }

    /// Number of receive polls that fit in the ACK timeout
    pub const fn ack_polls(&self) -> u32 {
        if self.ack_poll_ms == 0 {
            return 1;
        }
        self.ack_timeout_ms.div_ceil(self.ack_poll_ms)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(DeviceProfile::default())
    }
}

impl From<DeviceProfile> for LinkConfig {
    fn from(profile: DeviceProfile) -> Self {
        Self::new(profile)
    }
}

/// Preset name not recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileParseError;

impl fmt::Display for ProfileParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown device profile (expected \"generic\" or \"ev3-compatible\")")
    }
}

impl FromStr for DeviceProfile {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "generic" => Ok(DeviceProfile::Generic),
            "ev3-compatible" => Ok(DeviceProfile::Ev3Compatible),
            _ => Err(ProfileParseError),
        }
    }
}

impl fmt::Display for DeviceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_presets() {
        assert_eq!("generic".parse::<DeviceProfile>(), Ok(DeviceProfile::Generic));
        assert_eq!("ev3-compatible".parse::<DeviceProfile>(), Ok(DeviceProfile::Ev3Compatible));
        assert_eq!("ev3".parse::<DeviceProfile>(), Err(ProfileParseError));
    }

    #[test]
    fn test_name_round_trips_through_parse() {
        for profile in [DeviceProfile::Generic, DeviceProfile::Ev3Compatible] {
            assert_eq!(profile.name().parse::<DeviceProfile>(), Ok(profile));
            assert_eq!(profile.to_string(), profile.name());
        }
    }

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.profile, DeviceProfile::Generic);
        assert_eq!(config.tick_period_ms, 200);
        assert_eq!(config.ack_polls(), 400);
    }

    #[test]
    fn test_ack_polls_rounds_up() {
        let config = LinkConfig {
            ack_timeout_ms: 12,
            ack_poll_ms: 5,
            ..LinkConfig::default()
        };
        assert_eq!(config.ack_polls(), 3);
    }
}
