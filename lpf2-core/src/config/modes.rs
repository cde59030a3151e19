//! Mode tables for the two device profiles
//!
//! Entries are listed in transmission order, highest mode number first.
//! Hubs number modes by what they were told here, so the order and the
//! mode numbers must not drift apart.

use lpf2_protocol::{DataFormat, Mapping, ModeInfo, Range, ValueLayout};

/// A mode together with the number it is advertised under
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvertisedMode {
    pub mode: u8,
    pub info: ModeInfo,
}

const PERCENT: Range = Range::new(0.0, 100.0);

const GENERIC_MAPPING: Mapping = Mapping {
    input: 0x10,
    output: 0x00,
};

const fn layout(data_sets: u8, format: DataFormat, figures: u8, decimals: u8) -> ValueLayout {
    ValueLayout {
        data_sets,
        format,
        figures,
        decimals,
    }
}

const fn generic(mode: u8, name: &'static str, layout: ValueLayout) -> AdvertisedMode {
    AdvertisedMode {
        mode,
        info: ModeInfo {
            name,
            flags: None,
            raw: PERCENT,
            pct: PERCENT,
            si: PERCENT,
            symbol: "",
            mapping: GENERIC_MAPPING,
            layout,
        },
    }
}

/// Generic (Powered Up / Spike Prime) modes: four array modes over four
/// single-value modes, one per numeric format
pub static GENERIC_MODES: [AdvertisedMode; 8] = [
    generic(7, "float_array", layout(4, DataFormat::Float, 2, 1)),
    generic(6, "int32_array", layout(4, DataFormat::Int32, 3, 0)),
    generic(5, "int16_array", layout(4, DataFormat::Int16, 3, 0)),
    generic(4, "int8_array", layout(4, DataFormat::Int8, 3, 0)),
    generic(3, "float", layout(1, DataFormat::Float, 2, 1)),
    generic(2, "int32", layout(1, DataFormat::Int32, 3, 0)),
    generic(1, "int16", layout(1, DataFormat::Int16, 3, 0)),
    generic(0, "int8", layout(1, DataFormat::Int8, 3, 0)),
];

/// Capability flags trailing every EV3 mode name; only the second byte varies
const fn ev3_flags(second: u8) -> Option<[u8; 6]> {
    Some([0x40, second, 0x00, 0x00, 0x04, 0x84])
}

#[allow(clippy::too_many_arguments)]
const fn ev3(
    mode: u8,
    name: &'static str,
    flags: u8,
    raw_max: f32,
    si_max: f32,
    symbol: &'static str,
    mapping: (u8, u8),
    layout: ValueLayout,
) -> AdvertisedMode {
    AdvertisedMode {
        mode,
        info: ModeInfo {
            name,
            flags: ev3_flags(flags),
            raw: Range::new(0.0, raw_max),
            pct: PERCENT,
            si: Range::new(0.0, si_max),
            symbol,
            mapping: Mapping {
                input: mapping.0,
                output: mapping.1,
            },
            layout,
        },
    }
}

/// EV3-compatible modes, laid out like the EV3 ultrasonic sensor
pub static EV3_MODES: [AdvertisedMode; 9] = [
    ev3(8, "CALIB", 0x40, 255.0, 255.0, "PCT", (0x00, 0x00), layout(7, DataFormat::Int8, 3, 0)),
    ev3(7, "ADRAW", 0x00, 1024.0, 1024.0, "PCT", (0x90, 0x00), layout(1, DataFormat::Int16, 4, 0)),
    ev3(6, "PING", 0x80, 1.0, 1.0, "PCT", (0x00, 0x90), layout(1, DataFormat::Int8, 1, 0)),
    ev3(5, "LIGHT", 0x20, 100.0, 100.0, "PCT", (0x00, 0x10), layout(4, DataFormat::Int8, 3, 0)),
    ev3(4, "TRAW", 0x00, 14577.0, 14577.0, "uS", (0x90, 0x00), layout(1, DataFormat::Int32, 5, 0)),
    ev3(3, "LISTN", 0x00, 1.0, 1.0, "ST", (0x10, 0x00), layout(1, DataFormat::Int8, 1, 0)),
    ev3(2, "SINGL", 0x00, 2500.0, 250.0, "CM", (0x90, 0x00), layout(1, DataFormat::Int16, 5, 1)),
    ev3(1, "DISTS", 0x00, 320.0, 32.0, "CM", (0xF1, 0x00), layout(1, DataFormat::Int16, 4, 1)),
    ev3(0, "DISTL", 0x00, 2500.0, 250.0, "CM", (0x91, 0x00), layout(1, DataFormat::Int16, 5, 1)),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_descending(modes: &[AdvertisedMode]) {
        for pair in modes.windows(2) {
            assert_eq!(pair[0].mode, pair[1].mode + 1);
        }
        assert_eq!(modes.last().map(|m| m.mode), Some(0));
    }

    #[test]
    fn test_generic_modes_descend_to_zero() {
        assert_descending(&GENERIC_MODES);
        assert_eq!(GENERIC_MODES[0].info.name, "float_array");
    }

    #[test]
    fn test_ev3_modes_descend_to_zero() {
        assert_descending(&EV3_MODES);
        assert_eq!(EV3_MODES[0].mode, 8);
    }

    #[test]
    fn test_ev3_names_fit_flagged_field() {
        for entry in EV3_MODES.iter() {
            assert!(entry.info.name.len() <= 5, "{}", entry.info.name);
        }
    }
}
