//! LPF2 sensor emulator firmware
//!
//! Makes an RP2040 board look like a passive LEGO sensor on a Powered Up,
//! Spike Prime or EV3 hub port. The sensor port is wired to UART0:
//!
//! - GPIO0: TX (to the hub's RX)
//! - GPIO1: RX (from the hub's TX)
//!
//! Build with `--features ev3` to emulate the EV3-compatible sensor.
//!
//! What gets reported is up to the application: it stores a value with
//! [`channels::set_reported_value`] and the link task sends it every tick.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lpf2_core::{DeviceProfile, LinkConfig, LinkState, SensorLink};
use lpf2_hal_rp2040::RpSensorLine;

mod channels;
mod tasks;

/// Preset to emulate, selected at build time
#[cfg(feature = "ev3")]
const PROFILE: &str = "ev3-compatible";
#[cfg(not(feature = "ev3"))]
const PROFILE: &str = "generic";

/// Value reported until the application stores its first reading
const INITIAL_VALUE: i32 = 0;

// The link lives for the whole program
static LINK: StaticCell<tasks::Link> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("LPF2 sensor firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let profile = match PROFILE.parse::<DeviceProfile>() {
        Ok(profile) => profile,
        Err(_) => {
            warn!("Unknown profile '{}', using generic", PROFILE);
            DeviceProfile::Generic
        }
    };
    let config = LinkConfig::new(profile);
    info!(
        "Emulating {} sensor: {} baud handshake, {} ms tick",
        profile,
        profile.initial_baud(),
        config.tick_period_ms
    );

    channels::set_reported_value(INITIAL_VALUE);

    let line = RpSensorLine::new(p.UART0, p.PIN_0, p.PIN_1, profile.initial_baud());
    let link = LINK.init(SensorLink::new(line, Delay, config));

    spawner.spawn(unwrap!(tasks::link_task(link)));

    info!("All tasks spawned, firmware running");

    // Report link changes; the value source plugs in through `channels`
    loop {
        match channels::LINK_STATE.wait().await {
            LinkState::Connected => info!(
                "Hub connected, mode {}, reporting {}",
                channels::current_mode(),
                channels::reported_value()
            ),
            state => info!("Link {}", state),
        }
    }
}
