//! LPF2 link task
//!
//! Retries the handshake until a hub answers, then ticks the link at the
//! configured period until the hub goes away. The handshake blocks the
//! executor for its whole duration; nothing else here is time critical.

use defmt::*;
use embassy_time::{Delay, Duration, Ticker, Timer};
use portable_atomic::Ordering;

use lpf2_core::SensorLink;
use lpf2_hal_rp2040::RpSensorLine;

use crate::channels::{reported_value, CURRENT_MODE, LINK_STATE};

/// Pause between failed handshake attempts
const RETRY_DELAY_MS: u64 = 100;

/// The link as wired on this board
pub type Link = SensorLink<RpSensorLine, Delay>;

#[embassy_executor::task]
pub async fn link_task(link: &'static mut Link) {
    info!("Link task started ({})", link.profile());

    loop {
        connect(link).await;
        LINK_STATE.signal(link.state());

        run(link).await;
        LINK_STATE.signal(link.state());
        warn!("Hub lost, reconnecting");
    }
}

/// Retry the handshake until it succeeds
async fn connect(link: &mut Link) {
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.wrapping_add(1);
        link.set_reported_value(reported_value());

        match link.try_connect() {
            Ok(()) => {
                info!("Connected after {} attempt(s)", attempts);
                CURRENT_MODE.store(link.current_mode(), Ordering::Relaxed);
                return;
            }
            Err(e) => debug!("Handshake attempt {} failed: {:?}", attempts, e),
        }

        Timer::after_millis(RETRY_DELAY_MS).await;
    }
}

/// Tick until the link drops
async fn run(link: &mut Link) {
    let period = Duration::from_millis(link.config().tick_period_ms as u64);
    let mut ticker = Ticker::every(period);

    while link.is_connected() {
        ticker.next().await;

        link.set_reported_value(reported_value());
        let outcome = link.tick();
        if outcome.rejected > 0 {
            trace!("Tick dropped {} malformed message(s)", outcome.rejected);
        }

        let mode = link.current_mode();
        if CURRENT_MODE.swap(mode, Ordering::Relaxed) != mode {
            info!("Hub switched to mode {}", mode);
        }
    }
}
