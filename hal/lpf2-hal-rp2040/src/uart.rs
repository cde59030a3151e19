//! Sensor-port UART
//!
//! The TX pin stays muxed to the UART the whole time. Releasing the line
//! forces the pad level through the IO bank output override instead, which
//! the hub sees exactly like a GPIO driving the wire.

use embassy_rp::gpio::Pin;
use embassy_rp::pac;
use embassy_rp::pac::io::vals::Outover;
use embassy_rp::uart::{self, Blocking, Instance, RxPin, TxPin, Uart};
use embassy_rp::Peri;
use embassy_time::{Duration, Instant};
use embedded_hal_nb::serial::{Read, Write};
use lpf2_hal::{OutputPin, SensorLine, UartConfig, UartRx, UartTx};

/// How long one byte may wait for room in the TX FIFO
///
/// Several byte times at the slowest handshake rate (2400 baud).
pub const DEFAULT_BYTE_TIMEOUT: Duration = Duration::from_millis(50);

const RX_FIFO_DEPTH: usize = 32;

/// TX pad driven through the output override
pub struct TxOverride {
    pin: u8,
    high: bool,
}

impl TxOverride {
    fn new(pin: u8) -> Self {
        Self { pin, high: true }
    }

    fn set(&mut self, over: Outover) {
        pac::IO_BANK0
            .gpio(self.pin as usize)
            .ctrl()
            .modify(|w| w.set_outover(over));
    }

    /// Hand the pad back to the UART
    fn restore(&mut self) {
        self.set(Outover::NORMAL);
        self.high = true;
    }
}

impl OutputPin for TxOverride {
    fn set_high(&mut self) {
        self.set(Outover::HIGH);
        self.high = true;
    }

    fn set_low(&mut self) {
        self.set(Outover::LOW);
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// LPF2 sensor line on one RP2040 UART
///
/// Framing is fixed at 8N1 when the UART is created; [`SensorLine::open`]
/// only changes the rate.
pub struct RpSensorLine {
    uart: Uart<'static, Blocking>,
    tx: TxOverride,
    byte_timeout: Duration,
}

impl RpSensorLine {
    pub fn new<T: Instance>(
        uart: Peri<'static, T>,
        tx: Peri<'static, impl TxPin<T> + Pin>,
        rx: Peri<'static, impl RxPin<T>>,
        baudrate: u32,
    ) -> Self {
        let tx_pin = tx.pin();

        let mut config = uart::Config::default();
        config.baudrate = baudrate;
        config.data_bits = uart::DataBits::DataBits8;
        config.parity = uart::Parity::ParityNone;
        config.stop_bits = uart::StopBits::STOP1;

        Self {
            uart: Uart::new_blocking(uart, tx, rx, config),
            tx: TxOverride::new(tx_pin),
            byte_timeout: DEFAULT_BYTE_TIMEOUT,
        }
    }

    pub fn with_byte_timeout(mut self, timeout: Duration) -> Self {
        self.byte_timeout = timeout;
        self
    }

    /// Queue one byte, waiting at most the byte timeout for FIFO space
    ///
    /// Returns `Ok(false)` if the FIFO never drained.
    fn push(&mut self, byte: u8) -> Result<bool, uart::Error> {
        let deadline = Instant::now() + self.byte_timeout;
        loop {
            match self.uart.write(byte) {
                Ok(()) => return Ok(true),
                Err(nb::Error::Other(e)) => return Err(e),
                Err(nb::Error::WouldBlock) if Instant::now() >= deadline => return Ok(false),
                Err(nb::Error::WouldBlock) => {}
            }
        }
    }

    /// Throw away whatever arrived while the line was being reconfigured
    fn discard_input(&mut self) {
        for _ in 0..RX_FIFO_DEPTH {
            if let Err(nb::Error::WouldBlock) = self.uart.read() {
                break;
            }
        }
    }
}

impl UartTx for RpSensorLine {
    type Error = uart::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        for (written, &byte) in data.iter().enumerate() {
            if !self.push(byte)? {
                return Ok(written);
            }
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.uart.blocking_flush()
    }
}

impl UartRx for RpSensorLine {
    type Error = uart::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        match self.uart.read() {
            Ok(byte) => Ok(Some(byte)),
            Err(nb::Error::WouldBlock) => Ok(None),
            Err(nb::Error::Other(e)) => Err(e),
        }
    }
}

impl SensorLine for RpSensorLine {
    type Pin = TxOverride;

    fn open(&mut self, config: &UartConfig) -> Result<(), uart::Error> {
        self.uart.blocking_flush()?;
        self.uart.set_baudrate(config.baudrate);
        self.tx.restore();
        self.discard_input();
        Ok(())
    }

    fn release(&mut self) -> &mut TxOverride {
        // Let queued bytes finish before the pad is taken over
        if self.uart.blocking_flush().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("TX flush failed before release");
        }
        &mut self.tx
    }
}
