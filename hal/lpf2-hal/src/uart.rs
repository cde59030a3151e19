//! UART serial communication abstractions
//!
//! The LPF2 link is a single 8N1 serial line. During the handshake the
//! device owns it exclusively and may block; once connected it is touched
//! only from the periodic tick, which must never block on input.

use crate::gpio::OutputPin;

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Returns how many bytes were accepted. A count of zero (or less than
    /// `data.len()`) means the peer is gone; callers treat it as link loss.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is already buffered
    ///
    /// Never blocks: returns `Ok(None)` when the receive buffer is empty.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// A sensor-port UART whose TX pin can be lent back to GPIO
///
/// The hub detects a sensor by a long low level on the sensor's TX line,
/// so the handshake has to detach the pin from the UART, drive it by hand
/// and then reopen the UART (possibly at a new baud rate).
pub trait SensorLine: Uart {
    /// GPIO view of the TX pin while the UART is released
    type Pin: OutputPin;

    /// Configure and start the UART, reclaiming the TX pin if it was released
    fn open(&mut self, config: &UartConfig) -> Result<(), <Self as UartTx>::Error>;

    /// Take the TX pin away from the UART and drive it as a GPIO output
    ///
    /// Pending output is flushed first. The pin stays released until the
    /// next [`open`](Self::open).
    fn release(&mut self) -> &mut Self::Pin;
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// 8N1 at the given baud rate, the only framing LPF2 uses
    pub const fn lpf2(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::lpf2(115200)
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
