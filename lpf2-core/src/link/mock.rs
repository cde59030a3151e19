//! In-memory sensor line for engine tests
//!
//! Line, pin and delay share one [`Bus`] that records every operation in
//! order, so tests can check the interleaving of writes and delays.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use lpf2_hal::{OutputPin, SensorLine, UartConfig, UartRx, UartTx};

use super::SensorLink;
use crate::config::{DeviceProfile, LinkConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Open(u32),
    Low,
    High,
    Write(Vec<u8>),
    Delay(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

#[derive(Default)]
struct BusState {
    ops: Vec<Op>,
    rx: VecDeque<u8>,
    write_limit: Option<usize>,
    write_error: bool,
    open_error: bool,
}

#[derive(Clone, Default)]
pub struct Bus(Rc<RefCell<BusState>>);

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> MockLine {
        MockLine {
            bus: self.clone(),
            pin: MockPin {
                bus: self.clone(),
                high: true,
            },
        }
    }

    pub fn delay(&self) -> MockDelay {
        MockDelay { bus: self.clone() }
    }

    pub fn queue_rx(&self, bytes: &[u8]) {
        self.0.borrow_mut().rx.extend(bytes.iter().copied());
    }

    pub fn rx_pending(&self) -> usize {
        self.0.borrow().rx.len()
    }

    /// Accept at most `limit` bytes per write
    pub fn set_write_limit(&self, limit: Option<usize>) {
        self.0.borrow_mut().write_limit = limit;
    }

    pub fn set_write_error(&self, fail: bool) {
        self.0.borrow_mut().write_error = fail;
    }

    pub fn set_open_error(&self, fail: bool) {
        self.0.borrow_mut().open_error = fail;
    }

    pub fn ops(&self) -> Vec<Op> {
        self.0.borrow().ops.clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Forget recorded operations
    pub fn clear(&self) {
        self.0.borrow_mut().ops.clear();
    }

    fn record(&self, op: Op) {
        self.0.borrow_mut().ops.push(op);
    }
}

pub struct MockPin {
    bus: Bus,
    high: bool,
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.bus.record(Op::High);
    }

    fn set_low(&mut self) {
        self.high = false;
        self.bus.record(Op::Low);
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

pub struct MockLine {
    bus: Bus,
    pin: MockPin,
}

impl UartTx for MockLine {
    type Error = MockError;

    fn write(&mut self, data: &[u8]) -> Result<usize, MockError> {
        let (limit, fail) = {
            let state = self.bus.0.borrow();
            (state.write_limit, state.write_error)
        };
        if fail {
            return Err(MockError);
        }
        let n = limit.map_or(data.len(), |limit| limit.min(data.len()));
        if n > 0 {
            self.bus.record(Op::Write(data[..n].to_vec()));
        }
        Ok(n)
    }

    fn flush(&mut self) -> Result<(), MockError> {
        Ok(())
    }
}

impl UartRx for MockLine {
    type Error = MockError;

    fn read_byte(&mut self) -> Result<Option<u8>, MockError> {
        Ok(self.bus.0.borrow_mut().rx.pop_front())
    }
}

impl SensorLine for MockLine {
    type Pin = MockPin;

    fn open(&mut self, config: &UartConfig) -> Result<(), MockError> {
        if self.bus.0.borrow().open_error {
            return Err(MockError);
        }
        self.bus.record(Op::Open(config.baudrate));
        Ok(())
    }

    fn release(&mut self) -> &mut MockPin {
        &mut self.pin
    }
}

pub struct MockDelay {
    bus: Bus,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.bus.record(Op::Delay(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bus.record(Op::Delay(ms));
    }
}

/// A link that has completed its handshake, with the record cleared
pub fn connected(profile: DeviceProfile) -> (Bus, SensorLink<MockLine, MockDelay>) {
    let bus = Bus::new();
    let mut link = SensorLink::new(bus.line(), bus.delay(), LinkConfig::new(profile));
    bus.queue_rx(&[lpf2_protocol::messages::SYS_ACK]);
    assert!(link.connect());
    bus.clear();
    (bus, link)
}
