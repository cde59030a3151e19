//! GPIO pin abstractions
//!
//! The only pin the engine drives directly is the sensor TX line while it
//! is detached from the UART, to produce the autobaud pulse.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Latch(bool);

    impl OutputPin for Latch {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_set_state_dispatches() {
        let mut pin = Latch(true);
        pin.set_state(false);
        assert!(pin.is_set_low());
        pin.set_state(true);
        assert!(pin.is_set_high());
    }
}
