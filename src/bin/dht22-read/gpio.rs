//! Raspberry Pi bindings for the reader's line and delay traits.
//!
//! `rppal` pins are wrapped locally because the orphan rule forbids
//! implementing [`DataLine`] for them directly.

use std::convert::Infallible;
use std::thread;
use std::time::{Duration, Instant};

use dht22_reader::{DataLine, Direction, Pull};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use rppal::gpio::{Bias, IoPin, Mode, Pin};

/// A GPIO pin that can be switched between input and output at runtime.
pub struct RppalLine(IoPin);

impl RppalLine {
    pub fn new(pin: Pin) -> Self {
        RppalLine(pin.into_io(Mode::Output))
    }
}

impl ErrorType for RppalLine {
    type Error = Infallible;
}

impl InputPin for RppalLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.is_low())
    }
}

impl OutputPin for RppalLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high();
        Ok(())
    }
}

impl DataLine for RppalLine {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.0.set_mode(match direction {
            Direction::Output => Mode::Output,
            Direction::Input => Mode::Input,
        });
        Ok(())
    }

    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error> {
        self.0.set_bias(bias(pull));
        Ok(())
    }
}

fn bias(pull: Pull) -> Bias {
    match pull {
        Pull::None => Bias::Off,
        Pull::Up => Bias::PullUp,
        Pull::Down => Bias::PullDown,
    }
}

/// Delays on a Linux host.
///
/// Waits below a millisecond spin on the monotonic clock since the
/// scheduler cannot wake a sleeping thread that precisely.
pub struct HostDelay;

impl HostDelay {
    fn spin(duration: Duration) {
        let deadline = Instant::now() + duration;
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
    }
}

impl DelayNs for HostDelay {
    fn delay_ns(&mut self, ns: u32) {
        Self::spin(Duration::from_nanos(ns.into()));
    }

    fn delay_us(&mut self, us: u32) {
        if us >= 1000 {
            thread::sleep(Duration::from_micros(us.into()));
        } else {
            Self::spin(Duration::from_micros(us.into()));
        }
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms.into()));
    }
}
