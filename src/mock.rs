//! Scripted data line for unit tests.
//!
//! Levels come from an `embedded-hal-mock` pin, so every poll is checked
//! against the script. Direction and pull changes are recorded separately.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use embedded_hal_mock::eh1::MockError;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State as PinState, Transaction as PinTx};

use crate::frame::{BITS, PulsePair};
use crate::line::{DataLine, Direction, Pull};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEvent {
    Direction(Direction),
    Pull(Pull),
}

#[derive(Clone)]
pub struct TestLine {
    pin: PinMock,
    events: Rc<RefCell<Vec<LineEvent>>>,
    failing_restore: bool,
}

impl TestLine {
    pub fn new(expectations: &[PinTx]) -> Self {
        Self {
            pin: PinMock::new(expectations),
            events: Rc::new(RefCell::new(Vec::new())),
            failing_restore: false,
        }
    }

    /// Makes disabling the pull resistor fail once the pull-up has been
    /// enabled, so only the acquirer's cleanup sees the error.
    pub fn failing_restore(mut self) -> Self {
        self.failing_restore = true;
        self
    }

    pub fn events(&self) -> Vec<LineEvent> {
        self.events.borrow().clone()
    }

    pub fn done(&mut self) {
        self.pin.done();
    }
}

impl ErrorType for TestLine {
    type Error = <PinMock as ErrorType>::Error;
}

impl InputPin for TestLine {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.pin.is_low()
    }
}

impl OutputPin for TestLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.pin.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.pin.set_high()
    }
}

impl DataLine for TestLine {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error> {
        self.events.borrow_mut().push(LineEvent::Direction(direction));
        Ok(())
    }

    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error> {
        let mut events = self.events.borrow_mut();
        let pulled_up = events.contains(&LineEvent::Pull(Pull::Up));
        events.push(LineEvent::Pull(pull));
        if self.failing_restore && pulled_up && pull == Pull::None {
            return Err(gpio_error());
        }
        Ok(())
    }
}

pub fn gpio_error() -> MockError {
    MockError::Io(std::io::ErrorKind::Other)
}

/// Host side of the wake-up sequence: idle high, start pulse low, release.
pub fn wake_sequence() -> Vec<PinTx> {
    vec![
        PinTx::set(PinState::High),
        PinTx::set(PinState::Low),
        PinTx::set(PinState::High),
    ]
}

/// A pulse held for `width` polls, ended by one poll of the opposite level.
pub fn pulse(level: PinState, width: u16) -> Vec<PinTx> {
    let end = match level {
        PinState::High => PinState::Low,
        PinState::Low => PinState::High,
    };
    let mut polls = vec![PinTx::get(level); width as usize];
    polls.push(PinTx::get(end));
    polls
}

/// Sensor acknowledgement: released line, then the ~80 µs low and high.
pub fn acknowledge() -> Vec<PinTx> {
    let mut polls = pulse(PinState::High, 2);
    polls.extend(pulse(PinState::Low, 8));
    polls.extend(pulse(PinState::High, 8));
    polls
}

/// Low and high pulse widths for one bit. Absolute values vary per bit to
/// show the decoder only compares within a pair.
pub fn bit_pair(bit: bool, index: usize) -> PulsePair {
    let low = 5 + (index % 3) as u16;
    let high = if bit { low + 4 } else { low - 3 };
    PulsePair { low, high }
}

pub fn frame_pairs(bytes: [u8; 5]) -> [PulsePair; BITS] {
    core::array::from_fn(|i| {
        let bit = bytes[i / 8] & (0x80 >> (i % 8)) != 0;
        bit_pair(bit, i)
    })
}

/// Every poll the acquirer makes while reading the 40 data bits.
pub fn transmit(pairs: &[PulsePair]) -> Vec<PinTx> {
    pairs
        .iter()
        .flat_map(|pair| {
            let mut polls = pulse(PinState::Low, pair.low);
            polls.extend(pulse(PinState::High, pair.high));
            polls
        })
        .collect()
}

/// Full line script for one successful attempt that sends `bytes`.
pub fn attempt(bytes: [u8; 5]) -> Vec<PinTx> {
    let mut script = wake_sequence();
    script.extend(acknowledge());
    script.extend(transmit(&frame_pairs(bytes)));
    script
}
