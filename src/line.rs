//! The single data line shared by host and sensor.
//!
//! `embedded-hal` has no trait for reconfiguring a pin at runtime, so
//! [`DataLine`] adds direction and pull control on top of [`InputPin`] and
//! [`OutputPin`]. Levels are always read through [`InputPin`], which can only
//! report high or low.

use embedded_hal::digital::{InputPin, OutputPin};

/// Whether the host drives the line or listens on it.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Output,
    Input,
}

/// Internal bias resistor setting.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pull {
    None,
    Up,
    Down,
}

/// A GPIO line that can be switched between driving and listening.
///
/// Implementations wrap whatever the platform offers (a register-level pin,
/// `rppal::gpio::IoPin`, ...). Errors are reported through the same
/// [`ErrorType`](embedded_hal::digital::ErrorType) as reads and writes.
pub trait DataLine: InputPin + OutputPin {
    /// Switches the line to output (host drives) or input (host listens).
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;

    /// Enables or disables the internal pull resistor.
    fn set_pull(&mut self, pull: Pull) -> Result<(), Self::Error>;
}
