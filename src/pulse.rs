//! Pulse width measurement by busy polling.

use embedded_hal::digital::{InputPin, PinState};

/// Default poll bound for a single pulse.
///
/// This is a poll count, not a time. The longest valid pulse (the 80 µs
/// acknowledgement) has to fit, which holds while a GPIO read takes more
/// than about 40 ns. Hosts with faster reads need a larger bound, see
/// [`Config::with_max_cycles`](crate::Config::with_max_cycles).
pub const DEFAULT_MAX_CYCLES: u16 = 2000;

/// Counts how many polls the line stays at `level`.
///
/// Polls back to back with no delay. Returns `Some(cycles)` on the first poll
/// that reads the opposite level, or `None` once `max_cycles` polls have all
/// read `level`. A line that never changes is read exactly `max_cycles`
/// times.
///
/// # Errors
///
/// Returns the pin's error if a read fails.
#[inline]
pub fn await_level<P: InputPin>(
    pin: &mut P,
    level: PinState,
    max_cycles: u16,
) -> Result<Option<u16>, P::Error> {
    let mut cycles: u16 = 0;
    while cycles < max_cycles {
        if PinState::from(pin.is_high()?) != level {
            return Ok(Some(cycles));
        }
        cycles += 1;
    }
    Ok(None)
}
