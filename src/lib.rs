//! DHT22 Sensor Reader for Embedded Rust
//!
//! This crate reads the DHT22 (AM2302) temperature and humidity sensor by
//! bit-banging its single data line through [`embedded-hal`] traits.
//!
//! Every bit is timed as a pair of pulses, low then high, counted in tight
//! polling loops with a fixed upper bound. A bit is `1` when its high pulse
//! outlasts its low pulse. The 40 bits are packed into five bytes and
//! accepted only if the checksum matches. A [`ReadingSession`] retries a
//! bounded number of times with a cooldown between attempts.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt` or `log`
//! - `cli`: the `dht22-read` Raspberry Pi command-line tool
//!
//! # Dependencies
//! This reader depends on the following `embedded-hal` traits:
//! - [`InputPin`] and [`OutputPin`], extended by [`DataLine`] with direction
//!   and pull-resistor control
//! - [`DelayNs`] for the wake-up sequence and cooldowns
//!
//! # Example
//! ```ignore
//! let config = Config::default().with_attempts(10);
//! let mut dht = Dht22::with_config(line, delay, config);
//! let reading = dht.read()?;
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod dht22;
pub mod error;
pub mod frame;
pub mod line;
pub mod pulse;
pub mod session;

#[cfg(test)]
mod mock;

pub use dht22::{Config, Dht22};
pub use error::{DhtError, ReadFault, Stage};
pub use frame::{DecodedFrame, PulsePair, RawFrame, Reading, decode};
pub use line::{DataLine, Direction, Pull};
pub use pulse::await_level;
pub use session::{Acquirer, ReadingSession, SessionState};
