use embedded_hal::{delay::DelayNs, digital::PinState};

use crate::error::{DhtError, ReadFault, Stage};
use crate::frame::{self, BITS, PulsePair, RawFrame, Reading};
use crate::line::{DataLine, Direction, Pull};
use crate::pulse::{DEFAULT_MAX_CYCLES, await_level};
use crate::session::{Acquirer, ReadingSession};

pub use crate::session::MIN_COOLDOWN_MS;

/// Time the line idles high before the start pulse (must be at least 40 ms).
const WAKE_IDLE_MS: u32 = 500;

/// Length of the host's start pulse (sensor accepts 10 to 18 ms).
const START_LOW_MS: u32 = 10;

/// Settle time after switching to input, so the release edge is not sampled.
const SETTLE_US: u32 = 10;

/// Default wait between attempts.
pub const DEFAULT_COOLDOWN_MS: u32 = 3000;

/// Default attempt budget of [`Dht22::read`].
pub const DEFAULT_ATTEMPTS: u32 = 5;

/// Reader settings.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    attempts: u32,
    cooldown_ms: u32,
    max_cycles: u16,
}

impl Config {
    /// Maximum attempts per [`Dht22::read`]. Values below 1 become 1.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Wait between attempts. Values below [`MIN_COOLDOWN_MS`] are raised.
    pub fn with_cooldown_ms(mut self, cooldown_ms: u32) -> Self {
        self.cooldown_ms = cooldown_ms.max(MIN_COOLDOWN_MS);
        self
    }

    /// Poll bound for a single pulse. Values below 1 become 1.
    pub fn with_max_cycles(mut self, max_cycles: u16) -> Self {
        self.max_cycles = max_cycles.max(1);
        self
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn cooldown_ms(&self) -> u32 {
        self.cooldown_ms
    }

    pub fn max_cycles(&self) -> u16 {
        self.max_cycles
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            attempts: DEFAULT_ATTEMPTS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }
}

/// Reader for the DHT22 temperature and humidity sensor.
pub struct Dht22<PIN, D> {
    pin: PIN,
    delay: D,
    config: Config,
}

impl<PIN, DELAY> Dht22<PIN, DELAY>
where
    PIN: DataLine,
    DELAY: DelayNs,
{
    /// Creates a reader with the default [`Config`].
    ///
    /// # Arguments
    ///
    /// * `pin` - The GPIO line connected to the DHT22 data pin.
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    pub fn new(pin: PIN, delay: DELAY) -> Self {
        Self::with_config(pin, delay, Config::default())
    }

    pub fn with_config(pin: PIN, delay: DELAY, config: Config) -> Self {
        Dht22 { pin, delay, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reads a measurement, retrying up to the configured number of attempts.
    ///
    /// # Returns
    ///
    /// * `Ok(Reading)` from the first attempt with a valid checksum.
    /// * `Err(DhtError::AttemptsExhausted)` if every attempt failed.
    /// * `Err(DhtError::GpioFault)` if the line reported an error.
    pub fn read(&mut self) -> Result<Reading, DhtError<PIN::Error>> {
        ReadingSession::new(self.config.attempts, self.config.cooldown_ms).run(self)
    }

    /// Makes exactly one attempt: wake the sensor, collect a frame, decode it.
    pub fn read_once(&mut self) -> Result<Reading, DhtError<PIN::Error>> {
        let raw = self.acquire()?;
        match frame::decode(&raw) {
            Ok(decoded) => Ok(decoded.reading()),
            Err(fault) => {
                trace!("rejected frame: {:?}", raw.pairs());
                Err(DhtError::Fault(fault))
            }
        }
    }

    /// Wakes the sensor and records the pulse widths of one frame.
    ///
    /// The pull resistor is disabled again before returning, whatever the
    /// outcome.
    pub fn acquire(&mut self) -> Result<RawFrame, DhtError<PIN::Error>> {
        let raw = self.start().and_then(|()| self.listen());
        let restored = self.pin.set_pull(Pull::None);
        let raw = raw?;
        restored?;
        Ok(raw)
    }

    /// Sends the start signal and switches to listening.
    fn start(&mut self) -> Result<(), DhtError<PIN::Error>> {
        self.pin.set_direction(Direction::Output)?;
        self.pin.set_pull(Pull::None)?;
        self.pin.set_high()?;
        self.delay.delay_ms(WAKE_IDLE_MS);

        // MCU sends start request
        self.pin.set_low()?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high()?;

        self.pin.set_direction(Direction::Input)?;
        self.pin.set_pull(Pull::Up)?;
        self.delay.delay_us(SETTLE_US);
        Ok(())
    }

    /// Waits for the acknowledgement, then times all 40 bits.
    fn listen(&mut self) -> Result<RawFrame, DhtError<PIN::Error>> {
        // Released line until the sensor answers, then ~80us low, ~80us high
        self.expect(PinState::High, Stage::StartLow)?;
        self.expect(PinState::Low, Stage::StartLow)?;
        self.expect(PinState::High, Stage::StartHigh)?;

        // A missed pulse is kept as zero and rejected by the decoder.
        let mut pairs = [PulsePair::default(); BITS];
        for pair in pairs.iter_mut() {
            pair.low = self.measure(PinState::Low)?.unwrap_or(0);
            pair.high = self.measure(PinState::High)?.unwrap_or(0);
        }
        Ok(RawFrame::from_pairs(pairs))
    }

    fn expect(&mut self, level: PinState, stage: Stage) -> Result<u16, DhtError<PIN::Error>> {
        self.measure(level)?.ok_or_else(|| {
            debug!("no transition at {:?}", stage);
            DhtError::Fault(ReadFault::LineTimeout(stage))
        })
    }

    fn measure(&mut self, level: PinState) -> Result<Option<u16>, PIN::Error> {
        await_level(&mut self.pin, level, self.config.max_cycles)
    }
}

impl<PIN, DELAY> Acquirer for Dht22<PIN, DELAY>
where
    PIN: DataLine,
    DELAY: DelayNs,
{
    type Error = PIN::Error;

    fn attempt(&mut self) -> Result<Reading, DhtError<Self::Error>> {
        self.read_once()
    }

    fn cool_down(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
