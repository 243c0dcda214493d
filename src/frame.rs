//! Frame types and the pulse-pair decoder.
//!
//! The sensor sends 40 bits. Each bit is a low pulse followed by a high
//! pulse; a high pulse longer than its low pulse is a `1`. Comparing the two
//! halves of a pair, instead of testing the high pulse against a fixed
//! threshold, tolerates clock drift and polling overhead.

use crate::error::ReadFault;

/// Bits in one sensor frame.
pub const BITS: usize = 40;

/// Bytes in one sensor frame, checksum included.
pub const BYTES: usize = BITS / 8;

/// Low and high pulse widths of one bit, in poll cycles.
///
/// A width of `0` marks a pulse that timed out or was missed.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PulsePair {
    pub low: u16,
    pub high: u16,
}

impl PulsePair {
    /// Bit value encoded by this pair, or `None` if either pulse is missing.
    pub fn bit(&self) -> Option<bool> {
        if self.low == 0 || self.high == 0 {
            None
        } else {
            Some(self.high > self.low)
        }
    }
}

/// Pulse widths of one acquisition, in arrival order.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawFrame {
    pairs: [PulsePair; BITS],
}

impl RawFrame {
    pub fn from_pairs(pairs: [PulsePair; BITS]) -> Self {
        RawFrame { pairs }
    }

    /// Pulse pair of bit `index`, `None` past the end of the frame.
    pub fn pair(&self, index: usize) -> Option<PulsePair> {
        self.pairs.get(index).copied()
    }

    pub fn pairs(&self) -> &[PulsePair; BITS] {
        &self.pairs
    }

    /// All 80 samples, alternating low and high.
    pub fn samples(&self) -> impl Iterator<Item = u16> + '_ {
        self.pairs.iter().flat_map(|pair| [pair.low, pair.high])
    }
}

/// A frame whose checksum has been verified.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedFrame {
    bytes: [u8; BYTES],
}

/// Reading returned by the DHT22 sensor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Relative humidity in percent.
    pub humidity: f32,
    /// Temperature in degrees Celsius.
    pub temperature: f32,
}

/// Low byte of the sum of the four data bytes.
pub fn checksum(data: [u8; 4]) -> u8 {
    data.iter().fold(0u8, |sum, v| sum.wrapping_add(*v))
}

impl DecodedFrame {
    /// Validates five received bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ReadFault::ChecksumMismatch`] if the last byte is not the
    /// checksum of the first four.
    pub fn from_bytes(bytes: [u8; BYTES]) -> Result<Self, ReadFault> {
        let [hum_hi, hum_lo, temp_hi, temp_lo, received] = bytes;
        let computed = checksum([hum_hi, hum_lo, temp_hi, temp_lo]);
        if computed != received {
            return Err(ReadFault::ChecksumMismatch { computed, received });
        }
        Ok(DecodedFrame { bytes })
    }

    pub fn bytes(&self) -> [u8; BYTES] {
        self.bytes
    }

    pub fn humidity_high(&self) -> u8 {
        self.bytes[0]
    }

    pub fn humidity_low(&self) -> u8 {
        self.bytes[1]
    }

    pub fn temp_high(&self) -> u8 {
        self.bytes[2]
    }

    pub fn temp_low(&self) -> u8 {
        self.bytes[3]
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[4]
    }

    /// Converts the data bytes into physical units.
    pub fn reading(&self) -> Reading {
        let joined_humidity = u16::from_be_bytes([self.humidity_high(), self.humidity_low()]);
        let humidity = joined_humidity as f32 / 10.0;

        let is_temp_negative = (self.temp_high() >> 7) != 0;
        let temp_hi = self.temp_high() & 0b0111_1111;
        let joined_temp = u16::from_be_bytes([temp_hi, self.temp_low()]);
        let mut temperature = joined_temp as f32 / 10.0;
        if is_temp_negative {
            temperature = -temperature;
        }

        Reading {
            humidity,
            temperature,
        }
    }
}

/// Turns the pulse widths of one acquisition into a validated frame.
///
/// # Errors
///
/// * [`ReadFault::CorruptPulse`] for the first bit with a zero width.
/// * [`ReadFault::ChecksumMismatch`] if every bit decoded but the sum is off.
pub fn decode(raw: &RawFrame) -> Result<DecodedFrame, ReadFault> {
    let mut bytes = [0u8; BYTES];

    for (index, pair) in raw.pairs().iter().enumerate() {
        let bit = pair.bit().ok_or(ReadFault::CorruptPulse { bit: index as u8 })?;
        let byte = &mut bytes[index / 8];
        *byte = (*byte << 1) | u8::from(bit);
    }

    DecodedFrame::from_bytes(bytes)
}
