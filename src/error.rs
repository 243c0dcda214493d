use core::fmt;

/// Acknowledgement pulse that failed to arrive in time.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// The sensor never pulled the line low, or held it low too long.
    StartLow,
    /// The sensor held the line high after its low acknowledgement too long.
    StartHigh,
}

/// Why a single acquisition attempt was discarded.
///
/// These are protocol failures. A [`ReadingSession`](crate::ReadingSession)
/// retries on any of them.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadFault {
    /// An expected transition never occurred within the cycle bound.
    LineTimeout(Stage),
    /// A bit's low or high pulse could not be measured.
    CorruptPulse {
        /// Bit position in arrival order, `0..40`.
        bit: u8,
    },
    /// All pulses were measured but the checksum byte disagrees.
    ChecksumMismatch {
        /// Low byte of the sum of the four data bytes.
        computed: u8,
        /// Checksum byte sent by the sensor.
        received: u8,
    },
}

/// Possible errors from the DHT22 reader.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// A single attempt failed.
    Fault(ReadFault),
    /// Every attempt of a reading session failed.
    AttemptsExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Failure of the final attempt.
        last: ReadFault,
    },
    /// Error from the GPIO line (input/output, direction or pull).
    GpioFault(E),
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::GpioFault(value)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::StartLow => f.write_str("start_low"),
            Stage::StartHigh => f.write_str("start_high"),
        }
    }
}

impl fmt::Display for ReadFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadFault::LineTimeout(stage) => write!(f, "line timeout at {stage}"),
            ReadFault::CorruptPulse { bit } => write!(f, "unmeasurable pulse at bit {bit}"),
            ReadFault::ChecksumMismatch { computed, received } => write!(
                f,
                "checksum mismatch: computed {computed:#04x}, received {received:#04x}"
            ),
        }
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhtError::Fault(fault) => fault.fmt(f),
            DhtError::AttemptsExhausted { attempts, last } => {
                write!(f, "no valid reading after {attempts} attempts, last: {last}")
            }
            DhtError::GpioFault(e) => write!(f, "gpio fault: {e:?}"),
        }
    }
}

impl core::error::Error for ReadFault {}

impl<E: fmt::Debug> core::error::Error for DhtError<E> {}
