//! Best-of-N reading sessions.
//!
//! Bit-banged single-wire reads get lost to scheduling jitter, so a session
//! retries a bounded number of times with a cooldown in between. It promises
//! the first valid reading within the budget, not eventual success.

use crate::error::{DhtError, ReadFault};
use crate::frame::Reading;

/// The sensor cannot be queried faster than its internal sampling rate.
pub const MIN_COOLDOWN_MS: u32 = 2000;

/// Something that can make one complete read attempt.
pub trait Acquirer {
    /// Error of the underlying GPIO line.
    type Error;

    /// Wakes the sensor, collects one frame and decodes it.
    fn attempt(&mut self) -> Result<Reading, DhtError<Self::Error>>;

    /// Waits before the next attempt.
    fn cool_down(&mut self, ms: u32);
}

/// Where a session currently is.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Attempt number `attempt` (1-based) is in flight.
    Attempting { attempt: u32 },
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32, last: ReadFault },
    /// The line itself failed; no further attempts were made.
    Aborted { attempts: u32 },
}

/// Retries an [`Acquirer`] until one attempt yields a valid reading.
#[derive(Debug)]
pub struct ReadingSession {
    budget: u32,
    cooldown_ms: u32,
    state: SessionState,
}

impl ReadingSession {
    /// Creates an idle session. A budget of `0` is treated as `1` and the
    /// cooldown is at least [`MIN_COOLDOWN_MS`].
    pub fn new(budget: u32, cooldown_ms: u32) -> Self {
        ReadingSession {
            budget: budget.max(1),
            cooldown_ms: cooldown_ms.max(MIN_COOLDOWN_MS),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Runs attempts until one succeeds or the budget is spent.
    ///
    /// The acquirer cools down between attempts, never after the last one.
    /// Running a session again after it finished starts a fresh budget.
    ///
    /// # Errors
    ///
    /// * [`DhtError::AttemptsExhausted`] carrying the last attempt's fault.
    /// * [`DhtError::GpioFault`] as soon as the line reports an error.
    pub fn run<A: Acquirer>(&mut self, acquirer: &mut A) -> Result<Reading, DhtError<A::Error>> {
        let mut attempt = 1;
        loop {
            self.state = SessionState::Attempting { attempt };

            let fault = match acquirer.attempt() {
                Ok(reading) => {
                    debug!("valid reading on attempt {}", attempt);
                    self.state = SessionState::Succeeded { attempts: attempt };
                    return Ok(reading);
                }
                Err(DhtError::Fault(fault)) => fault,
                Err(DhtError::AttemptsExhausted { last, .. }) => last,
                Err(DhtError::GpioFault(e)) => {
                    self.state = SessionState::Aborted { attempts: attempt };
                    return Err(DhtError::GpioFault(e));
                }
            };

            debug!("attempt {} of {} failed: {:?}", attempt, self.budget, fault);

            if attempt >= self.budget {
                warn!("giving up after {} attempts", attempt);
                self.state = SessionState::Exhausted {
                    attempts: attempt,
                    last: fault,
                };
                return Err(DhtError::AttemptsExhausted {
                    attempts: attempt,
                    last: fault,
                });
            }

            acquirer.cool_down(self.cooldown_ms);
            attempt += 1;
        }
    }
}
