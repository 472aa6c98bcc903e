use core::fmt;

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// The identity component that failed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Datacenter,
    Worker,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Datacenter => f.write_str("datacenter"),
            Self::Worker => f.write_str("worker"),
        }
    }
}

/// All error variants that `dcflake` can emit.
///
/// None of these are retried internally. A generator that returned
/// [`Error::ClockRegression`] keeps its last state, so every later call fails
/// the same way until the clock catches up again.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An identity component does not fit in its bit field.
    #[error("{field} id {value} is out of range (expected 0..={max})")]
    OutOfRange { field: Field, value: u64, max: u64 },

    /// The clock reported a time earlier than the last generated ID.
    ///
    /// Both values are milliseconds since the Unix epoch.
    #[error("clock moved backwards: now {now}ms, last generated at {last}ms")]
    ClockRegression { now: u64, last: u64 },

    /// The sequence for `last` was exhausted and the clock failed to advance
    /// within the configured spin limit.
    #[error("clock did not advance past {last}ms after {spins} spins")]
    ClockStalled { last: u64, spins: u32 },

    /// The clock reading cannot be represented in the layout's timestamp
    /// field: it is either before the generator epoch or too far past it.
    #[error("timestamp {millis}ms is outside the range of the id layout")]
    TimestampOutOfRange { millis: u64 },

    /// The generator lock was poisoned by a panicking thread.
    ///
    /// `parking_lot` mutexes do not poison, so this variant is not available
    /// with the `parking-lot` feature.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};

#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
