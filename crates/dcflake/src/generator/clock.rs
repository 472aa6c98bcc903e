use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::error;

use crate::{
    error::{Error, Result},
    id::SnowflakeId,
    identity::Identity,
    time::{DEFAULT_EPOCH, TimeSource},
};

/// A [`TimeSource`] viewed through a generator's epoch.
///
/// Converts Unix milliseconds into layout timestamps and owns the busy-wait
/// used when a millisecond's sequence space is exhausted.
#[derive(Debug, Clone)]
pub(crate) struct EpochClock<T> {
    time: T,
    epoch: u64,
    spin_limit: Option<u32>,
}

impl<T: TimeSource> EpochClock<T> {
    pub(crate) fn new(time: T) -> Self {
        Self {
            time,
            epoch: DEFAULT_EPOCH.as_millis() as u64,
            spin_limit: None,
        }
    }

    pub(crate) fn set_epoch(&mut self, epoch: Duration) {
        self.epoch = epoch.as_millis() as u64;
    }

    pub(crate) fn set_spin_limit(&mut self, spins: u32) {
        self.spin_limit = Some(spins);
    }

    pub(crate) fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch)
    }

    /// Reads the clock as a layout timestamp.
    pub(crate) fn now<ID: SnowflakeId>(&self) -> Result<u64> {
        let millis = self.time.current_millis();
        match millis.checked_sub(self.epoch) {
            Some(ts) if ts <= ID::max_timestamp() => Ok(ts),
            _ => Err(Self::out_of_range(millis)),
        }
    }

    /// Spins until the clock reads strictly later than `last`.
    ///
    /// Readings at or before `last` (including earlier ones) keep the loop
    /// going. Only the spin limit, if set, ends it early.
    pub(crate) fn wait_past<ID: SnowflakeId>(&self, last: u64) -> Result<u64> {
        let mut spins: u32 = 0;
        loop {
            let now = self.now::<ID>()?;
            if now > last {
                return Ok(now);
            }
            spins = spins.saturating_add(1);
            if self.spin_limit.is_some_and(|limit| spins > limit) {
                return Err(self.stalled(last, spins));
            }
            core::hint::spin_loop();
        }
    }

    /// Builds the error for a clock that went backwards, in Unix milliseconds.
    #[cold]
    #[inline(never)]
    pub(crate) fn regression(&self, now: u64, last: u64) -> Error {
        let now = now + self.epoch;
        let last = last + self.epoch;
        #[cfg(feature = "tracing")]
        error!(now, last, behind_ms = last - now, "clock moved backwards, refusing to generate ids");
        Error::ClockRegression { now, last }
    }

    #[cold]
    #[inline(never)]
    fn stalled(&self, last: u64, spins: u32) -> Error {
        let last = last + self.epoch;
        #[cfg(feature = "tracing")]
        error!(last, spins, "clock did not advance before the spin limit");
        Error::ClockStalled { last, spins }
    }

    #[cold]
    #[inline(never)]
    fn out_of_range(millis: u64) -> Error {
        #[cfg(feature = "tracing")]
        error!(millis, "clock reading does not fit the id layout");
        Error::TimestampOutOfRange { millis }
    }
}

/// What a generator should do next, given its last ID and the current
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step<ID> {
    /// Commit and return this ID.
    Ready(ID),
    /// The current millisecond has no sequence room left.
    Exhausted,
    /// The clock reads earlier than the last ID.
    Behind,
}

/// State of a generator that has not issued anything yet.
///
/// This is the last ID of the last representable millisecond, so any reading
/// below it starts a fresh sequence at zero. A reading equal to it is treated
/// as exhausted, which is also what a generator that really got there needs.
pub(crate) fn initial_state<ID: SnowflakeId>(identity: &Identity<ID>) -> ID {
    ID::from_components(
        ID::max_timestamp(),
        identity.datacenter_id(),
        identity.worker_id(),
        ID::max_sequence(),
    )
}

/// The core Snowflake transition shared by every generator.
#[inline]
pub(crate) fn advance<ID: SnowflakeId>(current: ID, now: u64) -> Step<ID> {
    let last = current.timestamp();
    match now.cmp(&last) {
        core::cmp::Ordering::Greater => Step::Ready(current.rollover_to_timestamp(now)),
        core::cmp::Ordering::Equal if current.has_sequence_room() => {
            Step::Ready(current.increment_sequence())
        }
        core::cmp::Ordering::Equal => Step::Exhausted,
        core::cmp::Ordering::Less if is_initial(current) => {
            Step::Ready(current.rollover_to_timestamp(now))
        }
        core::cmp::Ordering::Less => Step::Behind,
    }
}

#[inline]
fn is_initial<ID: SnowflakeId>(current: ID) -> bool {
    current.timestamp() == ID::max_timestamp() && current.sequence() == ID::max_sequence()
}
