use core::time::Duration;

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{
        EpochClock, Poll, SnowflakeGenerator, Step, advance, initial_state, log_layout,
    },
    id::SnowflakeId,
    identity::Identity,
    time::{SystemClock, TimeSource},
};

/// A lock-free Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// This generator stores the last issued ID in an [`AtomicU64`] and commits
/// each new one with a compare-and-swap. The state is loaded before the clock
/// is read, so a reading that lags the state can only come from a clock that
/// truly went backwards, never from another thread racing ahead.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - You want the highest throughput under contention
/// - Fairness between threads is not a concern
///
/// ## See Also
/// - [`BasicSnowflakeGenerator`]
/// - [`LockSnowflakeGenerator`]
///
/// [`BasicSnowflakeGenerator`]: crate::BasicSnowflakeGenerator
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
#[derive(Debug)]
pub struct AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    identity: Identity<ID>,
    clock: EpochClock<T>,
}

impl<ID, T> AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] for `identity`.
    ///
    /// # Example
    /// ```
    /// use std::{sync::Arc, thread};
    /// use dcflake::{AtomicSnowflakeGenerator, ClassicSnowflakeId, Identity, MonotonicClock};
    ///
    /// let identity = Identity::<ClassicSnowflakeId>::new(0, 7).unwrap();
    /// let generator = Arc::new(AtomicSnowflakeGenerator::new(identity, MonotonicClock::new()));
    ///
    /// let workers: Vec<_> = (0..4)
    ///     .map(|_| {
    ///         let generator = Arc::clone(&generator);
    ///         thread::spawn(move || generator.try_next_id().unwrap())
    ///     })
    ///     .collect();
    ///
    /// for worker in workers {
    ///     assert_eq!(worker.join().unwrap().worker_id(), 7);
    /// }
    /// ```
    pub fn new(identity: Identity<ID>, time: T) -> Self {
        log_layout(&identity, "atomic");
        let raw = initial_state(&identity).to_raw();
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(raw)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(raw),
            identity,
            clock: EpochClock::new(time),
        }
    }

    /// Sets the instant that timestamp zero refers to, as a duration since
    /// the Unix epoch.
    #[must_use]
    pub fn with_epoch(mut self, epoch: Duration) -> Self {
        self.clock.set_epoch(epoch);
        self
    }

    /// Bounds the busy-wait of [`Self::try_next_id`].
    #[must_use]
    pub fn with_spin_limit(mut self, spins: u32) -> Self {
        self.clock.set_spin_limit(spins);
        self
    }

    /// Returns the identity embedded in every generated ID.
    pub fn identity(&self) -> Identity<ID> {
        self.identity
    }

    /// Returns the configured epoch.
    pub fn epoch(&self) -> Duration {
        self.clock.epoch()
    }

    /// Generates the next ID, retrying lost races and spinning past an
    /// exhausted millisecond.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   generated ID.
    /// - [`Error::ClockStalled`] if a spin limit is set and exceeded.
    /// - [`Error::TimestampOutOfRange`] if the clock does not fit the layout.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::ClockStalled`]: crate::Error::ClockStalled
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<ID> {
        loop {
            let raw = self.state.load(Ordering::Acquire);
            let current = ID::from_raw(raw);
            let now = self.clock.now::<ID>()?;

            let next = match advance(current, now) {
                Step::Ready(id) => id,
                Step::Exhausted => {
                    self.clock.wait_past::<ID>(current.timestamp())?;
                    continue;
                }
                Step::Behind => return Err(self.clock.regression(now, current.timestamp())),
            };

            if self
                .state
                .compare_exchange_weak(raw, next.to_raw(), Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Ok(next);
            }
            core::hint::spin_loop();
        }
    }

    /// Attempts to generate the next ID in a single compare-and-swap.
    ///
    /// Returns [`Poll::Pending`] with `yield_for: 0` when another thread won
    /// the race, and `yield_for: 1` when the millisecond is exhausted.
    ///
    /// # Errors
    /// Same as [`Self::try_next_id`], minus the stall.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        let raw = self.state.load(Ordering::Acquire);
        let current = ID::from_raw(raw);
        let now = self.clock.now::<ID>()?;

        let next = match advance(current, now) {
            Step::Ready(id) => id,
            Step::Exhausted => return Ok(Poll::Pending { yield_for: 1 }),
            Step::Behind => return Err(self.clock.regression(now, current.timestamp())),
        };

        if self
            .state
            .compare_exchange(raw, next.to_raw(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(Poll::Ready { id: next })
        } else {
            Ok(Poll::Pending { yield_for: 0 })
        }
    }
}

impl<ID> Default for AtomicSnowflakeGenerator<ID, SystemClock>
where
    ID: SnowflakeId,
{
    /// A generator over the system clock with a discovered identity.
    fn default() -> Self {
        Self::new(Identity::discover(), SystemClock)
    }
}

impl<ID, T> SnowflakeGenerator<ID, T> for AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    fn new(identity: Identity<ID>, time: T) -> Self {
        Self::new(identity, time)
    }

    fn identity(&self) -> Identity<ID> {
        self.identity()
    }

    fn try_next_id(&self) -> Result<ID> {
        self.try_next_id()
    }

    fn try_poll_id(&self) -> Result<Poll<ID>> {
        self.try_poll_id()
    }
}
