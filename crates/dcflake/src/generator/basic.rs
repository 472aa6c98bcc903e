use core::{cell::Cell, time::Duration};

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

/// A non-concurrent Snowflake ID generator suitable for single-threaded
/// environments.
///
/// This generator is lightweight and fast, but it is not thread-safe: its
/// state lives in a [`Cell`], so it is neither `Sync` nor shareable across
/// threads.
///
/// ```compile_fail
/// use dcflake::{BasicSnowflakeGenerator, ClassicSnowflakeId, SystemClock};
///
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<BasicSnowflakeGenerator<ClassicSnowflakeId, SystemClock>>();
/// ```
///
/// ## Recommended When
/// - You're in a single-threaded environment (no shared access)
/// - You want the fastest generator
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
/// - [`AtomicSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
#[derive(Debug)]
pub struct BasicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    state: Cell<ID>,
    identity: Identity<ID>,
    clock: EpochClock<T>,
}

impl<ID, T> BasicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`BasicSnowflakeGenerator`] for `identity`.
    ///
    /// The first ID starts at sequence zero whatever the clock reads, and the
    /// generator uses [`DEFAULT_EPOCH`] until told otherwise with
    /// [`Self::with_epoch`].
    ///
    /// # Example
    /// ```
    /// use dcflake::{BasicSnowflakeGenerator, ClassicSnowflakeId, Identity, SystemClock};
    ///
    /// let identity = Identity::<ClassicSnowflakeId>::new(1, 2).unwrap();
    /// let generator = BasicSnowflakeGenerator::new(identity, SystemClock);
    /// let id = generator.try_next_id().unwrap();
    /// assert_eq!(id.worker_id(), 2);
    /// ```
    ///
    /// [`DEFAULT_EPOCH`]: crate::DEFAULT_EPOCH
    pub fn new(identity: Identity<ID>, time: T) -> Self {
        log_layout(&identity, "basic");
        Self {
            state: Cell::new(initial_state(&identity)),
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

    /// Bounds the busy-wait of [`Self::try_next_id`]: after `spins` clock
    /// reads that fail to advance, it gives up with
    /// [`Error::ClockStalled`](crate::Error::ClockStalled).
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

    /// Generates the next ID, spinning until the next millisecond when the
    /// current one is exhausted.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   generated ID. The generator state is left untouched.
    /// - [`Error::ClockStalled`] if a spin limit is set and exceeded.
    /// - [`Error::TimestampOutOfRange`] if the clock does not fit the layout.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::ClockStalled`]: crate::Error::ClockStalled
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<ID> {
        let mut now = self.clock.now::<ID>()?;
        loop {
            let current = self.state.get();
            match advance(current, now) {
                Step::Ready(id) => {
                    self.state.set(id);
                    return Ok(id);
                }
                Step::Exhausted => now = self.clock.wait_past::<ID>(current.timestamp())?,
                Step::Behind => return Err(self.clock.regression(now, current.timestamp())),
            }
        }
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Errors
    /// Same as [`Self::try_next_id`], minus the stall: an exhausted sequence
    /// returns [`Poll::Pending`] instead.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        let now = self.clock.now::<ID>()?;
        let current = self.state.get();
        match advance(current, now) {
            Step::Ready(id) => {
                self.state.set(id);
                Ok(Poll::Ready { id })
            }
            Step::Exhausted => Ok(Poll::Pending { yield_for: 1 }),
            Step::Behind => Err(self.clock.regression(now, current.timestamp())),
        }
    }
}

impl<ID> Default for BasicSnowflakeGenerator<ID, SystemClock>
where
    ID: SnowflakeId,
{
    /// A generator over the system clock with a discovered identity.
    fn default() -> Self {
        Self::new(Identity::discover(), SystemClock)
    }
}

impl<ID, T> SnowflakeGenerator<ID, T> for BasicSnowflakeGenerator<ID, T>
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
