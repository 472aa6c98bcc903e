use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::Result,
    generator::{
        EpochClock, Mutex, Poll, SnowflakeGenerator, Step, advance, initial_state, log_layout,
    },
    id::SnowflakeId,
    identity::Identity,
    time::{SystemClock, TimeSource},
};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// This generator wraps the last issued ID in a [`Mutex`] behind an [`Arc`].
/// The clock is read while the lock is held, so the timestamp a caller
/// compares against is always the one committed by the previous holder.
///
/// Clones share the state together with the epoch and spin limit, and may be
/// handed to other threads freely. Configure the generator before cloning it:
/// once a clone exists, [`Self::with_epoch`] and [`Self::with_spin_limit`]
/// leave the shared configuration as it is.
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access across threads is important
///
/// ## See Also
/// - [`BasicSnowflakeGenerator`]
/// - [`AtomicSnowflakeGenerator`]
///
/// [`BasicSnowflakeGenerator`]: crate::BasicSnowflakeGenerator
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
#[derive(Debug)]
pub struct LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    shared: Arc<Shared<ID, T>>,
    identity: Identity<ID>,
}

/// Everything a clone of [`LockSnowflakeGenerator`] has in common.
#[derive(Debug)]
struct Shared<ID, T> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<ID>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<ID>,
    clock: EpochClock<T>,
}

impl<ID, T> LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for `identity`.
    ///
    /// # Example
    /// ```
    /// use std::thread;
    /// use dcflake::{ClassicSnowflakeId, Identity, LockSnowflakeGenerator, SystemClock};
    ///
    /// let identity = Identity::<ClassicSnowflakeId>::new(1, 2).unwrap();
    /// let generator = LockSnowflakeGenerator::new(identity, SystemClock);
    ///
    /// let handle = {
    ///     let generator = generator.clone();
    ///     thread::spawn(move || generator.try_next_id().unwrap())
    /// };
    /// let ours = generator.try_next_id().unwrap();
    /// let theirs = handle.join().unwrap();
    /// assert_ne!(ours, theirs);
    /// ```
    pub fn new(identity: Identity<ID>, time: T) -> Self {
        log_layout(&identity, "lock");
        let id = initial_state(&identity);
        Self {
            shared: Arc::new(Shared {
                #[cfg(feature = "cache-padded")]
                state: crossbeam_utils::CachePadded::new(Mutex::new(id)),
                #[cfg(not(feature = "cache-padded"))]
                state: Mutex::new(id),
                clock: EpochClock::new(time),
            }),
            identity,
        }
    }

    /// Sets the instant that timestamp zero refers to, as a duration since
    /// the Unix epoch.
    ///
    /// Has no effect on a generator that has already been cloned.
    #[must_use]
    pub fn with_epoch(mut self, epoch: Duration) -> Self {
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.clock.set_epoch(epoch),
            None => Self::already_shared("epoch"),
        }
        self
    }

    /// Bounds the busy-wait of [`Self::try_next_id`].
    ///
    /// Has no effect on a generator that has already been cloned.
    #[must_use]
    pub fn with_spin_limit(mut self, spins: u32) -> Self {
        match Arc::get_mut(&mut self.shared) {
            Some(shared) => shared.clock.set_spin_limit(spins),
            None => Self::already_shared("spin limit"),
        }
        self
    }

    #[cold]
    #[inline(never)]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn already_shared(setting: &'static str) {
        #[cfg(feature = "tracing")]
        tracing::warn!(setting, "generator is already cloned, keeping its configuration");
    }

    /// Returns the identity embedded in every generated ID.
    pub fn identity(&self) -> Identity<ID> {
        self.identity
    }

    /// Returns the configured epoch.
    pub fn epoch(&self) -> Duration {
        self.shared.clock.epoch()
    }

    /// Generates the next ID, spinning until the next millisecond when the
    /// current one is exhausted.
    ///
    /// The spin happens with the lock held, so other callers queue behind it
    /// and resume in the new millisecond.
    ///
    /// # Errors
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   generated ID.
    /// - [`Error::ClockStalled`] if a spin limit is set and exceeded.
    /// - [`Error::TimestampOutOfRange`] if the clock does not fit the layout.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only).
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::ClockStalled`]: crate::Error::ClockStalled
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    /// [`Error::LockPoisoned`]: crate::Error
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<ID> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.shared.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.shared.state.lock()?
            }
        };

        let clock = &self.shared.clock;
        let mut now = clock.now::<ID>()?;
        loop {
            match advance(*state, now) {
                Step::Ready(id) => {
                    *state = id;
                    return Ok(id);
                }
                Step::Exhausted => now = clock.wait_past::<ID>(state.timestamp())?,
                Step::Behind => return Err(clock.regression(now, state.timestamp())),
            }
        }
    }

    /// Attempts to generate the next ID without blocking on an exhausted
    /// sequence.
    ///
    /// # Errors
    /// Same as [`Self::try_next_id`], except that exhaustion yields
    /// [`Poll::Pending`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.shared.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.shared.state.lock()?
            }
        };

        let clock = &self.shared.clock;
        let now = clock.now::<ID>()?;
        match advance(*state, now) {
            Step::Ready(id) => {
                *state = id;
                Ok(Poll::Ready { id })
            }
            Step::Exhausted => Ok(Poll::Pending { yield_for: 1 }),
            Step::Behind => Err(clock.regression(now, state.timestamp())),
        }
    }
}

impl<ID, T> Clone for LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            identity: self.identity,
        }
    }
}

impl<ID> Default for LockSnowflakeGenerator<ID, SystemClock>
where
    ID: SnowflakeId,
{
    /// A generator over the system clock with a discovered identity.
    fn default() -> Self {
        Self::new(Identity::discover(), SystemClock)
    }
}

impl<ID, T> SnowflakeGenerator<ID, T> for LockSnowflakeGenerator<ID, T>
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
