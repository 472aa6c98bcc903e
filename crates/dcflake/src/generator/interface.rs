use crate::{
    error::Result,
    generator::Poll,
    id::SnowflakeId,
    identity::Identity,
    time::TimeSource,
};

/// A minimal interface for generating Snowflake IDs.
pub trait SnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new generator for `identity`, reading time from `time`.
    fn new(identity: Identity<ID>, time: T) -> Self;

    /// Returns the identity embedded in every generated ID.
    fn identity(&self) -> Identity<ID>;

    /// Generates the next ID, busy-waiting for the next millisecond if the
    /// current one is exhausted.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock is behind the last generated
    ///   ID.
    /// - [`Error::ClockStalled`] if a spin limit is configured and the clock
    ///   did not advance in time.
    /// - [`Error::TimestampOutOfRange`] if the clock cannot be represented in
    ///   the layout.
    /// - [`Error::LockPoisoned`] for a poisoned std mutex.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::ClockStalled`]: crate::Error::ClockStalled
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    /// [`Error::LockPoisoned`]: crate::Error
    fn try_next_id(&self) -> Result<ID>;

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Errors
    ///
    /// Same as [`SnowflakeGenerator::try_next_id`], except that an exhausted
    /// sequence yields [`Poll::Pending`] instead of waiting.
    fn try_poll_id(&self) -> Result<Poll<ID>>;
}
