use crate::SnowflakeId;

/// The outcome of a non-blocking generation attempt.
///
/// Returned by `try_poll_id`:
///
/// - [`Poll::Ready`] carries a freshly generated ID.
/// - [`Poll::Pending`] means the sequence for the current millisecond is used
///   up (or, for the lock-free generator, another thread won the race) and the
///   caller should retry after roughly `yield_for` milliseconds. `0` means
///   retry immediately.
///
/// This allows generation loops with their own backoff strategy instead of
/// the busy-wait built into `try_next_id`.
///
/// # Example
///
/// ```
/// use core::time::Duration;
/// use dcflake::{
///     BasicSnowflakeGenerator, ClassicSnowflakeId, Identity, Poll, SnowflakeId, TimeSource,
/// };
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let identity = Identity::<ClassicSnowflakeId>::new(0, 1).unwrap();
/// let generator = BasicSnowflakeGenerator::new(identity, FixedTime).with_epoch(Duration::ZERO);
/// match generator.try_poll_id().unwrap() {
///     Poll::Ready { id } => assert_eq!(id.timestamp(), 1),
///     Poll::Pending { yield_for } => println!("Back off for {yield_for}ms"),
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<ID: SnowflakeId> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: ID,
    },
    /// No ID could be generated right now.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}
