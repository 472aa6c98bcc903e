use core::time::Duration;
use std::sync::Arc;

/// Default generator epoch: Tuesday, March 31, 2020 16:00:00 UTC
/// (April 1, 2020 00:00:00 UTC+8).
///
/// With the 41-bit timestamp of [`ClassicSnowflakeId`] this leaves room until
/// the year 2089.
///
/// [`ClassicSnowflakeId`]: crate::ClassicSnowflakeId
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_585_670_400_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// A trait for time sources that return a wall-clock timestamp.
///
/// This abstraction allows you to plug in a real system clock, a monotonic
/// timer, or a mocked time source in tests.
///
/// The unit is **milliseconds since the Unix epoch**. Generators subtract their
/// own epoch from this value, so a time source never needs to know which
/// layout or epoch it is feeding.
///
/// # Example
///
/// ```
/// use dcflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
