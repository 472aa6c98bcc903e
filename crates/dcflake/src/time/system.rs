use std::time::{SystemTime, UNIX_EPOCH};

use crate::TimeSource;

/// A time source that reads the system wall clock on every call.
///
/// The wall clock can be stepped backwards (NTP corrections, manual changes).
/// Generators detect that and fail with [`Error::ClockRegression`] rather than
/// risk duplicate IDs. Prefer [`MonotonicClock`] for long-running processes.
///
/// A system time before the Unix epoch is reported as `0`.
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
/// [`MonotonicClock`]: crate::MonotonicClock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_a_time_after_the_default_epoch() {
        let now = SystemClock.current_millis();
        assert!(now > crate::DEFAULT_EPOCH.as_millis() as u64);
    }
}
