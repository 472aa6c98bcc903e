use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::TimeSource;

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic time source that reports Unix milliseconds without ever going
/// backward.
///
/// The wall clock is sampled once at construction. From then on the clock
/// advances with a monotonic timer (`Instant`), so NTP steps or manual clock
/// changes on the host cannot move it backwards. The price is drift: the
/// reported time does not follow later wall-clock corrections.
///
/// Clones share one ticker.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    anchor: u64, // Unix milliseconds at construction
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Constructs a monotonic clock anchored at the current wall-clock time.
    ///
    /// Internally, the clock spawns a background thread that updates a shared
    /// atomic counter once per millisecond with the time elapsed since
    /// construction. The thread exits once the last clone is dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use dcflake::{MonotonicClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let before = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(5));
    /// assert!(clock.current_millis() >= before);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        let start = Instant::now();
        let anchor = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64);

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Compute the absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                // Sleep if we are early
                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                // After waking, recompute how far we actually are from the
                // start
                let now_ms = start.elapsed().as_millis() as u64;

                // Monotonic store, aligned to elapsed milliseconds since start
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Align to next tick after the current actual time
                tick = now_ms + 1;
            }
        });

        // Freshly created, so the cell is always empty.
        let _ = inner._handle.set(handle);

        Self { inner, anchor }
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the anchor time plus the milliseconds elapsed since
    /// construction.
    fn current_millis(&self) -> u64 {
        self.anchor + self.inner.current.load(Ordering::Relaxed)
    }
}
