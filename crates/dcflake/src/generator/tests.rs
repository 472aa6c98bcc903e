use core::{
    cell::{Cell, RefCell},
    time::Duration,
};
#[cfg(not(feature = "parking-lot"))]
use std::sync::atomic::{AtomicBool, Ordering};
use std::{collections::HashSet, sync::Arc, thread::scope};

use crate::{
    AtomicSnowflakeGenerator, BasicSnowflakeGenerator, ClassicSnowflakeId, Error, Identity,
    LockSnowflakeGenerator, MonotonicClock, Poll, SnowflakeGenerator, SnowflakeId, TimeSource,
};

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test moves by hand.
struct SetTime {
    millis: Cell<u64>,
}

impl SetTime {
    fn new(millis: u64) -> Self {
        Self {
            millis: Cell::new(millis),
        }
    }
}

impl TimeSource for SetTime {
    fn current_millis(&self) -> u64 {
        self.millis.get()
    }
}

/// Reads 42 for the first `switch_after` calls and 43 afterwards.
struct StepTime {
    reads: Cell<u64>,
    switch_after: u64,
}

impl TimeSource for StepTime {
    fn current_millis(&self) -> u64 {
        let reads = self.reads.get() + 1;
        self.reads.set(reads);
        if reads <= self.switch_after { 42 } else { 43 }
    }
}

thread_local! {
    static BEFORE_READ: RefCell<Option<Box<dyn FnOnce()>>> = const { RefCell::new(None) };
}

/// Runs the hook in `BEFORE_READ` once, then reads a fixed time. Lets a test
/// slip another call in between a generator's load and its commit.
struct InterleavedTime {
    millis: u64,
}

impl TimeSource for InterleavedTime {
    fn current_millis(&self) -> u64 {
        let hook = BEFORE_READ.with(|hook| hook.borrow_mut().take());
        if let Some(hook) = hook {
            hook();
        }
        self.millis
    }
}

/// Panics on its first read.
#[cfg(not(feature = "parking-lot"))]
struct PanicOnceTime {
    panicked: AtomicBool,
    millis: u64,
}

#[cfg(not(feature = "parking-lot"))]
impl TimeSource for PanicOnceTime {
    fn current_millis(&self) -> u64 {
        if !self.panicked.swap(true, Ordering::Relaxed) {
            panic!("clock read failed");
        }
        self.millis
    }
}

trait PollExt<ID: SnowflakeId> {
    fn unwrap_ready(self) -> ID;
    fn unwrap_pending(self) -> u64;
}

impl<ID: SnowflakeId> PollExt<ID> for Poll<ID> {
    fn unwrap_ready(self) -> ID {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => panic!("unexpected pending (yield for: {yield_for})"),
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn identity() -> Identity<ClassicSnowflakeId> {
    Identity::new(3, 7).unwrap()
}

fn run_sequence_increments_within_same_tick<G, T>(generator: &G)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T>,
    T: TimeSource,
{
    let id1 = generator.try_next_id().unwrap();
    let id2 = generator.try_next_id().unwrap();
    let id3 = generator.try_next_id().unwrap();

    for id in [id1, id2, id3] {
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.datacenter_id(), 3);
        assert_eq!(id.worker_id(), 7);
    }
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_first_id_at_the_epoch<G, T>(generator: &G)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T>,
    T: TimeSource,
{
    let first = generator.try_next_id().unwrap();
    assert_eq!(first.timestamp(), 0);
    assert_eq!(first.sequence(), 0);

    let second = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(second.timestamp(), 0);
    assert_eq!(second.sequence(), 1);
}

fn run_sequence_wraps_into_next_millisecond<G, T>(generator: &G)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T>,
    T: TimeSource,
{
    for i in 0..=ClassicSnowflakeId::max_sequence() {
        let id = generator.try_next_id().unwrap();
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.sequence(), i);
    }

    let id = generator.try_next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

fn run_poll_pends_when_sequence_exhausted<G, T>(generator: &G)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T>,
    T: TimeSource,
{
    for _ in 0..=ClassicSnowflakeId::max_sequence() {
        generator.try_poll_id().unwrap().unwrap_ready();
    }
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);
}

fn run_regression_is_reported_and_state_kept<G, T>(generator: &G, time: &SetTime)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T>,
    T: TimeSource,
{
    let first = generator.try_next_id().unwrap();
    assert_eq!(first.timestamp(), 100);

    time.millis.set(99);
    let expected = Error::ClockRegression { now: 99, last: 100 };
    assert_eq!(generator.try_next_id(), Err(expected.clone()));
    assert_eq!(generator.try_poll_id(), Err(expected));

    time.millis.set(100);
    let next = generator.try_next_id().unwrap();
    assert_eq!(next.timestamp(), 100);
    assert_eq!(next.sequence(), first.sequence() + 1);
}

fn run_stall_hits_spin_limit<G, T>(generator: &G)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T>,
    T: TimeSource,
{
    for _ in 0..=ClassicSnowflakeId::max_sequence() {
        generator.try_next_id().unwrap();
    }
    assert_eq!(
        generator.try_next_id(),
        Err(Error::ClockStalled { last: 42, spins: 11 })
    );
}

fn run_monotonic<G, T>(generator: &G)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T>,
    T: TimeSource,
{
    const TOTAL_IDS: usize = 4096 * 64;

    let mut last = generator.try_next_id().unwrap();
    for _ in 1..TOTAL_IDS {
        let id = generator.try_next_id().unwrap();
        assert!(id > last);
        if id.timestamp() == last.timestamp() {
            assert_eq!(id.sequence(), last.sequence() + 1);
        } else {
            assert_eq!(id.sequence(), 0);
        }
        assert_eq!(id.worker_id(), 7);
        last = id;
    }
}

fn run_threaded_unique_and_increasing<G, T>(generator: &G)
where
    G: SnowflakeGenerator<ClassicSnowflakeId, T> + Sync,
    T: TimeSource,
{
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 4096 * 16;

    let per_thread: Vec<Vec<ClassicSnowflakeId>> = scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..IDS_PER_THREAD)
                        .map(|_| generator.try_next_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(THREADS * IDS_PER_THREAD);
    for ids in &per_thread {
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for id in ids {
            assert!(seen.insert(*id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
}

#[test]
fn basic_generator_sequence_test() {
    let generator = BasicSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO);
    run_sequence_increments_within_same_tick(&generator);
}

#[test]
fn lock_generator_sequence_test() {
    let generator = LockSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO);
    run_sequence_increments_within_same_tick(&generator);
}

#[test]
fn atomic_generator_sequence_test() {
    let generator = AtomicSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO);
    run_sequence_increments_within_same_tick(&generator);
}

#[test]
fn basic_generator_first_id_at_epoch_test() {
    let generator =
        BasicSnowflakeGenerator::new(identity(), MockTime { millis: 0 }).with_epoch(Duration::ZERO);
    run_first_id_at_the_epoch(&generator);
}

#[test]
fn lock_generator_first_id_at_epoch_test() {
    let generator =
        LockSnowflakeGenerator::new(identity(), MockTime { millis: 0 }).with_epoch(Duration::ZERO);
    run_first_id_at_the_epoch(&generator);
}

#[test]
fn atomic_generator_first_id_at_epoch_test() {
    let generator = AtomicSnowflakeGenerator::new(identity(), MockTime { millis: 0 })
        .with_epoch(Duration::ZERO);
    run_first_id_at_the_epoch(&generator);
}

#[test]
fn first_poll_at_epoch_is_ready() {
    let epoch = crate::DEFAULT_EPOCH.as_millis() as u64;
    let generator = AtomicSnowflakeGenerator::new(identity(), MockTime { millis: epoch });
    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!((id.timestamp(), id.sequence()), (0, 0));
}

fn step_time() -> StepTime {
    StepTime {
        reads: Cell::new(0),
        switch_after: ClassicSnowflakeId::max_sequence() + 2,
    }
}

#[test]
fn basic_generator_wrap_test() {
    let time = step_time();
    let generator = BasicSnowflakeGenerator::new(identity(), &time).with_epoch(Duration::ZERO);
    run_sequence_wraps_into_next_millisecond(&generator);
}

#[test]
fn lock_generator_wrap_test() {
    let time = step_time();
    let generator = LockSnowflakeGenerator::new(identity(), &time).with_epoch(Duration::ZERO);
    run_sequence_wraps_into_next_millisecond(&generator);
}

#[test]
fn atomic_generator_wrap_test() {
    let time = step_time();
    let generator = AtomicSnowflakeGenerator::new(identity(), &time).with_epoch(Duration::ZERO);
    run_sequence_wraps_into_next_millisecond(&generator);
}

#[test]
fn basic_generator_pending_test() {
    let generator = BasicSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO);
    run_poll_pends_when_sequence_exhausted(&generator);
}

#[test]
fn lock_generator_pending_test() {
    let generator = LockSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO);
    run_poll_pends_when_sequence_exhausted(&generator);
}

#[test]
fn atomic_generator_pending_test() {
    let generator = AtomicSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO);
    run_poll_pends_when_sequence_exhausted(&generator);
}

#[test]
fn basic_generator_regression_test() {
    let time = SetTime::new(100);
    let generator = BasicSnowflakeGenerator::new(identity(), &time).with_epoch(Duration::ZERO);
    run_regression_is_reported_and_state_kept(&generator, &time);
}

#[test]
fn lock_generator_regression_test() {
    let time = SetTime::new(100);
    let generator = LockSnowflakeGenerator::new(identity(), &time).with_epoch(Duration::ZERO);
    run_regression_is_reported_and_state_kept(&generator, &time);
}

#[test]
fn atomic_generator_regression_test() {
    let time = SetTime::new(100);
    let generator = AtomicSnowflakeGenerator::new(identity(), &time).with_epoch(Duration::ZERO);
    run_regression_is_reported_and_state_kept(&generator, &time);
}

#[test]
fn regression_is_reported_in_unix_millis() {
    let time = SetTime::new(1_000_100);
    let generator = LockSnowflakeGenerator::new(identity(), &time)
        .with_epoch(Duration::from_millis(1_000_000));
    assert_eq!(generator.try_next_id().unwrap().timestamp(), 100);

    time.millis.set(1_000_050);
    assert_eq!(
        generator.try_next_id(),
        Err(Error::ClockRegression {
            now: 1_000_050,
            last: 1_000_100,
        })
    );
}

#[test]
fn basic_generator_stall_test() {
    let generator = BasicSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO)
        .with_spin_limit(10);
    run_stall_hits_spin_limit(&generator);
}

#[test]
fn lock_generator_stall_test() {
    let generator = LockSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO)
        .with_spin_limit(10);
    run_stall_hits_spin_limit(&generator);
}

#[test]
fn atomic_generator_stall_test() {
    let generator = AtomicSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO)
        .with_spin_limit(10);
    run_stall_hits_spin_limit(&generator);
}

#[test]
fn clock_before_epoch_is_out_of_range() {
    let generator = AtomicSnowflakeGenerator::new(identity(), MockTime { millis: 5 });
    assert_eq!(
        generator.try_next_id(),
        Err(Error::TimestampOutOfRange { millis: 5 })
    );
    assert_eq!(
        generator.try_poll_id(),
        Err(Error::TimestampOutOfRange { millis: 5 })
    );
}

#[test]
fn default_epoch_is_applied() {
    let epoch = crate::DEFAULT_EPOCH.as_millis() as u64;
    let generator = BasicSnowflakeGenerator::new(identity(), MockTime { millis: epoch + 9 });
    assert_eq!(generator.epoch(), crate::DEFAULT_EPOCH);
    assert_eq!(generator.try_next_id().unwrap().timestamp(), 9);
}

#[test]
fn basic_generator_monotonic_clock_sequence_increments() {
    let generator = BasicSnowflakeGenerator::new(identity(), MonotonicClock::default());
    run_monotonic(&generator);
}

#[test]
fn lock_generator_monotonic_clock_sequence_increments() {
    let generator = LockSnowflakeGenerator::new(identity(), MonotonicClock::default());
    run_monotonic(&generator);
}

#[test]
fn atomic_generator_monotonic_clock_sequence_increments() {
    let generator = AtomicSnowflakeGenerator::new(identity(), MonotonicClock::default());
    run_monotonic(&generator);
}

#[test]
fn lock_generator_threaded_monotonic() {
    let generator = LockSnowflakeGenerator::new(identity(), MonotonicClock::default());
    run_threaded_unique_and_increasing(&generator);
}

#[test]
fn atomic_generator_threaded_monotonic() {
    let generator = AtomicSnowflakeGenerator::new(identity(), MonotonicClock::default());
    run_threaded_unique_and_increasing(&generator);
}

#[test]
fn lock_generator_clones_share_state() {
    let generator = LockSnowflakeGenerator::new(identity(), Arc::new(MockTime { millis: 42 }))
        .with_epoch(Duration::ZERO);
    let other = generator.clone();
    assert_eq!(generator.try_next_id().unwrap().sequence(), 0);
    assert_eq!(other.try_next_id().unwrap().sequence(), 1);
}

#[test]
fn lock_generator_clones_share_configuration() {
    let generator = LockSnowflakeGenerator::new(identity(), MockTime { millis: 1_000 })
        .with_epoch(Duration::from_millis(1));
    let other = generator.clone().with_epoch(Duration::ZERO);
    assert_eq!(other.epoch(), Duration::from_millis(1));

    let a1 = generator.try_next_id().unwrap();
    let b1 = other.try_next_id().unwrap();
    let a2 = generator.try_next_id().unwrap();
    for id in [a1, b1, a2] {
        assert_eq!(id.timestamp(), 999);
    }
    assert!(a1 < b1 && b1 < a2);
}

#[test]
fn lock_generator_clones_share_spin_limit() {
    let generator = LockSnowflakeGenerator::new(identity(), MockTime { millis: 42 })
        .with_epoch(Duration::ZERO)
        .with_spin_limit(10);
    let other = generator.clone().with_spin_limit(1_000_000);
    run_stall_hits_spin_limit(&other);
}

#[cfg(not(feature = "parking-lot"))]
#[test]
fn lock_generator_reports_poisoned_lock() {
    let generator = LockSnowflakeGenerator::new(
        identity(),
        PanicOnceTime {
            panicked: AtomicBool::new(false),
            millis: 42,
        },
    )
    .with_epoch(Duration::ZERO);

    let other = generator.clone();
    let outcome = std::thread::spawn(move || other.try_next_id()).join();
    assert!(outcome.is_err());

    assert_eq!(generator.try_next_id(), Err(Error::LockPoisoned));
    assert_eq!(generator.try_poll_id(), Err(Error::LockPoisoned));
}

fn interleaved_atomic_generator()
-> Arc<AtomicSnowflakeGenerator<ClassicSnowflakeId, InterleavedTime>> {
    let generator = Arc::new(
        AtomicSnowflakeGenerator::new(identity(), InterleavedTime { millis: 42 })
            .with_epoch(Duration::ZERO),
    );
    let rival = Arc::clone(&generator);
    BEFORE_READ.with(|hook| {
        *hook.borrow_mut() = Some(Box::new(move || {
            assert_eq!(rival.try_next_id().unwrap().sequence(), 0);
        }));
    });
    generator
}

#[test]
fn atomic_generator_poll_pends_after_losing_a_race() {
    let generator = interleaved_atomic_generator();
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 0);

    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.sequence(), 1);
}

#[test]
fn atomic_generator_retries_after_losing_a_race() {
    let generator = interleaved_atomic_generator();
    let id = generator.try_next_id().unwrap();
    assert_eq!(id.timestamp(), 42);
    assert_eq!(id.sequence(), 1);
}

#[test]
fn default_generators_use_a_valid_identity() {
    let basic = BasicSnowflakeGenerator::<ClassicSnowflakeId, _>::default();
    let lock = LockSnowflakeGenerator::<ClassicSnowflakeId, _>::default();
    let atomic = AtomicSnowflakeGenerator::<ClassicSnowflakeId, _>::default();

    let discovered = Identity::<ClassicSnowflakeId>::discover();
    for identity in [basic.identity(), lock.identity(), atomic.identity()] {
        assert_eq!(identity, discovered);
    }

    let id = atomic.try_next_id().unwrap();
    assert_eq!(id.datacenter_id(), discovered.datacenter_id());
    assert_eq!(id.worker_id(), discovered.worker_id());
    assert!(basic.try_next_id().is_ok());
    assert!(lock.try_next_id().is_ok());
}
