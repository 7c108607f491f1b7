//! Time sources, the timer queue and the deterministic state hash.
//!
//! Simulation time advances only through `World::tick(dt)`. Side effects that
//! must follow real elapsed time (the pot unlocking after a collection) are
//! scheduled against an injected [`Clock`] instead, and the world polls the
//! [`TimerQueue`] once per tick.

use crate::fixed::Fixed64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Monotonic time source for timers and audio bookkeeping.
pub trait Clock: std::fmt::Debug {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time, so a
/// host or test keeps one handle and gives another to the world.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

/// Seconds to a `Duration`, saturating at `Duration::MAX`. Negative and NaN
/// map to zero.
pub fn saturating_secs(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.max(0.0)).unwrap_or(Duration::MAX)
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_add(by)));
    }

    pub fn advance_secs(&self, secs: f32) {
        self.advance(saturating_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

// ---------------------------------------------------------------------------
// Timer queue
// ---------------------------------------------------------------------------

/// Pending actions keyed by the clock time they become due.
///
/// Actions due at the same instant fire in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    entries: Vec<TimerEntry<T>>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct TimerEntry<T> {
    due: Duration,
    seq: u64,
    action: T,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn schedule(&mut self, due: Duration, action: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TimerEntry { due, seq, action });
    }

    /// Remove and return every action with `due <= now`, earliest first.
    pub fn drain_due(&mut self, now: Duration) -> Vec<T> {
        let mut due: Vec<TimerEntry<T>> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|e| (e.due, e.seq));
        due.into_iter().map(|e| e.action).collect()
    }

    /// Earliest pending due time.
    pub fn next_due(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Counters advanced by every unpaused tick.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimState {
    /// Number of ticks run.
    pub tick: u64,
    /// Sum of clamped `dt` values, seconds.
    pub elapsed: f64,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for divergence checks.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    /// Hashes the bit pattern, so `0.0` and `-0.0` differ.
    pub fn write_f32(&mut self, v: f32) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_secs_clamps_both_ends() {
        assert_eq!(saturating_secs(1.5), Duration::from_millis(1500));
        assert_eq!(saturating_secs(-3.0), Duration::ZERO);
        assert_eq!(saturating_secs(f32::NAN), Duration::ZERO);
        assert_eq!(saturating_secs(1e30), Duration::MAX);
        assert_eq!(saturating_secs(f32::INFINITY), Duration::MAX);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(250));
        clock.advance_secs(0.75);
        assert_eq!(handle.now(), Duration::from_secs(1));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn timer_queue_fires_only_due_actions_in_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::from_secs(2), "late");
        timers.schedule(Duration::from_secs(1), "first");
        timers.schedule(Duration::from_secs(1), "second");

        assert!(timers.drain_due(Duration::from_millis(999)).is_empty());
        assert_eq!(timers.next_due(), Some(Duration::from_secs(1)));
        assert_eq!(
            timers.drain_due(Duration::from_secs(1)),
            vec!["first", "second"]
        );
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.drain_due(Duration::from_secs(10)), vec!["late"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn timer_queue_clear() {
        let mut timers = TimerQueue::new();
        timers.schedule(Duration::ZERO, 1);
        timers.clear();
        assert!(timers.drain_due(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn state_hash_deterministic() {
        let mut h1 = StateHash::new();
        h1.write_u64(42);
        h1.write_f32(1.5);

        let mut h2 = StateHash::new();
        h2.write_u64(42);
        h2.write_f32(1.5);

        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_order_matters() {
        let mut h1 = StateHash::new();
        h1.write_u32(1);
        h1.write_u32(2);

        let mut h2 = StateHash::new();
        h2.write_u32(2);
        h2.write_u32(1);

        assert_ne!(h1.finish(), h2.finish());
    }
}
