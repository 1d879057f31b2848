//! Update scheduler: turns the host's per-frame callback into a throttled,
//! fixed-rate tick fanned out to registered consumers.
//!
//! The registry is an insertion-ordered set, so consumers are ticked in
//! registration order and re-registering is a no-op. When a tick is accepted the
//! baseline moves to `now - (elapsed % interval)`, keeping the fractional
//! remainder so the long-run rate does not drift under jitter.

use std::hash::Hash;

use indexmap::IndexSet;
use log::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::error::SceneError;

/// Anything that wants a call per accepted tick.
pub trait Updatable {
    fn update(&mut self);
}

#[derive(Debug)]
pub struct Updatables<K> {
    fps_interval: f64,
    then: f64,
    start_time: f64,
    entries: IndexSet<K>,
    clock: Box<dyn Clock>,
    ticks: u64,
}

impl<K: Copy + Eq + Hash> Default for Updatables<K> {
    fn default() -> Self {
        Self::new(Box::new(SystemClock::new()))
    }
}

impl<K: Copy + Eq + Hash> Updatables<K> {
    /// Uninitialised schedulers have a zero interval: every `update` ticks.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            fps_interval: 0.0,
            then: 0.0,
            start_time: 0.0,
            entries: IndexSet::new(),
            clock,
            ticks: 0,
        }
    }

    /// Set the target rate and reset the baseline to now.
    pub fn init(&mut self, fps: f64) -> Result<(), SceneError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(SceneError::InvalidFps(fps));
        }
        self.fps_interval = 1000.0 / fps;
        self.then = self.clock.now_ms();
        self.start_time = self.then;
        debug!("updatables: init fps={fps} interval={}ms", self.fps_interval);
        Ok(())
    }

    /// Returns `true` when the key was not registered before.
    pub fn add_updatable(&mut self, key: K) -> bool {
        self.entries.insert(key)
    }

    /// Returns `true` when the key was registered. Keeps the order of the rest.
    pub fn remove_updatable(&mut self, key: K) -> bool {
        self.entries.shift_remove(&key)
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.entries.contains(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().copied()
    }

    /// Registered keys in tick order, detached from the registry.
    pub fn snapshot(&self) -> Vec<K> {
        self.entries.iter().copied().collect()
    }

    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.fps_interval
    }

    /// Number of accepted ticks since construction.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Time since the last `init`, in milliseconds.
    pub fn running_ms(&self) -> f64 {
        self.clock.now_ms() - self.start_time
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Time gate against the scheduler's clock.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.poll_at(now)
    }

    /// Time gate against an explicit host timestamp. Returns whether a tick was
    /// accepted; consumers are not touched.
    pub fn poll_at(&mut self, now_ms: f64) -> bool {
        let elapsed = now_ms - self.then;
        if elapsed > self.fps_interval {
            self.then = if self.fps_interval > 0.0 {
                now_ms - (elapsed % self.fps_interval)
            } else {
                now_ms
            };
            self.ticks += 1;
            trace!(
                "updatables: tick #{} elapsed={elapsed:.3}ms consumers={}",
                self.ticks,
                self.entries.len()
            );
            true
        } else {
            false
        }
    }

    /// Poll the clock and, on an accepted tick, hand every registered key to
    /// `dispatch` in registration order.
    pub fn update(&mut self, dispatch: impl FnMut(K)) -> bool {
        let now = self.clock.now_ms();
        self.update_at(now, dispatch)
    }

    pub fn update_at(&mut self, now_ms: f64, mut dispatch: impl FnMut(K)) -> bool {
        if !self.poll_at(now_ms) {
            return false;
        }
        for key in self.snapshot() {
            dispatch(key);
        }
        true
    }
}

/// Drive a set of [`Updatable`] values stored by index.
///
/// Keys that do not resolve to a slot are skipped.
pub fn update_slots<U: Updatable>(scheduler: &mut Updatables<usize>, slots: &mut [U]) -> bool {
    scheduler.update(|idx| {
        if let Some(slot) = slots.get_mut(idx) {
            slot.update();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn scheduler(fps: f64) -> (Updatables<u32>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let mut s = Updatables::new(Box::new(clock.clone()));
        s.init(fps).unwrap();
        (s, clock)
    }

    #[test]
    fn rejects_non_positive_fps() {
        let (mut s, _) = scheduler(60.0);
        assert_eq!(s.init(0.0), Err(SceneError::InvalidFps(0.0)));
        assert!(s.init(f64::NAN).is_err());
        assert!(s.init(-5.0).is_err());
    }

    #[test]
    fn registration_is_idempotent() {
        let (mut s, _) = scheduler(60.0);
        assert!(s.add_updatable(1));
        assert!(!s.add_updatable(1));
        assert_eq!(s.len(), 1);
        assert!(s.remove_updatable(1));
        assert!(!s.remove_updatable(1));
        assert!(s.is_empty());
    }

    #[test]
    fn no_tick_before_interval_elapses() {
        let (mut s, clock) = scheduler(10.0); // 100ms
        s.add_updatable(7);
        let mut calls = 0;
        clock.set(100.0);
        assert!(!s.update(|_| calls += 1), "boundary is strictly greater-than");
        clock.set(100.5);
        assert!(s.update(|_| calls += 1));
        assert_eq!(calls, 1);
    }

    #[test]
    fn baseline_keeps_fractional_remainder() {
        let (mut s, _) = scheduler(10.0);
        // 250ms late: baseline lands at 250 - (250 % 100) = 200
        assert!(s.poll_at(250.0));
        assert!(!s.poll_at(300.0));
        assert!(s.poll_at(300.5));
    }

    #[test]
    fn dispatch_follows_registration_order() {
        let (mut s, clock) = scheduler(60.0);
        for k in [3, 1, 2] {
            s.add_updatable(k);
        }
        s.remove_updatable(1);
        s.add_updatable(1);
        clock.advance(20.0);
        let mut seen = Vec::new();
        s.update(|k| seen.push(k));
        assert_eq!(seen, vec![3, 2, 1]);
    }

    #[test]
    fn uninitialised_scheduler_ticks_every_call() {
        let clock = ManualClock::new(0.0);
        let mut s: Updatables<u32> = Updatables::new(Box::new(clock.clone()));
        clock.advance(0.001);
        assert!(s.poll());
        clock.advance(0.001);
        assert!(s.poll());
    }

    struct Counter(u32);

    impl Updatable for Counter {
        fn update(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn update_slots_ticks_registered_slots_only() {
        let clock = ManualClock::new(0.0);
        let mut s: Updatables<usize> = Updatables::new(Box::new(clock.clone()));
        s.init(50.0).unwrap();
        let mut slots = vec![Counter(0), Counter(0), Counter(0)];
        s.add_updatable(0);
        s.add_updatable(2);
        s.add_updatable(9);
        clock.advance(25.0);
        assert!(update_slots(&mut s, &mut slots));
        assert_eq!(
            slots.iter().map(|c| c.0).collect::<Vec<_>>(),
            vec![1, 0, 1]
        );
    }
}
