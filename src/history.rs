use crate::*;
use float_ord::FloatOrd;
use std::collections::VecDeque;

/// A mirror captured at one point of playback.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    time: f64,
    mirror: StateMirror,
}

impl HistorySnapshot {
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn mirror(&self) -> &StateMirror {
        &self.mirror
    }
}

/// Bounded, time-throttled store of past mirror snapshots. Oldest snapshots
/// are evicted first.
#[derive(Debug, Clone)]
pub struct HistoryTracker {
    capacity: usize,
    interval: f64,
    snapshots: VecDeque<HistorySnapshot>,
    last_snapshot_time: f64,
}

impl HistoryTracker {
    pub fn new(capacity: usize, interval: f64) -> Self {
        Self {
            capacity,
            interval,
            snapshots: VecDeque::with_capacity(capacity.min(4096)),
            last_snapshot_time: f64::NEG_INFINITY,
        }
    }

    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.capacity, config.interval)
    }

    /// Store a copy of `mirror` if at least the configured interval has
    /// passed since the last retained snapshot, or if `force` is set.
    /// Returns whether a snapshot was taken.
    pub fn record(&mut self, mirror: &StateMirror, force: bool) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if !force && mirror.time() - self.last_snapshot_time < self.interval {
            return false;
        }
        self.snapshots.push_back(HistorySnapshot {
            time: mirror.time(),
            mirror: mirror.clone(),
        });
        self.last_snapshot_time = mirror.time();
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        true
    }

    /// Copy of the snapshot closest in time to `time`.
    pub fn nearest(&self, time: f64) -> Option<StateMirror> {
        self.snapshots
            .iter()
            .min_by_key(|snapshot| FloatOrd((snapshot.time - time).abs()))
            .map(|snapshot| snapshot.mirror.clone())
    }

    /// Forget every snapshot taken after `time`, e.g. after seeking backwards.
    pub fn truncate_after(&mut self, time: f64) {
        while self
            .snapshots
            .back()
            .map(|snapshot| snapshot.time > time)
            .unwrap_or(false)
        {
            self.snapshots.pop_back();
        }
        self.last_snapshot_time = self
            .snapshots
            .back()
            .map(|snapshot| snapshot.time)
            .unwrap_or(f64::NEG_INFINITY);
    }

    pub fn iter_states(&self) -> impl Iterator<Item = StateMirror> + '_ {
        self.snapshots.iter().map(|snapshot| snapshot.mirror.clone())
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.snapshots.iter()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.last_snapshot_time = f64::NEG_INFINITY;
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }
}
