//! Rolling roll/pitch history for the attitude graphs.

use std::collections::VecDeque;

/// Samples kept by default, one per tick.
pub const DEFAULT_HISTORY_LENGTH: usize = 200;

/// Bounded record of smoothed roll and pitch, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct AttitudeHistory {
    samples: VecDeque<(f64, f64)>,
    capacity: usize,
}

impl Default for AttitudeHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LENGTH)
    }
}

impl AttitudeHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record one tick, evicting the oldest sample when full.
    pub fn push(&mut self, roll: f64, pitch: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back((roll, pitch));
    }

    pub fn roll(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|&(roll, _)| roll)
    }

    pub fn pitch(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|&(_, pitch)| pitch)
    }

    /// `(roll, pitch)` pairs, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().copied()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<(f64, f64)> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
