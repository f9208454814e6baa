//! Shared link state.
//!
//! The worker thread is the only writer; the render thread takes snapshot
//! copies. A whole decoded batch is applied under one lock, so a reader never
//! observes half of a batch.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::telemetry::TelemetryFrame;

/// Whether the link has a transport behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkMode {
    /// Not started yet.
    #[default]
    Idle,
    /// Transport open, worker running.
    Online,
    /// Transport unavailable; the link serves the last known state.
    Offline,
}

impl LinkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkMode::Idle => "idle",
            LinkMode::Online => "online",
            LinkMode::Offline => "offline",
        }
    }
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the link state.
#[derive(Debug, Clone)]
pub struct LinkSnapshot {
    /// Freshest known telemetry, merged field by field.
    pub frame: TelemetryFrame,
    /// Link mode.
    pub mode: LinkMode,
    /// Number of decoded batches applied since start.
    pub updates: u64,
    /// When the last batch was applied.
    pub last_update: Option<Instant>,
}

impl LinkSnapshot {
    /// A snapshot holding `frame` with no updates applied.
    pub fn new(frame: TelemetryFrame) -> Self {
        Self {
            frame,
            mode: LinkMode::Idle,
            updates: 0,
            last_update: None,
        }
    }

    /// Merge a decoded batch.
    pub fn apply(&mut self, batch: &TelemetryFrame) {
        self.frame.merge(batch);
        self.updates += 1;
        self.last_update = Some(Instant::now());
    }

    /// Time since the last update, `None` if nothing has arrived yet.
    pub fn age(&self) -> Option<Duration> {
        self.last_update.map(|t| t.elapsed())
    }

    /// Whether no update arrived within `max_age`.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age().map_or(true, |age| age > max_age)
    }
}

impl Default for LinkSnapshot {
    fn default() -> Self {
        Self::new(TelemetryFrame::cockpit_defaults())
    }
}

/// Single-slot cell holding the link state.
#[derive(Debug, Clone, Default)]
pub struct SharedLinkState {
    inner: Arc<Mutex<LinkSnapshot>>,
}

impl SharedLinkState {
    pub fn new(initial: LinkSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(initial)),
        }
    }

    /// Copy the current state. Never waits on I/O.
    pub fn snapshot(&self) -> LinkSnapshot {
        self.inner.lock().clone()
    }

    /// Apply a decoded batch.
    pub fn apply(&self, batch: &TelemetryFrame) {
        self.inner.lock().apply(batch);
    }

    /// Set the link mode.
    pub fn set_mode(&self, mode: LinkMode) {
        self.inner.lock().mode = mode;
    }

    pub fn mode(&self) -> LinkMode {
        self.inner.lock().mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_stale() {
        let snapshot = LinkSnapshot::default();
        assert_eq!(snapshot.updates, 0);
        assert!(snapshot.age().is_none());
        assert!(snapshot.is_stale(Duration::from_secs(3600)));
    }

    #[test]
    fn test_apply_merges_and_counts() {
        let state = SharedLinkState::new(LinkSnapshot::new(TelemetryFrame::new()));
        state.apply(&[("alt", 50.0)].into_iter().collect());
        state.apply(&[("r", 4.0)].into_iter().collect());

        let snapshot = state.snapshot();
        assert_eq!(snapshot.updates, 2);
        assert_eq!(snapshot.frame.altitude(), Some(50.0));
        assert_eq!(snapshot.frame.roll(), Some(4.0));
        assert!(!snapshot.is_stale(Duration::from_secs(60)));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(LinkMode::Offline.to_string(), "offline");
        assert_eq!(LinkMode::default(), LinkMode::Idle);
    }
}
