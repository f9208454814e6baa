//! Fixed-rate tick cadence.

use std::time::{Duration, Instant};

/// Default render rate.
pub const DEFAULT_TICK_RATE_HZ: u32 = 60;

/// Lowest supported render rate.
pub const MIN_TICK_RATE_HZ: u32 = 1;

/// Highest supported render rate.
pub const MAX_TICK_RATE_HZ: u32 = 240;

/// Sleeps out the remainder of each tick period.
///
/// Deadlines advance by whole periods from the start instant, so a slow tick
/// does not push every later tick back. When the loop falls more than one
/// period behind, the schedule restarts from now instead of bursting.
#[derive(Debug, Clone)]
pub struct TickClock {
    period: Duration,
    next: Instant,
    ticks: u64,
    overruns: u64,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE_HZ)
    }
}

impl TickClock {
    /// `rate_hz` is clamped into the supported range.
    pub fn new(rate_hz: u32) -> Self {
        let rate = rate_hz.clamp(MIN_TICK_RATE_HZ, MAX_TICK_RATE_HZ);
        let period = Duration::from_secs(1) / rate;
        Self {
            period,
            next: Instant::now() + period,
            ticks: 0,
            overruns: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn rate_hz(&self) -> f64 {
        1.0 / self.period.as_secs_f64()
    }

    /// Block until the next tick is due.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next {
            std::thread::sleep(self.next - now);
            self.next += self.period;
        } else if now - self.next > self.period {
            self.overruns += 1;
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }
        self.ticks += 1;
    }

    /// Ticks completed.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Times the loop fell more than a period behind.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}
