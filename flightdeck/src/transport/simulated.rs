//! Synthetic telemetry stream for running without a board.
//!
//! Emits the same newline-delimited JSON the boards emit, at a fixed rate,
//! with a slow attitude oscillation and a drifting position so the horizon,
//! the mesh and the map all move. Writing `ARM` / `DISARM` toggles the armed
//! flag, like the firmware does.

use std::time::Instant;

use super::{Transport, TransportError, TransportOpener};
use crate::telemetry::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

/// Default emission rate in records per second.
pub const DEFAULT_RATE_HZ: f64 = 50.0;

/// Upper bound on records produced by a single poll after a long stall.
const MAX_BURST: u64 = 64;

/// A transport that fabricates telemetry.
#[derive(Debug)]
pub struct SimulatedTransport {
    rate_hz: f64,
    started: Instant,
    emitted: u64,
    pending: Vec<u8>,
    armed: bool,
}

impl SimulatedTransport {
    /// Create a stream emitting `rate_hz` records per second.
    pub fn new(rate_hz: f64) -> Self {
        Self {
            rate_hz: rate_hz.max(1.0),
            started: Instant::now(),
            emitted: 0,
            pending: Vec::new(),
            armed: false,
        }
    }

    /// The record emitted `t` seconds into the stream.
    pub fn record_at(t: f64, armed: bool) -> String {
        let roll = 25.0 * (0.5 * t).sin();
        let pitch = 10.0 * (0.3 * t).sin();
        let altitude = 120.0 + 20.0 * (0.1 * t).sin();
        let lat = DEFAULT_LATITUDE + 0.0004 * t;
        let lon = DEFAULT_LONGITUDE + 0.0003 * t;
        let turbulence = roll.abs() > 20.0;
        let score = if turbulence { 70.0 } else { 98.0 };
        let status = u8::from(turbulence);
        let noise = 20.0 + 10.0 * (2.0 * t).sin().abs();

        format!(
            "{{\"r\":{roll:.1},\"p\":{pitch:.1},\"lat\":{lat:.6},\"lon\":{lon:.6},\
             \"alt\":{altitude:.0},\"as\":{score:.0},\"st\":{status},\"arm\":{},\
             \"sd\":1,\"noise\":{noise:.0}}}\n",
            u8::from(armed)
        )
    }

    fn refill(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let due = (elapsed * self.rate_hz) as u64;
        let behind = due.saturating_sub(self.emitted);
        if behind > MAX_BURST {
            self.emitted = due - MAX_BURST;
        }
        while self.emitted < due {
            let t = self.emitted as f64 / self.rate_hz;
            self.pending
                .extend_from_slice(Self::record_at(t, self.armed).as_bytes());
            self.emitted += 1;
        }
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_HZ)
    }
}

impl Transport for SimulatedTransport {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        self.refill();
        Ok(self.pending.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let command = String::from_utf8_lossy(bytes);
        if command.contains("DISARM") {
            self.armed = false;
        } else if command.contains("ARM") {
            self.armed = true;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "simulator"
    }
}

/// Opens a fresh [`SimulatedTransport`].
#[derive(Debug, Clone)]
pub struct SimulatedOpener {
    rate_hz: f64,
}

impl SimulatedOpener {
    pub fn new(rate_hz: f64) -> Self {
        Self { rate_hz }
    }
}

impl Default for SimulatedOpener {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_HZ)
    }
}

impl TransportOpener for SimulatedOpener {
    fn open(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(SimulatedTransport::new(self.rate_hz)))
    }

    fn describe(&self) -> String {
        format!("simulator @ {:.0} Hz", self.rate_hz)
    }
}
