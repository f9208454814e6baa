//! Telemetry link: a background reader that keeps the freshest state.
//!
//! The link owns a transport and a [`FrameDecoder`](crate::telemetry::FrameDecoder)
//! on a dedicated worker thread. Each worker iteration reads every byte the
//! transport has buffered in one go, merges the decoded records and publishes
//! the result into a single-slot cell. The render thread calls
//! [`TelemetryLink::latest`] once per tick and always gets an immediate copy.
//!
//! # Offline mode
//!
//! A missing sensor is not an error. If the transport cannot be opened the
//! link logs once and keeps serving the default (or last known) state.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use flightdeck::link::{LinkConfig, TelemetryLink};
//! use flightdeck::transport::{MemoryOpener, MemoryTransport};
//!
//! let (transport, board) = MemoryTransport::pair();
//! let mut link = TelemetryLink::new(Arc::new(MemoryOpener::new(transport)), LinkConfig::default());
//! link.start();
//!
//! board.feed(b"{\"r\":10}\n");
//! let snapshot = link.latest(); // never blocks
//! # let _ = snapshot;
//! link.stop();
//! ```

mod state;
mod worker;

pub use state::{LinkMode, LinkSnapshot, SharedLinkState};
pub use worker::PollOutcome;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::telemetry::TelemetryFrame;
use crate::transport::TransportOpener;
use worker::LinkWorker;

/// Default sleep when the transport has nothing to read.
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_millis(1);

/// Default read buffer size.
pub const DEFAULT_READ_CHUNK: usize = 4096;

/// Telemetry link settings.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// How long the worker sleeps when no bytes are waiting.
    pub idle_sleep: Duration,
    /// Size of each transport read.
    pub read_chunk: usize,
    /// State reported before any telemetry arrives.
    pub initial: TelemetryFrame,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            idle_sleep: DEFAULT_IDLE_SLEEP,
            read_chunk: DEFAULT_READ_CHUNK,
            initial: TelemetryFrame::cockpit_defaults(),
        }
    }
}

impl LinkConfig {
    pub fn with_idle_sleep(mut self, idle_sleep: Duration) -> Self {
        self.idle_sleep = idle_sleep;
        self
    }

    pub fn with_initial(mut self, initial: TelemetryFrame) -> Self {
        self.initial = initial;
        self
    }
}

/// Background telemetry reader with a non-blocking snapshot API.
pub struct TelemetryLink {
    opener: Arc<dyn TransportOpener>,
    config: LinkConfig,
    state: SharedLinkState,
    running: Arc<AtomicBool>,
    commands: Option<Sender<Vec<u8>>>,
    worker: Option<JoinHandle<()>>,
    offline_reported: bool,
}

impl std::fmt::Debug for TelemetryLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryLink")
            .field("transport", &self.opener.describe())
            .field("mode", &self.state.mode())
            .finish_non_exhaustive()
    }
}

impl TelemetryLink {
    /// Create a link. Nothing is opened until [`start`](Self::start).
    pub fn new(opener: Arc<dyn TransportOpener>, config: LinkConfig) -> Self {
        let state = SharedLinkState::new(LinkSnapshot::new(config.initial.clone()));
        Self {
            opener,
            config,
            state,
            running: Arc::new(AtomicBool::new(false)),
            commands: None,
            worker: None,
            offline_reported: false,
        }
    }

    /// Open the transport and start the worker.
    ///
    /// Never fails: when the transport is unavailable the link switches to
    /// offline mode and keeps serving the last known state. Calling `start`
    /// on a running link does nothing.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let transport = match self.opener.open() {
            Ok(transport) => transport,
            Err(e) => {
                self.go_offline(&e.to_string());
                return;
            }
        };

        let (tx, rx) = channel();
        let worker = LinkWorker::new(transport, self.state.clone(), rx, self.config.read_chunk);
        let running = Arc::clone(&self.running);
        let idle_sleep = self.config.idle_sleep;

        running.store(true, Ordering::Release);
        let spawned = std::thread::Builder::new()
            .name("telemetry-link".to_string())
            .spawn(move || worker.run(running, idle_sleep));

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                self.commands = Some(tx);
                self.state.set_mode(LinkMode::Online);
                info!(transport = %self.opener.describe(), "Telemetry link online");
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                self.go_offline(&format!("failed to spawn worker: {}", e));
            }
        }
    }

    fn go_offline(&mut self, reason: &str) {
        self.state.set_mode(LinkMode::Offline);
        if self.offline_reported {
            debug!(transport = %self.opener.describe(), reason, "Telemetry link still offline");
        } else {
            warn!(
                transport = %self.opener.describe(),
                reason,
                "No sensor link, running without telemetry"
            );
            self.offline_reported = true;
        }
    }

    /// Current state. Returns immediately.
    pub fn latest(&self) -> LinkSnapshot {
        self.state.snapshot()
    }

    /// Current link mode.
    pub fn mode(&self) -> LinkMode {
        self.state.mode()
    }

    /// Whether the worker is running against an open transport.
    pub fn is_online(&self) -> bool {
        self.mode() == LinkMode::Online
    }

    /// Queue a command line for the board (`ARM`, `DISARM`, ...).
    ///
    /// A trailing newline is added when missing. Returns `false` when the
    /// link is not online; the command is dropped in that case.
    pub fn send(&self, command: &str) -> bool {
        let Some(commands) = &self.commands else {
            return false;
        };
        let mut line = command.as_bytes().to_vec();
        if !line.ends_with(b"\n") {
            line.push(b'\n');
        }
        commands.send(line).is_ok()
    }

    /// Stop the worker and release the transport. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.commands = None;

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Telemetry worker panicked");
            }
            self.state.set_mode(LinkMode::Idle);
            info!("Telemetry link stopped");
        }
    }
}

impl Drop for TelemetryLink {
    fn drop(&mut self) {
        self.stop();
    }
}
