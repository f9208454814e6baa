//! Render-loop driver.
//!
//! [`Cockpit`] wires the pipeline together. Each [`tick`](Cockpit::tick):
//!
//! 1. takes the latest telemetry snapshot (never blocks),
//! 2. steps the smoother,
//! 3. installs a finished map tile and requests a new one if the aircraft
//!    moved,
//! 4. projects the aircraft model, horizon and pitch ladder,
//! 5. records roll and pitch in the rolling history,
//!
//! and returns everything a drawing layer needs as a [`CockpitFrame`].

mod clock;

pub use clock::{TickClock, DEFAULT_TICK_RATE_HZ, MAX_TICK_RATE_HZ, MIN_TICK_RATE_HZ};

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::kernel::{
    Attitude, Horizon, HorizonLine, LadderRung, Mesh, OrientationKernel, PitchLadder, ScreenPoint,
    Trail, TrailSegment, Transform, VisibleEdge, DEFAULT_TRAIL_LENGTH,
};
use crate::link::{LinkMode, TelemetryLink};
use crate::map::{MapStatus, TilePrefetcher};
use crate::smoother::{
    AttitudeHistory, ConfigError, DisplayState, SmoothingConfig, StateSmoother,
    DEFAULT_HISTORY_LENGTH,
};

/// Model scale used for the built-in meshes.
pub const DEFAULT_MODEL_SCALE: f64 = 40.0;

/// Everything the cockpit needs besides the link and map.
#[derive(Debug, Clone)]
pub struct CockpitConfig {
    pub smoothing: SmoothingConfig,
    pub kernel: OrientationKernel,
    pub mesh: Mesh,
    pub horizon: Horizon,
    pub ladder: PitchLadder,
    pub trail_length: usize,
    /// Roll/pitch samples kept for the attitude graphs.
    pub history_length: usize,
}

impl Default for CockpitConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            kernel: OrientationKernel {
                transform: Transform::scaled(DEFAULT_MODEL_SCALE),
                ..OrientationKernel::default()
            },
            mesh: Mesh::quadcopter(),
            horizon: Horizon::default(),
            ladder: PitchLadder::default(),
            trail_length: DEFAULT_TRAIL_LENGTH,
            history_length: DEFAULT_HISTORY_LENGTH,
        }
    }
}

/// One rendered tick.
#[derive(Debug, Clone)]
pub struct CockpitFrame {
    /// Tick counter, starting at 1.
    pub tick: u64,
    pub state: DisplayState,
    pub link_mode: LinkMode,
    /// Time since telemetry last arrived.
    pub link_age: Option<Duration>,
    /// Projected model vertices, one per mesh vertex.
    pub projected: Vec<Option<ScreenPoint>>,
    pub edges: Vec<VisibleEdge>,
    pub horizon: HorizonLine,
    pub ladder: Vec<LadderRung>,
    pub trail: Vec<TrailSegment>,
    /// Smoothed roll and pitch of recent ticks, this one included.
    pub history: AttitudeHistory,
    /// `None` when the map is disabled.
    pub map_status: Option<MapStatus>,
    /// Whether a new map image was installed this tick.
    pub map_updated: bool,
}

impl CockpitFrame {
    pub fn status(&self) -> CockpitStatus {
        CockpitStatus {
            tick: self.tick,
            link: self.link_mode.as_str(),
            roll: self.state.roll,
            pitch: self.state.pitch,
            heading: self.state.heading,
            altitude: self.state.altitude,
            latitude: self.state.latitude,
            longitude: self.state.longitude,
            safety_score: self.state.safety_score,
            status: self.state.status.as_str(),
            armed: self.state.armed,
            gps: self.state.gps_fix.as_str(),
            satellites: self.state.satellites,
            battery: self.state.battery,
            visible_edges: self.edges.len(),
            map: self.map_status.map(|s| s.as_str()),
        }
    }
}

/// Compact, serializable summary of a frame for logs and status lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CockpitStatus {
    pub tick: u64,
    pub link: &'static str,
    pub roll: f64,
    pub pitch: f64,
    pub heading: f64,
    pub altitude: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub safety_score: f64,
    pub status: &'static str,
    pub armed: bool,
    pub gps: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub satellites: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
    pub visible_edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<&'static str>,
}

/// Owns the pipeline and produces one [`CockpitFrame`] per tick.
pub struct Cockpit {
    link: TelemetryLink,
    smoother: StateSmoother,
    map: Option<TilePrefetcher>,
    kernel: OrientationKernel,
    mesh: Mesh,
    horizon: Horizon,
    ladder: PitchLadder,
    trail: Trail,
    history: AttitudeHistory,
    ticks: u64,
}

impl std::fmt::Debug for Cockpit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cockpit")
            .field("link", &self.link)
            .field("map", &self.map)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl Cockpit {
    pub fn new(link: TelemetryLink, config: CockpitConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            link,
            smoother: StateSmoother::new(config.smoothing)?,
            map: None,
            kernel: config.kernel,
            mesh: config.mesh,
            horizon: config.horizon,
            ladder: config.ladder,
            trail: Trail::new(config.trail_length),
            history: AttitudeHistory::new(config.history_length),
            ticks: 0,
        })
    }

    /// Attach a map prefetcher.
    pub fn with_map(mut self, map: TilePrefetcher) -> Self {
        self.map = Some(map);
        self
    }

    /// Start the telemetry link. Never fails; see [`TelemetryLink::start`].
    pub fn start(&mut self) {
        self.link.start();
        info!(
            link = %self.link.mode(),
            map = self.map.is_some(),
            "Cockpit started"
        );
    }

    /// Run one render tick.
    pub fn tick(&mut self) -> CockpitFrame {
        self.ticks += 1;

        let snapshot = self.link.latest();
        let state = self.smoother.tick(&snapshot.frame).clone();

        let (map_status, map_updated) = match self.map.as_mut() {
            Some(map) => {
                let updated = map.drain();
                map.update_with_fix(state.latitude, state.longitude, state.gps_fix);
                (Some(map.status()), updated)
            }
            None => (None, false),
        };

        let attitude = Attitude::from(&state);
        let projected = self.kernel.project(attitude, self.mesh.vertices());
        let edges = self.mesh.visible_edges(&projected).collect();
        self.trail
            .push_projected(self.kernel.project_point(attitude, self.mesh.anchor()));
        self.history.push(state.roll, state.pitch);

        let convention = &self.kernel.convention;
        let viewport = &self.kernel.viewport;

        CockpitFrame {
            tick: self.ticks,
            horizon: self.horizon.line(attitude, convention, viewport),
            ladder: self.ladder.rungs(attitude, convention, viewport),
            trail: self.trail.segments(),
            history: self.history.clone(),
            link_mode: snapshot.mode,
            link_age: snapshot.age(),
            state,
            projected,
            edges,
            map_status,
            map_updated,
        }
    }

    /// Queue a command for the board. `false` when offline.
    pub fn send(&self, command: &str) -> bool {
        self.link.send(command)
    }

    pub fn link(&self) -> &TelemetryLink {
        &self.link
    }

    pub fn map(&self) -> Option<&TilePrefetcher> {
        self.map.as_ref()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn history(&self) -> &AttitudeHistory {
        &self.history
    }

    /// Stop background workers. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.link.stop();
        if let Some(map) = self.map.as_mut() {
            map.stop();
        }
    }
}

impl Drop for Cockpit {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::LinkConfig;
    use crate::transport::{MemoryOpener, MemoryTransport};
    use std::sync::Arc;
    use std::time::Instant;

    fn cockpit() -> (Cockpit, crate::transport::MemoryHandle) {
        let (transport, board) = MemoryTransport::pair();
        let link = TelemetryLink::new(Arc::new(MemoryOpener::new(transport)), LinkConfig::default());
        let config = CockpitConfig {
            smoothing: SmoothingConfig::uniform(1.0),
            ..CockpitConfig::default()
        };
        (Cockpit::new(link, config).unwrap(), board)
    }

    #[test]
    fn test_level_frame() {
        let (mut cockpit, _board) = cockpit();
        cockpit.start();
        let frame = cockpit.tick();

        assert_eq!(frame.tick, 1);
        assert_eq!(frame.link_mode, LinkMode::Online);
        assert_eq!(frame.projected.len(), 20);
        assert_eq!(frame.edges.len(), 28);
        assert!(frame.map_status.is_none());
        assert!(frame.trail.is_empty(), "one point makes no segment");
        assert_eq!(frame.state.safety_score, 100.0);
    }

    #[test]
    fn test_frame_follows_telemetry() {
        let (mut cockpit, board) = cockpit();
        cockpit.start();
        board.feed(b"{\"r\":15,\"p\":-5,\"alt\":120,\"st\":1}\n");

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut frame = cockpit.tick();
        while frame.state.altitude != 120.0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
            frame = cockpit.tick();
        }
        let frame = cockpit.tick();

        assert_eq!(frame.state.roll, 15.0);
        assert_eq!(frame.state.pitch, -5.0);
        assert!(frame.horizon.angle().abs() > 1.0);
        assert_eq!(frame.status().status, "TURBULENCE");
        assert!(frame.trail.len() >= 1);
    }

    /// Tick until the smoothed attitude reaches `(roll, pitch)`.
    fn tick_to(cockpit: &mut Cockpit, roll: f64, pitch: f64) -> CockpitFrame {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let frame = cockpit.tick();
            let reached = frame.state.roll == roll && frame.state.pitch == pitch;
            if reached || Instant::now() >= deadline {
                return frame;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_trail_moves_with_attitude() {
        let (mut cockpit, board) = cockpit();
        cockpit.start();

        cockpit.tick();
        for (roll, pitch) in [(30.0, 20.0), (-40.0, -25.0), (60.0, 45.0)] {
            board.feed(format!("{{\"r\":{},\"p\":{}}}\n", roll, pitch).as_bytes());
            let frame = tick_to(&mut cockpit, roll, pitch);
            assert_eq!((frame.state.roll, frame.state.pitch), (roll, pitch));

            // Alpha 1: the newest segment spans the whole attitude change.
            let newest = frame.trail.last().unwrap();
            let length = (newest.to.x - newest.from.x).hypot(newest.to.y - newest.from.y);
            assert!(length > 1.0, "segment to ({}, {}) is {} px", roll, pitch, length);
        }
    }

    #[test]
    fn test_history_records_every_tick() {
        let (mut cockpit, board) = cockpit();
        cockpit.start();
        board.feed(b"{\"r\":12,\"p\":-4}\n");
        let frame = tick_to(&mut cockpit, 12.0, -4.0);

        let expected = frame.tick.min(DEFAULT_HISTORY_LENGTH as u64);
        assert_eq!(frame.history.len() as u64, expected);
        assert_eq!(frame.history.latest(), Some((12.0, -4.0)));
        assert_eq!(frame.history.capacity(), DEFAULT_HISTORY_LENGTH);

        for _ in 0..DEFAULT_HISTORY_LENGTH {
            cockpit.tick();
        }
        assert_eq!(cockpit.history().len(), DEFAULT_HISTORY_LENGTH);
    }

    #[test]
    fn test_status_reports_gps_fix() {
        let (mut cockpit, board) = cockpit();
        cockpit.start();
        board.feed(b"{\"sats\":3,\"bat\":11.1,\"lat\":51.5,\"lon\":-0.12}\n");

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut frame = cockpit.tick();
        while frame.state.satellites.is_none() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
            frame = cockpit.tick();
        }

        let status = frame.status();
        assert_eq!(status.gps, "NO FIX");
        assert_eq!(status.satellites, Some(3));
        assert_eq!(status.battery, Some(11.1));
    }

    #[test]
    fn test_status_serializes() {
        let (mut cockpit, _board) = cockpit();
        let frame = cockpit.tick();
        let json = serde_json::to_value(frame.status()).unwrap();
        assert_eq!(json["link"], "idle");
        assert_eq!(json["gps"], "NO GPS DATA");
        assert!(json.get("map").is_none());
        assert!(json.get("satellites").is_none());
    }

    #[test]
    fn test_invalid_smoothing_rejected() {
        let (transport, _board) = MemoryTransport::pair();
        let link = TelemetryLink::new(Arc::new(MemoryOpener::new(transport)), LinkConfig::default());
        let config = CockpitConfig {
            smoothing: SmoothingConfig::uniform(0.0),
            ..CockpitConfig::default()
        };
        assert!(Cockpit::new(link, config).is_err());
    }
}
