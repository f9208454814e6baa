//! Exponential smoothing of telemetry into a display state.
//!
//! The board reports attitude at an irregular rate and the link only keeps
//! the newest value, so raw telemetry jumps. The [`StateSmoother`] steps every
//! display channel towards its target once per render tick:
//!
//! ```text
//! display = display + (target - display) * alpha
//! ```
//!
//! Ticks are time-stepped, not event-stepped: when the link stalls the
//! display keeps coasting towards the last target instead of freezing.

mod channel;
mod history;

pub use channel::{wrap_degrees, HeadingIntegrator, SmoothedChannel};
pub use history::{AttitudeHistory, DEFAULT_HISTORY_LENGTH};

pub use crate::config::ConfigError;

use crate::telemetry::{FlightStatus, GpsFix, TelemetryFrame, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

/// Default responsiveness for roll and pitch.
pub const DEFAULT_ATTITUDE_ALPHA: f64 = 0.2;

/// Default responsiveness for altitude.
pub const DEFAULT_ALTITUDE_ALPHA: f64 = 0.1;

/// Default responsiveness for the safety score.
pub const DEFAULT_SCORE_ALPHA: f64 = 0.2;

/// Per-channel responsiveness.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingConfig {
    /// Alpha for roll and pitch.
    pub attitude_alpha: f64,
    /// Alpha for altitude.
    pub altitude_alpha: f64,
    /// Alpha for the safety score.
    pub score_alpha: f64,
    /// Heading integration from roll when the board reports no heading.
    pub heading: HeadingIntegrator,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            attitude_alpha: DEFAULT_ATTITUDE_ALPHA,
            altitude_alpha: DEFAULT_ALTITUDE_ALPHA,
            score_alpha: DEFAULT_SCORE_ALPHA,
            heading: HeadingIntegrator::default(),
        }
    }
}

impl SmoothingConfig {
    /// Same alpha for every channel.
    pub fn uniform(alpha: f64) -> Self {
        Self {
            attitude_alpha: alpha,
            altitude_alpha: alpha,
            score_alpha: alpha,
            heading: HeadingIntegrator::default(),
        }
    }

    /// Check every alpha lies in (0, 1].
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (channel, value) in [
            ("attitude", self.attitude_alpha),
            ("altitude", self.altitude_alpha),
            ("score", self.score_alpha),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidAlpha { channel, value });
            }
        }
        Ok(())
    }
}

/// What the drawing layer shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    /// Smoothed roll in degrees.
    pub roll: f64,
    /// Smoothed pitch in degrees.
    pub pitch: f64,
    /// Yaw in degrees, zero when the board does not report it.
    pub yaw: f64,
    /// Smoothed altitude in meters.
    pub altitude: f64,
    /// Heading in degrees, always in `[0, 360)`.
    pub heading: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Smoothed safety score.
    pub safety_score: f64,
    /// Board status.
    pub status: FlightStatus,
    /// Armed flag.
    pub armed: bool,
    /// Noise level.
    pub noise: f64,
    /// Satellites in view, if reported.
    pub satellites: Option<u32>,
    /// GPS fix derived from `satellites`.
    pub gps_fix: GpsFix,
    /// Battery voltage, if reported.
    pub battery: Option<f64>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            altitude: 0.0,
            heading: 0.0,
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            safety_score: 100.0,
            status: FlightStatus::Stable,
            armed: false,
            noise: 0.0,
            satellites: None,
            gps_fix: GpsFix::Unknown,
            battery: None,
        }
    }
}

/// Steps a [`DisplayState`] towards the latest telemetry once per tick.
#[derive(Debug, Clone)]
pub struct StateSmoother {
    roll: SmoothedChannel,
    pitch: SmoothedChannel,
    altitude: SmoothedChannel,
    score: SmoothedChannel,
    heading: HeadingIntegrator,
    initial: DisplayState,
    state: DisplayState,
}

impl StateSmoother {
    /// Create a smoother starting from [`DisplayState::default`].
    pub fn new(config: SmoothingConfig) -> Result<Self, ConfigError> {
        Self::with_initial(config, DisplayState::default())
    }

    /// Create a smoother starting from `initial`.
    pub fn with_initial(config: SmoothingConfig, initial: DisplayState) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            roll: SmoothedChannel::new(initial.roll, config.attitude_alpha),
            pitch: SmoothedChannel::new(initial.pitch, config.attitude_alpha),
            altitude: SmoothedChannel::new(initial.altitude, config.altitude_alpha),
            score: SmoothedChannel::new(initial.safety_score, config.score_alpha),
            heading: config.heading,
            state: initial.clone(),
            initial,
        })
    }

    /// Advance one tick towards `target`.
    ///
    /// Channels absent from `target` coast towards their previous target.
    pub fn tick(&mut self, target: &TelemetryFrame) -> &DisplayState {
        self.state.roll = self.roll.step(target.roll());
        self.state.pitch = self.pitch.step(target.pitch());
        self.state.altitude = self.altitude.step(target.altitude());
        self.state.safety_score = self.score.step(target.safety_score());

        let yaw = target.yaw();
        self.state.yaw = yaw.unwrap_or(0.0);
        self.state.heading = match yaw {
            Some(reported) => wrap_degrees(reported),
            None => self.heading.integrate(self.state.heading, self.state.roll),
        };

        if let Some(lat) = target.latitude() {
            self.state.latitude = lat;
        }
        if let Some(lon) = target.longitude() {
            self.state.longitude = lon;
        }
        if let Some(noise) = target.noise() {
            self.state.noise = noise;
        }
        if let Some(satellites) = target.satellites() {
            self.state.satellites = Some(satellites);
            self.state.gps_fix = GpsFix::from_satellites(satellites);
        }
        if let Some(battery) = target.battery() {
            self.state.battery = Some(battery);
        }
        self.state.status = target.status();
        self.state.armed = target.armed();

        &self.state
    }

    /// Current display state.
    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    /// Return to the initial state.
    pub fn reset(&mut self) {
        self.roll.reset(self.initial.roll);
        self.pitch.reset(self.initial.pitch);
        self.altitude.reset(self.initial.altitude);
        self.score.reset(self.initial.safety_score);
        self.state = self.initial.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pairs: &[(&str, f64)]) -> TelemetryFrame {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_half_alpha_two_ticks() {
        let mut smoother = StateSmoother::new(SmoothingConfig::uniform(0.5)).unwrap();
        let target = frame(&[("r", 10.0), ("p", 5.0)]);

        let first = smoother.tick(&target).clone();
        assert_eq!(first.roll, 5.0);
        assert_eq!(first.pitch, 2.5);

        let second = smoother.tick(&target);
        assert_eq!(second.roll, 7.5);
        assert_eq!(second.pitch, 3.75);
    }

    #[test]
    fn test_alpha_one_snaps() {
        let mut smoother = StateSmoother::new(SmoothingConfig::uniform(1.0)).unwrap();
        let state = smoother.tick(&frame(&[("alt", 250.0)]));
        assert_eq!(state.altitude, 250.0);
    }

    #[test]
    fn test_invalid_alpha_rejected() {
        for alpha in [0.0, -0.1, 1.5, f64::NAN] {
            let result = StateSmoother::new(SmoothingConfig::uniform(alpha));
            assert!(
                matches!(result, Err(ConfigError::InvalidAlpha { .. })),
                "alpha {} should be rejected",
                alpha
            );
        }
    }

    #[test]
    fn test_coasts_when_link_stalls() {
        let mut smoother = StateSmoother::new(SmoothingConfig::uniform(0.5)).unwrap();
        smoother.tick(&frame(&[("r", 8.0)]));

        // Same snapshot again: display keeps moving towards 8.
        let roll = smoother.tick(&frame(&[("r", 8.0)])).roll;
        assert_eq!(roll, 6.0);
    }

    #[test]
    fn test_absent_channel_keeps_last_target() {
        let mut smoother = StateSmoother::new(SmoothingConfig::uniform(0.5)).unwrap();
        smoother.tick(&frame(&[("alt", 100.0)]));
        let altitude = smoother.tick(&TelemetryFrame::new()).altitude;
        assert_eq!(altitude, 75.0);
    }

    #[test]
    fn test_heading_integrates_from_roll_and_wraps() {
        let config = SmoothingConfig::uniform(1.0);
        let mut smoother = StateSmoother::with_initial(
            config,
            DisplayState {
                heading: 359.5,
                ..DisplayState::default()
            },
        )
        .unwrap();

        let heading = smoother.tick(&frame(&[("r", 20.0)])).heading;
        assert!((heading - 0.5).abs() < 1e-9, "heading {}", heading);

        let heading = smoother.tick(&frame(&[("r", -20.0)])).heading;
        assert!((heading - 359.5).abs() < 1e-9, "heading {}", heading);
    }

    #[test]
    fn test_reported_heading_wins() {
        let mut smoother = StateSmoother::new(SmoothingConfig::default()).unwrap();
        let state = smoother.tick(&frame(&[("hdg", -90.0), ("r", 30.0)]));
        assert_eq!(state.heading, 270.0);
        assert_eq!(state.yaw, -90.0);
    }

    #[test]
    fn test_pass_through_channels() {
        let mut smoother = StateSmoother::new(SmoothingConfig::default()).unwrap();
        let state = smoother.tick(&frame(&[
            ("lat", 51.5),
            ("lon", -0.12),
            ("st", 2.0),
            ("arm", 1.0),
            ("noise", 33.0),
        ]));

        assert_eq!(state.latitude, 51.5);
        assert_eq!(state.longitude, -0.12);
        assert_eq!(state.status, FlightStatus::CrashPredicted);
        assert!(state.armed);
        assert_eq!(state.noise, 33.0);
    }

    #[test]
    fn test_gps_fix_follows_satellites() {
        let mut smoother = StateSmoother::new(SmoothingConfig::default()).unwrap();
        assert_eq!(smoother.state().gps_fix, GpsFix::Unknown);

        let state = smoother.tick(&frame(&[("sats", 2.0), ("bat", 12.4)]));
        assert_eq!(state.satellites, Some(2));
        assert_eq!(state.gps_fix, GpsFix::NoFix);
        assert_eq!(state.battery, Some(12.4));

        let state = smoother.tick(&frame(&[("sats", 9.0)]));
        assert_eq!(state.gps_fix, GpsFix::Fix3d);
        assert_eq!(state.battery, Some(12.4), "battery keeps its last value");
    }

    #[test]
    fn test_reset() {
        let mut smoother = StateSmoother::new(SmoothingConfig::uniform(1.0)).unwrap();
        smoother.tick(&frame(&[("r", 45.0)]));
        smoother.reset();
        assert_eq!(smoother.state(), &DisplayState::default());
        let roll = smoother.tick(&TelemetryFrame::new()).roll;
        assert_eq!(roll, 0.0, "reset also clears the remembered target");
    }
}
