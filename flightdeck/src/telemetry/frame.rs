//! Decoded telemetry records.
//!
//! A [`TelemetryFrame`] is a flat map of short field codes to numeric values,
//! exactly as the sensor board emits them. Fields are optional: a record that
//! reports only `r` says nothing about altitude, and merging it into a
//! previous frame keeps the previous altitude.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

/// Field codes used on the wire.
pub mod fields {
    /// Roll angle in degrees.
    pub const ROLL: &str = "r";
    /// Pitch angle in degrees.
    pub const PITCH: &str = "p";
    /// Yaw angle in degrees (optional, most boards do not report it).
    pub const YAW: &str = "y";
    /// Heading in degrees (alternative to yaw).
    pub const HEADING: &str = "hdg";
    /// Altitude in meters.
    pub const ALTITUDE: &str = "alt";
    /// Latitude in degrees.
    pub const LATITUDE: &str = "lat";
    /// Longitude in degrees.
    pub const LONGITUDE: &str = "lon";
    /// On-board safety score, 0-100.
    pub const SAFETY_SCORE: &str = "as";
    /// On-board status code, see [`FlightStatus`](super::FlightStatus).
    pub const STATUS: &str = "st";
    /// Armed flag.
    pub const ARMED: &str = "arm";
    /// Microphone noise level.
    pub const NOISE: &str = "noise";
    /// SD card logging flag.
    pub const SD_CARD: &str = "sd";
    /// Number of GPS satellites in view.
    pub const SATELLITES: &str = "sats";
    /// Battery voltage.
    pub const BATTERY: &str = "bat";
}

/// Position reported before the first GPS fix.
pub const DEFAULT_LATITUDE: f64 = 42.87;
/// See [`DEFAULT_LATITUDE`].
pub const DEFAULT_LONGITUDE: f64 = 74.56;

/// Classification of the board's `st` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightStatus {
    /// Flight is stable (`st = 0`).
    #[default]
    Stable,
    /// Turbulence detected (`st = 1`).
    Turbulence,
    /// The on-board model predicts a crash (`st = 2`).
    CrashPredicted,
    /// Any other code.
    Unknown,
}

impl FlightStatus {
    /// Map a raw status code to a status.
    pub fn from_code(code: f64) -> Self {
        match code.round() as i64 {
            0 => FlightStatus::Stable,
            1 => FlightStatus::Turbulence,
            2 => FlightStatus::CrashPredicted,
            _ => FlightStatus::Unknown,
        }
    }

    /// Short label for status lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Stable => "STABLE",
            FlightStatus::Turbulence => "TURBULENCE",
            FlightStatus::CrashPredicted => "CRASH PREDICTED",
            FlightStatus::Unknown => "UNKNOWN",
        }
    }

    /// Whether the status calls for a warning on the display.
    pub fn is_alert(&self) -> bool {
        matches!(self, FlightStatus::Turbulence | FlightStatus::CrashPredicted)
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fewest satellites that give a 3D position.
pub const MIN_FIX_SATELLITES: u32 = 4;

/// GPS receiver state, derived from the satellite count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpsFix {
    /// The board does not report a satellite count.
    #[default]
    Unknown,
    /// Fewer than [`MIN_FIX_SATELLITES`] in view.
    NoFix,
    /// Enough satellites for a 3D position.
    Fix3d,
}

impl GpsFix {
    pub fn from_satellites(count: u32) -> Self {
        if count < MIN_FIX_SATELLITES {
            GpsFix::NoFix
        } else {
            GpsFix::Fix3d
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GpsFix::Unknown => "NO GPS DATA",
            GpsFix::NoFix => "NO FIX",
            GpsFix::Fix3d => "3D FIX LOCKED",
        }
    }

    /// Whether the reported position should be ignored.
    pub fn is_lost(&self) -> bool {
        *self == GpsFix::NoFix
    }
}

impl fmt::Display for GpsFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded telemetry record, or the merge of several.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryFrame {
    values: BTreeMap<String, f64>,
}

impl TelemetryFrame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// The state the dashboards show before any telemetry arrives.
    pub fn cockpit_defaults() -> Self {
        [
            (fields::ROLL, 0.0),
            (fields::PITCH, 0.0),
            (fields::ALTITUDE, 0.0),
            (fields::SAFETY_SCORE, 100.0),
            (fields::STATUS, 0.0),
            (fields::ARMED, 0.0),
            (fields::NOISE, 0.0),
            (fields::LATITUDE, DEFAULT_LATITUDE),
            (fields::LONGITUDE, DEFAULT_LONGITUDE),
        ]
        .into_iter()
        .collect()
    }

    /// Build a frame from a parsed JSON object.
    ///
    /// Numbers are kept as-is, booleans become `1.0`/`0.0`, every other value
    /// type is ignored.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let values = object
            .iter()
            .filter_map(|(key, value)| {
                let number = match value {
                    Value::Number(n) => n.as_f64()?,
                    Value::Bool(b) => f64::from(u8::from(*b)),
                    _ => return None,
                };
                number.is_finite().then(|| (key.clone(), number))
            })
            .collect();
        Self { values }
    }

    /// Get a field value by code.
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Get a field value, falling back to `default` when absent.
    pub fn get_or(&self, field: &str, default: f64) -> f64 {
        self.get(field).unwrap_or(default)
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: f64) {
        self.values.insert(field.into(), value);
    }

    /// Merge `newer` into this frame, field by field. Newer values win.
    pub fn merge(&mut self, newer: &TelemetryFrame) {
        for (key, value) in &newer.values {
            self.values.insert(key.clone(), *value);
        }
    }

    /// Whether the field is present.
    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the frame has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn roll(&self) -> Option<f64> {
        self.get(fields::ROLL)
    }

    pub fn pitch(&self) -> Option<f64> {
        self.get(fields::PITCH)
    }

    /// Yaw, or heading when the board reports it under `hdg`.
    pub fn yaw(&self) -> Option<f64> {
        self.get(fields::YAW).or_else(|| self.get(fields::HEADING))
    }

    pub fn altitude(&self) -> Option<f64> {
        self.get(fields::ALTITUDE)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.get(fields::LATITUDE)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.get(fields::LONGITUDE)
    }

    pub fn safety_score(&self) -> Option<f64> {
        self.get(fields::SAFETY_SCORE)
    }

    pub fn noise(&self) -> Option<f64> {
        self.get(fields::NOISE)
    }

    /// Satellites in view. Negative counts read as zero.
    pub fn satellites(&self) -> Option<u32> {
        self.get(fields::SATELLITES)
            .map(|count| count.round().clamp(0.0, f64::from(u32::MAX)) as u32)
    }

    /// Battery voltage.
    pub fn battery(&self) -> Option<f64> {
        self.get(fields::BATTERY)
    }

    /// Fix state, `Unknown` when the board has not reported satellites.
    pub fn gps_fix(&self) -> GpsFix {
        self.satellites()
            .map(GpsFix::from_satellites)
            .unwrap_or_default()
    }

    /// Status classification, `Stable` when the board has not reported one.
    pub fn status(&self) -> FlightStatus {
        self.get(fields::STATUS)
            .map(FlightStatus::from_code)
            .unwrap_or_default()
    }

    /// Armed flag; any non-zero value counts as armed.
    pub fn armed(&self) -> bool {
        self.get(fields::ARMED).is_some_and(|v| v != 0.0)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for TelemetryFrame {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
