//! Addressable configuration keys (`section.key`).
//!
//! Every setting in `config.ini` has a [`ConfigKey`]. Loading a file, the
//! `config set` command and `config list` all go through [`ConfigKey::set`]
//! and [`ConfigKey::get`], so validation lives in one place.

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};
use crate::coord::MAX_ZOOM;
use crate::kernel::{Mesh, MESH_NAMES};
use crate::map::ColorRemap;
use crate::provider::ProviderConfig;

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    LinkPort,
    LinkBaudRate,
    LinkSimulate,
    LinkSimulateRate,
    LinkReadTimeout,
    LinkIdleSleep,

    DisplayFps,
    DisplayWidth,
    DisplayHeight,
    DisplayFov,
    DisplayModel,
    DisplayModelScale,
    DisplayTrailLength,
    DisplayHistoryLength,
    DisplayPxPerDegree,

    SmoothingAttitudeAlpha,
    SmoothingAltitudeAlpha,
    SmoothingScoreAlpha,
    SmoothingTurnDeadband,
    SmoothingTurnGain,

    MapEnabled,
    MapProvider,
    MapZoom,
    MapThreshold,
    MapWidth,
    MapHeight,
    MapRemap,
    MapTimeout,

    LoggingLevel,
    LoggingDirectory,
    LoggingFile,
}

const ALL_KEYS: [ConfigKey; 31] = [
    ConfigKey::LinkPort,
    ConfigKey::LinkBaudRate,
    ConfigKey::LinkSimulate,
    ConfigKey::LinkSimulateRate,
    ConfigKey::LinkReadTimeout,
    ConfigKey::LinkIdleSleep,
    ConfigKey::DisplayFps,
    ConfigKey::DisplayWidth,
    ConfigKey::DisplayHeight,
    ConfigKey::DisplayFov,
    ConfigKey::DisplayModel,
    ConfigKey::DisplayModelScale,
    ConfigKey::DisplayTrailLength,
    ConfigKey::DisplayHistoryLength,
    ConfigKey::DisplayPxPerDegree,
    ConfigKey::SmoothingAttitudeAlpha,
    ConfigKey::SmoothingAltitudeAlpha,
    ConfigKey::SmoothingScoreAlpha,
    ConfigKey::SmoothingTurnDeadband,
    ConfigKey::SmoothingTurnGain,
    ConfigKey::MapEnabled,
    ConfigKey::MapProvider,
    ConfigKey::MapZoom,
    ConfigKey::MapThreshold,
    ConfigKey::MapWidth,
    ConfigKey::MapHeight,
    ConfigKey::MapRemap,
    ConfigKey::MapTimeout,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingDirectory,
    ConfigKey::LoggingFile,
];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// INI section and key.
    fn parts(&self) -> (&'static str, &'static str) {
        use ConfigKey::*;
        match self {
            LinkPort => ("link", "port"),
            LinkBaudRate => ("link", "baud_rate"),
            LinkSimulate => ("link", "simulate"),
            LinkSimulateRate => ("link", "simulate_rate_hz"),
            LinkReadTimeout => ("link", "read_timeout_ms"),
            LinkIdleSleep => ("link", "idle_sleep_ms"),

            DisplayFps => ("display", "fps"),
            DisplayWidth => ("display", "width"),
            DisplayHeight => ("display", "height"),
            DisplayFov => ("display", "fov"),
            DisplayModel => ("display", "model"),
            DisplayModelScale => ("display", "model_scale"),
            DisplayTrailLength => ("display", "trail_length"),
            DisplayHistoryLength => ("display", "history_length"),
            DisplayPxPerDegree => ("display", "px_per_degree"),

            SmoothingAttitudeAlpha => ("smoothing", "attitude_alpha"),
            SmoothingAltitudeAlpha => ("smoothing", "altitude_alpha"),
            SmoothingScoreAlpha => ("smoothing", "score_alpha"),
            SmoothingTurnDeadband => ("smoothing", "turn_deadband_deg"),
            SmoothingTurnGain => ("smoothing", "turn_gain"),

            MapEnabled => ("map", "enabled"),
            MapProvider => ("map", "provider"),
            MapZoom => ("map", "zoom"),
            MapThreshold => ("map", "threshold_deg"),
            MapWidth => ("map", "width"),
            MapHeight => ("map", "height"),
            MapRemap => ("map", "remap"),
            MapTimeout => ("map", "timeout_secs"),

            LoggingLevel => ("logging", "level"),
            LoggingDirectory => ("logging", "directory"),
            LoggingFile => ("logging", "file"),
        }
    }

    pub fn section(&self) -> &'static str {
        self.parts().0
    }

    pub fn key_name(&self) -> &'static str {
        self.parts().1
    }

    /// `section.key`
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as written to the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        use ConfigKey::*;
        let link = &config.link;
        let display = &config.display;
        let smoothing = &config.smoothing;
        let map = &config.map;
        let logging = &config.logging;

        match self {
            LinkPort => link.port.clone(),
            LinkBaudRate => link.baud_rate.to_string(),
            LinkSimulate => link.simulate.to_string(),
            LinkSimulateRate => link.simulate_rate_hz.to_string(),
            LinkReadTimeout => link.read_timeout_ms.to_string(),
            LinkIdleSleep => link.idle_sleep_ms.to_string(),

            DisplayFps => display.fps.to_string(),
            DisplayWidth => display.width.to_string(),
            DisplayHeight => display.height.to_string(),
            DisplayFov => display.fov.to_string(),
            DisplayModel => display.model.clone(),
            DisplayModelScale => display.model_scale.to_string(),
            DisplayTrailLength => display.trail_length.to_string(),
            DisplayHistoryLength => display.history_length.to_string(),
            DisplayPxPerDegree => display.px_per_degree.to_string(),

            SmoothingAttitudeAlpha => smoothing.attitude_alpha.to_string(),
            SmoothingAltitudeAlpha => smoothing.altitude_alpha.to_string(),
            SmoothingScoreAlpha => smoothing.score_alpha.to_string(),
            SmoothingTurnDeadband => smoothing.turn_deadband_deg.to_string(),
            SmoothingTurnGain => smoothing.turn_gain.to_string(),

            MapEnabled => map.enabled.to_string(),
            MapProvider => map.provider.to_string(),
            MapZoom => map.zoom.to_string(),
            MapThreshold => map.threshold_deg.to_string(),
            MapWidth => map.width.to_string(),
            MapHeight => map.height.to_string(),
            MapRemap => map.remap.to_string(),
            MapTimeout => map.timeout_secs.to_string(),

            LoggingLevel => logging.level.clone(),
            LoggingDirectory => logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
            LoggingFile => logging.file.to_string(),
        }
    }

    /// Parse, validate and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        use ConfigKey::*;
        let value = value.trim();

        match self {
            LinkPort => {
                if value.is_empty() {
                    return Err(self.invalid(value, "port must not be empty"));
                }
                config.link.port = value.to_string();
            }
            LinkBaudRate => config.link.baud_rate = self.parse_positive(value)?,
            LinkSimulate => config.link.simulate = self.parse_bool(value)?,
            LinkSimulateRate => config.link.simulate_rate_hz = self.parse_positive_f64(value)?,
            LinkReadTimeout => config.link.read_timeout_ms = self.parse(value)?,
            LinkIdleSleep => config.link.idle_sleep_ms = self.parse_positive(value)?,

            DisplayFps => {
                let fps: u32 = self.parse(value)?;
                if !(1..=240).contains(&fps) {
                    return Err(self.invalid(value, "expected 1 to 240"));
                }
                config.display.fps = fps;
            }
            DisplayWidth => config.display.width = self.parse_positive_f64(value)?,
            DisplayHeight => config.display.height = self.parse_positive_f64(value)?,
            DisplayFov => config.display.fov = self.parse_positive_f64(value)?,
            DisplayModel => {
                if Mesh::named(value).is_none() {
                    return Err(self.invalid(
                        value,
                        &format!("expected one of {}", MESH_NAMES.join(", ")),
                    ));
                }
                config.display.model = value.to_string();
            }
            DisplayModelScale => config.display.model_scale = self.parse_positive_f64(value)?,
            DisplayTrailLength => config.display.trail_length = self.parse(value)?,
            DisplayHistoryLength => config.display.history_length = self.parse(value)?,
            DisplayPxPerDegree => config.display.px_per_degree = self.parse_positive_f64(value)?,

            SmoothingAttitudeAlpha => config.smoothing.attitude_alpha = self.parse_alpha(value)?,
            SmoothingAltitudeAlpha => config.smoothing.altitude_alpha = self.parse_alpha(value)?,
            SmoothingScoreAlpha => config.smoothing.score_alpha = self.parse_alpha(value)?,
            SmoothingTurnDeadband => {
                config.smoothing.turn_deadband_deg = self.parse_non_negative(value)?
            }
            SmoothingTurnGain => config.smoothing.turn_gain = self.parse_non_negative(value)?,

            MapEnabled => config.map.enabled = self.parse_bool(value)?,
            MapProvider => {
                config.map.provider =
                    ProviderConfig::parse(value).map_err(|e| self.invalid(value, &e))?
            }
            MapZoom => {
                let zoom: u8 = self.parse(value)?;
                if zoom > MAX_ZOOM {
                    return Err(self.invalid(value, &format!("maximum zoom is {}", MAX_ZOOM)));
                }
                config.map.zoom = zoom;
            }
            MapThreshold => config.map.threshold_deg = self.parse_non_negative(value)?,
            MapWidth => config.map.width = self.parse_positive(value)?,
            MapHeight => config.map.height = self.parse_positive(value)?,
            MapRemap => {
                config.map.remap = value
                    .parse::<ColorRemap>()
                    .map_err(|e| self.invalid(value, &e))?
            }
            MapTimeout => config.map.timeout_secs = self.parse_positive(value)?,

            LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(self.invalid(
                        value,
                        &format!("expected one of {}", LOG_LEVELS.join(", ")),
                    ));
                }
                config.logging.level = level;
            }
            LoggingDirectory => {
                config.logging.directory = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            LoggingFile => config.logging.file = self.parse_bool(value)?,
        }

        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        value
            .parse::<T>()
            .map_err(|e| self.invalid(value, &e.to_string()))
    }

    fn parse_positive<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
        T::Err: Display,
    {
        let parsed: T = self.parse(value)?;
        if parsed <= T::default() {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(parsed)
    }

    fn parse_positive_f64(&self, value: &str) -> Result<f64, ConfigError> {
        let parsed: f64 = self.parse(value)?;
        if !(parsed.is_finite() && parsed > 0.0) {
            return Err(self.invalid(value, "must be a positive number"));
        }
        Ok(parsed)
    }

    fn parse_non_negative(&self, value: &str) -> Result<f64, ConfigError> {
        let parsed: f64 = self.parse(value)?;
        if !(parsed.is_finite() && parsed >= 0.0) {
            return Err(self.invalid(value, "must be zero or a positive number"));
        }
        Ok(parsed)
    }

    fn parse_alpha(&self, value: &str) -> Result<f64, ConfigError> {
        let parsed: f64 = self.parse(value)?;
        if !(parsed > 0.0 && parsed <= 1.0) {
            return Err(ConfigError::InvalidAlpha {
                channel: self.key_name(),
                value: parsed,
            });
        }
        Ok(parsed)
    }

    fn parse_bool(&self, value: &str) -> Result<bool, ConfigError> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(self.invalid(value, "expected true or false")),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
