//! Persistent configuration in `config.ini`.
//!
//! The file lives at `~/.config/flightdeck/config.ini` (platform config dir)
//! and has one section per subsystem:
//!
//! ```ini
//! [link]
//! port = /dev/ttyUSB0
//! baud_rate = 921600
//! simulate = false
//!
//! [display]
//! fps = 60
//! model = quadcopter
//!
//! [smoothing]
//! attitude_alpha = 0.2
//!
//! [map]
//! enabled = true
//! provider = imagery
//! zoom = 13
//!
//! [logging]
//! level = info
//! ```
//!
//! A missing file yields [`ConfigFile::default`]. Values are validated by
//! [`ConfigKey::set`] on load, so a file that loads is a file the runtime
//! builders accept.

mod keys;

pub use keys::ConfigKey;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cockpit::{CockpitConfig, DEFAULT_MODEL_SCALE, DEFAULT_TICK_RATE_HZ};
use crate::kernel::{
    AxisConvention, Horizon, Mesh, OrientationKernel, PitchLadder, Transform, Viewport,
    DEFAULT_FOV, DEFAULT_HEIGHT, DEFAULT_PX_PER_DEGREE, DEFAULT_TRAIL_LENGTH, DEFAULT_WIDTH,
};
use crate::link::{LinkConfig, DEFAULT_IDLE_SLEEP};
use crate::map::{
    ColorRemap, MapConfig, DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, DEFAULT_THRESHOLD_DEG,
    DEFAULT_ZOOM,
};
use crate::provider::{ProviderConfig, DEFAULT_TIMEOUT};
use crate::smoother::{
    HeadingIntegrator, SmoothingConfig, DEFAULT_ALTITUDE_ALPHA, DEFAULT_ATTITUDE_ALPHA,
    DEFAULT_HISTORY_LENGTH, DEFAULT_SCORE_ALPHA,
};
use crate::transport::{
    SerialConfig, DEFAULT_BAUD_RATE, DEFAULT_PORT, DEFAULT_RATE_HZ, DEFAULT_READ_TIMEOUT,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid smoothing factor for {channel}: {value} (expected 0 < alpha <= 1)")]
    InvalidAlpha { channel: &'static str, value: f64 },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `[link]`
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    pub port: String,
    pub baud_rate: u32,
    /// Use the synthetic stream instead of a serial port.
    pub simulate: bool,
    pub simulate_rate_hz: f64,
    pub read_timeout_ms: u64,
    pub idle_sleep_ms: u64,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            simulate: false,
            simulate_rate_hz: DEFAULT_RATE_HZ,
            read_timeout_ms: DEFAULT_READ_TIMEOUT.as_millis() as u64,
            idle_sleep_ms: DEFAULT_IDLE_SLEEP.as_millis() as u64,
        }
    }
}

/// `[display]`
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub fps: u32,
    pub width: f64,
    pub height: f64,
    pub fov: f64,
    /// One of [`crate::kernel::MESH_NAMES`].
    pub model: String,
    pub model_scale: f64,
    pub trail_length: usize,
    /// Roll/pitch samples kept for the attitude graphs.
    pub history_length: usize,
    /// Shared by the horizon and the pitch ladder.
    pub px_per_degree: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_TICK_RATE_HZ,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fov: DEFAULT_FOV,
            model: "quadcopter".to_string(),
            model_scale: DEFAULT_MODEL_SCALE,
            trail_length: DEFAULT_TRAIL_LENGTH,
            history_length: DEFAULT_HISTORY_LENGTH,
            px_per_degree: DEFAULT_PX_PER_DEGREE,
        }
    }
}

/// `[smoothing]`
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingSettings {
    pub attitude_alpha: f64,
    pub altitude_alpha: f64,
    pub score_alpha: f64,
    pub turn_deadband_deg: f64,
    pub turn_gain: f64,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        let heading = HeadingIntegrator::default();
        Self {
            attitude_alpha: DEFAULT_ATTITUDE_ALPHA,
            altitude_alpha: DEFAULT_ALTITUDE_ALPHA,
            score_alpha: DEFAULT_SCORE_ALPHA,
            turn_deadband_deg: heading.deadband_deg,
            turn_gain: heading.gain,
        }
    }
}

/// `[map]`
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub enabled: bool,
    pub provider: ProviderConfig,
    pub zoom: u8,
    pub threshold_deg: f64,
    pub width: u32,
    pub height: u32,
    pub remap: ColorRemap,
    pub timeout_secs: u64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: ProviderConfig::default(),
            zoom: DEFAULT_ZOOM,
            threshold_deg: DEFAULT_THRESHOLD_DEG,
            width: DEFAULT_DISPLAY_WIDTH,
            height: DEFAULT_DISPLAY_HEIGHT,
            remap: ColorRemap::None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    /// Log file directory. `None` uses [`default_log_dir`].
    pub directory: Option<PathBuf>,
    /// Write a daily rolling log file in addition to the console.
    pub file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file: true,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub link: LinkSettings,
    pub display: DisplaySettings,
    pub smoothing: SmoothingSettings,
    pub map: MapSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Build from a parsed INI document. Unknown keys are ignored with a
    /// warning, absent keys keep their defaults.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for (section, properties) in ini.iter() {
            let Some(section) = section else {
                continue;
            };
            for (key, value) in properties.iter() {
                let name = format!("{}.{}", section, key);
                match name.parse::<ConfigKey>() {
                    Ok(config_key) => config_key.set(&mut config, value)?,
                    Err(_) => warn!(key = %name, "Ignoring unknown configuration key"),
                }
            }
        }

        Ok(config)
    }

    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Rendered file contents.
    pub fn to_ini_string(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.to_ini().write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini().write_to_file(path).map_err(io_error)
    }

    pub fn serial_config(&self) -> SerialConfig {
        SerialConfig::new(self.link.port.clone(), self.link.baud_rate)
            .with_read_timeout(Duration::from_millis(self.link.read_timeout_ms))
    }

    pub fn link_config(&self) -> LinkConfig {
        LinkConfig::default().with_idle_sleep(Duration::from_millis(self.link.idle_sleep_ms))
    }

    pub fn smoothing_config(&self) -> SmoothingConfig {
        let s = &self.smoothing;
        SmoothingConfig {
            attitude_alpha: s.attitude_alpha,
            altitude_alpha: s.altitude_alpha,
            score_alpha: s.score_alpha,
            heading: HeadingIntegrator {
                deadband_deg: s.turn_deadband_deg,
                gain: s.turn_gain,
            },
        }
    }

    pub fn map_config(&self) -> MapConfig {
        MapConfig {
            threshold_deg: self.map.threshold_deg,
            ..MapConfig::default()
        }
        .with_zoom(self.map.zoom)
        .with_display_size(self.map.width, self.map.height)
        .with_remap(self.map.remap)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        self.map.provider.clone()
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.map.timeout_secs)
    }

    /// Everything the cockpit needs from `[display]` and `[smoothing]`.
    pub fn cockpit_config(&self) -> Result<CockpitConfig, ConfigError> {
        let display = &self.display;
        let mesh = Mesh::named(&display.model).ok_or_else(|| ConfigError::InvalidValue {
            key: ConfigKey::DisplayModel.name(),
            value: display.model.clone(),
            reason: "unknown model".to_string(),
        })?;

        Ok(CockpitConfig {
            smoothing: self.smoothing_config(),
            kernel: OrientationKernel::new(
                AxisConvention::default(),
                Transform::scaled(display.model_scale),
                Viewport::new(display.width, display.height, display.fov),
            ),
            mesh,
            horizon: Horizon {
                px_per_degree: display.px_per_degree,
                ..Horizon::default()
            },
            ladder: PitchLadder {
                px_per_degree: display.px_per_degree,
                ..PitchLadder::default()
            },
            trail_length: display.trail_length,
            history_length: display.history_length,
        })
    }
}

/// Directory holding `config.ini`.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flightdeck")
}

/// Full path of `config.ini`.
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.ini")
}

/// Default directory for log files.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flightdeck")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::ColorRemap;
    use crate::provider::ArcGisService;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.link.port = "/dev/ttyACM0".to_string();
        config.link.simulate = true;
        config.display.model = "cube".to_string();
        config.smoothing.attitude_alpha = 0.35;
        config.map.remap = ColorRemap::NightVision;
        config.map.provider = ProviderConfig::ArcGis(ArcGisService::WorldShadedRelief);
        config.logging.directory = Some(dir.path().join("logs"));

        config.save_to(&path).unwrap();
        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[map]\nzoom = 15\nmystery = 1\n\n[link]\nbaud_rate = 115200\n")
            .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.map.zoom, 15);
        assert_eq!(config.link.baud_rate, 115_200);
        assert_eq!(config.display, DisplaySettings::default());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[smoothing]\nattitude_alpha = 0\n").unwrap();

        assert!(matches!(
            ConfigFile::load_from(&path),
            Err(ConfigError::InvalidAlpha { .. })
        ));
    }

    #[test]
    fn test_builders_follow_settings() {
        let mut config = ConfigFile::default();
        config.display.model = "cross-drone".to_string();
        config.display.width = 640.0;
        config.display.height = 480.0;
        config.map.zoom = 10;
        config.smoothing.turn_gain = 0.1;

        let cockpit = config.cockpit_config().unwrap();
        assert_eq!(cockpit.mesh.vertices().len(), 9);
        assert_eq!(cockpit.kernel.viewport.center(), (320.0, 240.0));
        assert_eq!(cockpit.smoothing.heading.gain, 0.1);
        assert!(cockpit.smoothing.validate().is_ok());

        let map = config.map_config();
        assert_eq!(map.zoom, 10);
        assert!(map.validate().is_ok());

        assert_eq!(config.serial_config().baud_rate, DEFAULT_BAUD_RATE);
    }

    #[test]
    fn test_ini_string_has_all_sections() {
        let text = ConfigFile::default().to_ini_string();
        for section in ["[link]", "[display]", "[smoothing]", "[map]", "[logging]"] {
            assert!(text.contains(section), "missing {}", section);
        }
    }
}
