//! Tile prefetcher configuration.

use std::time::Duration;

use super::remap::ColorRemap;
use super::MapError;
use crate::coord::MAX_ZOOM;
use crate::telemetry::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

/// Default zoom level. At 13 a 256 px tile spans roughly 5 km.
pub const DEFAULT_ZOOM: u8 = 13;

/// Default movement in degrees, on either axis, before a new tile is fetched.
///
/// About 550 m of latitude.
pub const DEFAULT_THRESHOLD_DEG: f64 = 0.005;

/// Default display width of the map panel in pixels.
pub const DEFAULT_DISPLAY_WIDTH: u32 = 400;

/// Default display height of the map panel in pixels.
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 400;

/// Default upper bound on how long the worker waits for a request before
/// re-checking its running flag.
pub const DEFAULT_REQUEST_WAIT: Duration = Duration::from_millis(100);

/// Default delay before refetching a position whose fetch failed.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Configuration for the [`TilePrefetcher`](super::TilePrefetcher).
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Slippy-map zoom level. Default: 13.
    pub zoom: u8,

    /// Minimum movement in degrees on either axis that triggers a fetch.
    /// Default: 0.005°.
    pub threshold_deg: f64,

    /// Position used while the board reports `(0, 0)` (no GPS fix).
    pub fallback_position: (f64, f64),

    /// Size the decoded tile is resized to. Default: 400×400.
    pub display_width: u32,
    pub display_height: u32,

    /// Color treatment applied after resizing.
    pub remap: ColorRemap,

    /// Bounded worker wait. Also bounds how long `stop()` takes.
    pub request_wait: Duration,

    /// After a failed fetch the same position is retried once this much
    /// time has passed. Moving past the threshold retries immediately.
    pub retry_delay: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            threshold_deg: DEFAULT_THRESHOLD_DEG,
            fallback_position: (DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            remap: ColorRemap::None,
            request_wait: DEFAULT_REQUEST_WAIT,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl MapConfig {
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_remap(mut self, remap: ColorRemap) -> Self {
        self.remap = remap;
        self
    }

    pub fn with_display_size(mut self, width: u32, height: u32) -> Self {
        self.display_width = width;
        self.display_height = height;
        self
    }

    pub fn validate(&self) -> Result<(), MapError> {
        if self.zoom > MAX_ZOOM {
            return Err(MapError::InvalidConfig(format!(
                "zoom {} exceeds maximum {}",
                self.zoom, MAX_ZOOM
            )));
        }
        if !(self.threshold_deg.is_finite() && self.threshold_deg >= 0.0) {
            return Err(MapError::InvalidConfig(format!(
                "threshold {} must be a non-negative number of degrees",
                self.threshold_deg
            )));
        }
        if self.display_width == 0 || self.display_height == 0 {
            return Err(MapError::InvalidConfig(format!(
                "display size {}x{} must be non-zero",
                self.display_width, self.display_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.zoom, 13);
        assert_eq!(config.fallback_position, (42.87, 74.56));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(MapConfig::default().with_zoom(30).validate().is_err());
        assert!(MapConfig::default().with_display_size(0, 10).validate().is_err());
        let config = MapConfig {
            threshold_deg: f64::NAN,
            ..MapConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
