//! Coordinate types and bounds.

use std::fmt;

use thiserror::Error;

/// Minimum latitude covered by Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;

/// Maximum latitude covered by Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;

/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;

/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;

/// Minimum zoom level.
pub const MIN_ZOOM: u8 = 0;

/// Maximum zoom level served by common imagery providers.
pub const MAX_ZOOM: u8 = 19;

/// Errors from coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be between -85.05112878 and 85.05112878)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("Invalid zoom level: {0} (must be between 0 and 19)")]
    InvalidZoom(u8),
}

/// A slippy-map tile.
///
/// `col` is the `x` index and `row` the `y` index in `{z}/{x}/{y}` URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub row: u32,
    pub col: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn x(&self) -> u32 {
        self.col
    }

    pub fn y(&self) -> u32 {
        self.row
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// A position inside a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePosition {
    pub tile: TileCoord,
    /// Horizontal offset within the tile in `[0, 1)`, west to east.
    pub x: f64,
    /// Vertical offset within the tile in `[0, 1)`, north to south.
    pub y: f64,
}
