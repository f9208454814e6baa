//! Coordinate conversion module
//!
//! Converts geographic coordinates (latitude/longitude) to Web Mercator
//! slippy-map tiles, the addressing scheme used by tile imagery services.

mod types;

pub use types::{
    CoordError, TileCoord, TilePosition, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

fn validate(lat: f64, lon: f64, zoom: u8) -> Result<(), CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }
    Ok(())
}

/// Fractional global tile position `(x, y)` at `zoom`.
fn global_position(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);
    let x = (lon + 180.0) / 360.0 * n;
    let lat_rad = lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;
    (x, y)
}

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 19)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    to_tile_position(lat, lon, zoom).map(|p| p.tile)
}

/// Converts geographic coordinates to a tile plus the offset inside it.
///
/// The offset places the aircraft marker on the downloaded image.
pub fn to_tile_position(lat: f64, lon: f64, zoom: u8) -> Result<TilePosition, CoordError> {
    validate(lat, lon, zoom)?;

    let max_index = (1u32 << zoom) - 1;
    let (x, y) = global_position(lat, lon, zoom);

    // The east and south edges belong to the last tile.
    let col = (x.floor() as u32).min(max_index);
    let row = (y.floor() as u32).min(max_index);

    Ok(TilePosition {
        tile: TileCoord { row, col, zoom },
        x: (x - col as f64).clamp(0.0, 1.0),
        y: (y - row as f64).clamp(0.0, 1.0),
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = tile.col as f64 / n * 360.0 - 180.0;

    let y = tile.row as f64 / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

/// Geographic center of a tile.
pub fn tile_center(tile: &TileCoord) -> (f64, f64) {
    let (north, west) = tile_to_lat_lon(tile);
    let (south, east) = tile_to_lat_lon(&TileCoord {
        row: tile.row + 1,
        col: tile.col + 1,
        zoom: tile.zoom,
    });
    ((north + south) / 2.0, (west + east) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = to_tile_coords(40.7128, -74.0060, 16).unwrap();
        assert_eq!(tile.row, 24640);
        assert_eq!(tile.col, 19295);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_bishkek_at_default_zoom() {
        let tile = to_tile_coords(42.87, 74.56, 13).unwrap();
        let (lat, lon) = tile_to_lat_lon(&tile);
        assert!(lat >= 42.87 && lat - 42.87 < 0.05);
        assert!(lon <= 74.56 && 74.56 - lon < 0.05);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            to_tile_coords(90.0, 0.0, 10),
            Err(CoordError::InvalidLatitude(_))
        ));
        assert!(matches!(
            to_tile_coords(0.0, 181.0, 10),
            Err(CoordError::InvalidLongitude(_))
        ));
        assert!(matches!(
            to_tile_coords(0.0, 0.0, 25),
            Err(CoordError::InvalidZoom(25))
        ));
        assert!(matches!(
            to_tile_coords(f64::NAN, 0.0, 10),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_antimeridian_edge_stays_in_range() {
        let tile = to_tile_coords(0.0, 180.0, 3).unwrap();
        assert_eq!(tile.col, 7);
        let tile = to_tile_coords(MIN_LAT, 0.0, 3).unwrap();
        assert_eq!(tile.row, 7);
    }

    #[test]
    fn test_tile_display_is_z_x_y() {
        let tile = TileCoord {
            row: 2,
            col: 5,
            zoom: 3,
        };
        assert_eq!(tile.to_string(), "3/5/2");
    }

    #[test]
    fn test_tile_center_roundtrip() {
        let tile = to_tile_coords(40.7128, -74.0060, 12).unwrap();
        let (lat, lon) = tile_center(&tile);
        assert_eq!(to_tile_coords(lat, lon, 12).unwrap(), tile);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_tile_coords_in_bounds(
                lat in MIN_LAT..=MAX_LAT,
                lon in MIN_LON..=MAX_LON,
                zoom in MIN_ZOOM..=MAX_ZOOM
            ) {
                let pos = to_tile_position(lat, lon, zoom)?;
                let n = 1u32 << zoom;
                prop_assert!(pos.tile.row < n);
                prop_assert!(pos.tile.col < n);
                prop_assert!((0.0..=1.0).contains(&pos.x));
                prop_assert!((0.0..=1.0).contains(&pos.y));
            }

            #[test]
            fn test_roundtrip_property(
                lat in -80.0..80.0_f64,
                lon in -179.0..179.0_f64,
                zoom in 0u8..=MAX_ZOOM
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let (north, west) = tile_to_lat_lon(&tile);
                prop_assert!(north >= lat - 1e-9);
                prop_assert!(west <= lon + 1e-9);
            }
        }
    }
}
