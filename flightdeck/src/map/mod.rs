//! Moving-map background tiles.
//!
//! The [`TilePrefetcher`] keeps one slippy-map tile around the aircraft. A
//! new tile is requested only after the aircraft has moved more than a
//! threshold since the last request, at most one fetch is in flight, and a
//! failed fetch leaves the previous image on screen.
//!
//! ```text
//! render thread                         tile-prefetch thread
//! ─────────────                         ────────────────────
//! drain()  ◄── handoff slot (bytes) ◄── provider.fetch(tile)
//! update() ──► request slot ──────────► wait (bounded)
//! ```

mod config;
mod prefetcher;
mod remap;

pub use config::{
    MapConfig, DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, DEFAULT_REQUEST_WAIT,
    DEFAULT_RETRY_DELAY, DEFAULT_THRESHOLD_DEG, DEFAULT_ZOOM,
};
pub use prefetcher::{MapImage, MapStatus, TilePrefetcher};
pub use remap::{colorize, ColorRemap, NIGHT_VISION_BRIGHT, NIGHT_VISION_DARK};

use image::imageops::{self, FilterType};
use image::RgbaImage;
use thiserror::Error;

/// Map errors.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to decode tile image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to start tile worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Decode an encoded tile, resize it to `size` with Lanczos3 and apply
/// `remap`.
pub fn render_tile(
    bytes: &[u8],
    size: (u32, u32),
    remap: ColorRemap,
) -> Result<RgbaImage, MapError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let resized = if decoded.dimensions() == size {
        decoded
    } else {
        imageops::resize(&decoded, size.0, size.1, FilterType::Lanczos3)
    };
    Ok(remap.apply(resized))
}
