//! Provider trait and errors.

use thiserror::Error;

use crate::coord::TileCoord;

/// Errors from tile providers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// Transport-level failure: DNS, connect, timeout, body read.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The server answered 200 with no body.
    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("Zoom level {0} not supported by provider")]
    UnsupportedZoom(u8),

    /// A URL template is missing a placeholder.
    #[error("Invalid URL template '{template}': missing {missing}")]
    InvalidTemplate {
        template: String,
        missing: &'static str,
    },
}

/// A source of map tiles.
///
/// Implementations are used from the prefetch worker thread, hence
/// `Send + Sync`.
pub trait Provider: Send + Sync {
    /// Download one tile image as encoded bytes (JPEG or PNG).
    fn download_tile(&self, row: u32, col: u32, zoom: u8) -> Result<Vec<u8>, ProviderError>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    fn min_zoom(&self) -> u8;

    fn max_zoom(&self) -> u8;

    fn supports_zoom(&self, zoom: u8) -> bool {
        (self.min_zoom()..=self.max_zoom()).contains(&zoom)
    }

    /// Download the tile at `tile`.
    fn fetch(&self, tile: &TileCoord) -> Result<Vec<u8>, ProviderError> {
        self.download_tile(tile.row, tile.col, tile.zoom)
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn download_tile(&self, row: u32, col: u32, zoom: u8) -> Result<Vec<u8>, ProviderError> {
        (**self).download_tile(row, col, zoom)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn min_zoom(&self) -> u8 {
        (**self).min_zoom()
    }

    fn max_zoom(&self) -> u8 {
        (**self).max_zoom()
    }
}
