//! CLI error type.

use std::path::PathBuf;

use flightdeck::config::ConfigError;
use flightdeck::coord::CoordError;
use flightdeck::logging::LoggingError;
use flightdeck::map::MapError;
use flightdeck::provider::ProviderError;
use flightdeck::transport::TransportError;
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    ConfigFile(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error("Serial link error: {0}")]
    Transport(#[from] TransportError),

    #[error("Tile provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid position: {0}")]
    Coord(#[from] CoordError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Failed to write {}: {source}", .path.display())]
    WriteImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
