//! Tile command - fetch the map tile for one position and save it.

use std::path::PathBuf;

use clap::Args;
use flightdeck::coord::to_tile_position;
use flightdeck::map::{render_tile, MapImage};
use tracing::info;

use super::common::{create_provider, MapArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the tile command.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Output image path (format from extension)
    #[arg(short, long, default_value = "tile.png")]
    pub output: PathBuf,

    /// Save the tile as downloaded, without resizing or remapping
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub map: MapArgs,
}

/// Run the tile command.
pub fn run(args: TileArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("tile");

    let mut config = runner.config().clone();
    args.map.apply(&mut config)?;

    let position = to_tile_position(args.lat, args.lon, config.map.zoom)?;
    let provider = create_provider(&config)?;

    println!("Provider: {}", provider.name());
    println!("Tile:     {}", position.tile);

    let bytes = provider.fetch(&position.tile)?;
    info!(tile = %position.tile, bytes = bytes.len(), "Tile downloaded");

    let size = if args.raw {
        let decoded = image::load_from_memory(&bytes).map_err(flightdeck::map::MapError::from)?;
        decoded
            .save(&args.output)
            .map_err(|source| CliError::WriteImage {
                path: args.output.clone(),
                source,
            })?;
        (decoded.width(), decoded.height())
    } else {
        let map = config.map_config();
        let pixels = render_tile(&bytes, (map.display_width, map.display_height), map.remap)?;
        let (mx, my) = MapImage::marker_for(&position, pixels.dimensions());
        println!("Marker:   ({}, {}) px", mx, my);
        let size = pixels.dimensions();
        pixels
            .save(&args.output)
            .map_err(|source| CliError::WriteImage {
                path: args.output.clone(),
                source,
            })?;
        size
    };

    println!("Saved:    {} ({}x{})", args.output.display(), size.0, size.1);
    Ok(())
}
