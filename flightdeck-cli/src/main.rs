//! FlightDeck CLI - Command-line interface
//!
//! Runs the cockpit pipeline headless, fetches single map tiles, talks to
//! the flight board and manages `config.ini`.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::run::RunArgs;
use commands::send::SendArgs;
use commands::tile::TileArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "flightdeck")]
#[command(version, about = "Cockpit pipeline for serial attitude and position telemetry")]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the cockpit loop and print status lines
    Run(RunArgs),

    /// Download the map tile for a position and save it as an image
    Tile(TileArgs),

    /// List serial ports
    Ports,

    /// Send a command line to the flight board
    Send(SendArgs),

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.verbose),
        Commands::Tile(args) => commands::tile::run(args, cli.verbose),
        Commands::Ports => commands::ports::run(),
        Commands::Send(args) => commands::send::run(args, cli.verbose),
        Commands::Config { command } => commands::config::run(command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from([
            "flightdeck", "run", "--simulate", "--no-map", "--fps", "30", "--duration", "5",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert!(args.link.simulate);
                assert!(args.no_map);
                assert_eq!(args.fps, Some(30));
                assert_eq!(args.duration, Some(5));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_tile_accepts_negative_coordinates() {
        let cli = Cli::parse_from(["flightdeck", "tile", "--lat", "-33.86", "--lon", "-151.2"]);
        match cli.command {
            Commands::Tile(args) => {
                assert_eq!(args.lat, -33.86);
                assert_eq!(args.lon, -151.2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
