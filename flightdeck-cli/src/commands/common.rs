//! Common types and utilities shared across CLI commands.

use std::sync::Arc;

use clap::Args;
use flightdeck::config::{ConfigFile, ConfigKey};
use flightdeck::provider::{Provider, ProviderFactory, ReqwestClient, DEFAULT_USER_AGENT};
use flightdeck::transport::{SerialOpener, SimulatedOpener, TransportOpener};

use crate::error::CliError;

/// Sensor link flags. Each one overrides the matching `[link]` setting.
#[derive(Debug, Clone, Default, Args)]
pub struct LinkArgs {
    /// Serial port (e.g. /dev/ttyUSB0, COM3)
    #[arg(long)]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long)]
    pub baud: Option<u32>,

    /// Use the built-in telemetry simulator instead of a serial port
    #[arg(long)]
    pub simulate: bool,
}

impl LinkArgs {
    /// Apply flags on top of `config`. CLI takes precedence.
    pub fn apply(&self, config: &mut ConfigFile) -> Result<(), CliError> {
        if let Some(port) = &self.port {
            ConfigKey::LinkPort.set(config, port)?;
        }
        if let Some(baud) = self.baud {
            ConfigKey::LinkBaudRate.set(config, &baud.to_string())?;
        }
        if self.simulate {
            config.link.simulate = true;
        }
        Ok(())
    }
}

/// Map flags shared by `run` and `tile`.
#[derive(Debug, Clone, Default, Args)]
pub struct MapArgs {
    /// Tile source: imagery, relief, or a URL template with {z}/{x}/{y}
    #[arg(long)]
    pub provider: Option<String>,

    /// Slippy-map zoom level (0-19)
    #[arg(long)]
    pub zoom: Option<u8>,

    /// Color remap: none or night-vision
    #[arg(long)]
    pub remap: Option<String>,
}

impl MapArgs {
    pub fn apply(&self, config: &mut ConfigFile) -> Result<(), CliError> {
        if let Some(provider) = &self.provider {
            ConfigKey::MapProvider.set(config, provider)?;
        }
        if let Some(zoom) = self.zoom {
            ConfigKey::MapZoom.set(config, &zoom.to_string())?;
        }
        if let Some(remap) = &self.remap {
            ConfigKey::MapRemap.set(config, remap)?;
        }
        Ok(())
    }
}

/// Transport opener for the configured link.
pub fn create_opener(config: &ConfigFile) -> Arc<dyn TransportOpener> {
    if config.link.simulate {
        Arc::new(SimulatedOpener::new(config.link.simulate_rate_hz))
    } else {
        Arc::new(SerialOpener::new(config.serial_config()))
    }
}

/// Tile provider for the configured `[map]` section.
pub fn create_provider(config: &ConfigFile) -> Result<Box<dyn Provider>, CliError> {
    let client = ReqwestClient::with_options(DEFAULT_USER_AGENT, config.http_timeout())?;
    Ok(ProviderFactory::new(client).create(&config.provider_config())?)
}
