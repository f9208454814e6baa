//! Shared setup for commands that do real work: config and logging.

use flightdeck::config::{config_file_path, ConfigFile};
use flightdeck::logging::{init_logging, LoggingGuard, LoggingOptions};
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus the logging guard.
pub struct CliRunner {
    config: ConfigFile,
    logging: LoggingGuard,
}

impl CliRunner {
    /// Load `config.ini` and install logging.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;
        let options = LoggingOptions::from_settings(&config.logging).verbose(verbose);
        let logging = init_logging(&options)?;
        Ok(Self { config, logging })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = flightdeck::VERSION,
            command,
            config = %config_file_path().display(),
            log_dir = ?self.logging.directory(),
            "FlightDeck starting"
        );
    }
}
