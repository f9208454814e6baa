//! Serial port transport.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use super::{Transport, TransportError, TransportOpener};

/// Default serial device.
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default bit rate. The boards stream at 921600 baud to keep latency low.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Default read timeout. Short so the worker can poll without stalling.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Serial link settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialConfig {
    /// Device path or port name (e.g. `/dev/ttyUSB0`, `COM3`).
    pub port: String,
    /// Bit rate.
    pub baud_rate: u32,
    /// Read timeout.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl SerialConfig {
    /// Create a config for the given port and bit rate.
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            ..Self::default()
        }
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

/// A transport over a serial port.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Open the configured port.
    pub fn open(config: &SerialConfig) -> Result<Self, TransportError> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.read_timeout)
            .open()
            .map_err(|e| TransportError::Open {
                target: config.port.clone(),
                reason: e.to_string(),
            })?;

        info!(
            port = %config.port,
            baud = config.baud_rate,
            "Opened serial port"
        );

        Ok(Self {
            port,
            name: config.port.clone(),
        })
    }
}

impl Transport for SerialTransport {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Opens a [`SerialTransport`] from a [`SerialConfig`].
#[derive(Debug, Clone)]
pub struct SerialOpener {
    config: SerialConfig,
}

impl SerialOpener {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl TransportOpener for SerialOpener {
    fn open(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(SerialTransport::open(&self.config)?))
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.config.port, self.config.baud_rate)
    }
}

/// List serial port names present on this machine.
pub fn available_ports() -> Result<Vec<String>, TransportError> {
    Ok(serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect())
}
