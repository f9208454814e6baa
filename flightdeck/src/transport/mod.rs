//! Byte-oriented duplex transports for the sensor link.
//!
//! The telemetry worker only needs three primitives: how many bytes are
//! waiting, a short non-blocking read, and a write. [`Transport`] captures
//! those so the link can run against a real serial port, an in-memory pipe
//! in tests, or a synthetic stream in demo mode.
//!
//! Transports are created lazily through a [`TransportOpener`], which lets the
//! link own the open step and degrade to offline mode when it fails.

mod memory;
mod serial;
mod simulated;

pub use memory::{MemoryHandle, MemoryOpener, MemoryTransport};
pub use serial::{
    available_ports, SerialConfig, SerialOpener, SerialTransport, DEFAULT_BAUD_RATE, DEFAULT_PORT,
    DEFAULT_READ_TIMEOUT,
};
pub use simulated::{SimulatedOpener, SimulatedTransport, DEFAULT_RATE_HZ};

use thiserror::Error;

/// Errors raised by transports.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport could not be opened.
    #[error("Failed to open {target}: {reason}")]
    Open { target: String, reason: String },

    /// I/O error while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial driver error.
    #[error("Serial error: {0}")]
    Serial(#[from] serialport::Error),

    /// The other end went away.
    #[error("Transport closed")]
    Closed,
}

/// A byte stream the telemetry worker can poll.
pub trait Transport: Send {
    /// Number of bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize, TransportError>;

    /// Read up to `buf.len()` bytes. Returns `Ok(0)` when nothing arrived
    /// within the transport's short timeout.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write all bytes.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Human-readable identifier for logs.
    fn name(&self) -> &str;
}

/// Creates a transport on demand.
pub trait TransportOpener: Send + Sync {
    /// Open the transport.
    fn open(&self) -> Result<Box<dyn Transport>, TransportError>;

    /// What this opener connects to, for logs.
    fn describe(&self) -> String;
}
