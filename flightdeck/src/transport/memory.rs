//! In-process transport.
//!
//! A [`MemoryTransport`] and its [`MemoryHandle`] share one buffer pair: the
//! handle plays the sensor board (feeds inbound bytes, inspects what the link
//! wrote), the transport is handed to the link. Used by tests and for
//! replaying captured streams.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Transport, TransportError, TransportOpener};

#[derive(Debug, Default)]
struct Shared {
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    closed: bool,
    read_errors: usize,
}

/// Link side of an in-memory pipe.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    shared: Arc<Mutex<Shared>>,
}

/// Board side of an in-memory pipe.
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryTransport {
    /// Create a connected transport/handle pair.
    pub fn pair() -> (MemoryTransport, MemoryHandle) {
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            MemoryTransport {
                shared: Arc::clone(&shared),
            },
            MemoryHandle { shared },
        )
    }
}

impl MemoryHandle {
    /// Queue bytes for the link to read.
    pub fn feed(&self, bytes: &[u8]) {
        self.shared.lock().inbound.extend(bytes.iter().copied());
    }

    /// Bytes not yet read by the link.
    pub fn unread(&self) -> usize {
        self.shared.lock().inbound.len()
    }

    /// Everything the link has written so far.
    pub fn written(&self) -> Vec<u8> {
        self.shared.lock().outbound.clone()
    }

    /// Make the next `count` reads fail with an I/O error.
    pub fn fail_reads(&self, count: usize) {
        self.shared.lock().read_errors = count;
    }

    /// Close the pipe; further transport calls return [`TransportError::Closed`].
    pub fn close(&self) {
        self.shared.lock().closed = true;
    }
}

impl Transport for MemoryTransport {
    fn bytes_available(&mut self) -> Result<usize, TransportError> {
        let shared = self.shared.lock();
        if shared.closed {
            return Err(TransportError::Closed);
        }
        Ok(shared.inbound.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut shared = self.shared.lock();
        if shared.closed {
            return Err(TransportError::Closed);
        }
        if shared.read_errors > 0 {
            shared.read_errors -= 1;
            return Err(TransportError::Io(std::io::Error::other(
                "injected read error",
            )));
        }
        let n = buf.len().min(shared.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(shared.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut shared = self.shared.lock();
        if shared.closed {
            return Err(TransportError::Closed);
        }
        shared.outbound.extend_from_slice(bytes);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Hands out clones of one [`MemoryTransport`].
#[derive(Debug, Clone)]
pub struct MemoryOpener {
    transport: MemoryTransport,
}

impl MemoryOpener {
    pub fn new(transport: MemoryTransport) -> Self {
        Self { transport }
    }
}

impl TransportOpener for MemoryOpener {
    fn open(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(self.transport.clone()))
    }

    fn describe(&self) -> String {
        "in-memory pipe".to_string()
    }
}
