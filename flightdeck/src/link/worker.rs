//! Telemetry reader loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace};

use super::state::SharedLinkState;
use crate::telemetry::{FrameDecoder, TelemetryFrame};
use crate::transport::Transport;

/// Result of one worker iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to read.
    Idle,
    /// Bytes were read but completed no valid record.
    NoFrame,
    /// A batch was published.
    Updated,
    /// The transport reported an error; retried next iteration.
    Error,
}

/// Owns the transport and decoder on the worker thread.
pub(crate) struct LinkWorker {
    transport: Box<dyn Transport>,
    decoder: FrameDecoder,
    state: SharedLinkState,
    commands: Receiver<Vec<u8>>,
    buf: Vec<u8>,
}

impl LinkWorker {
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        state: SharedLinkState,
        commands: Receiver<Vec<u8>>,
        read_chunk: usize,
    ) -> Self {
        Self {
            transport,
            decoder: FrameDecoder::new(),
            state,
            commands,
            buf: vec![0; read_chunk.max(1)],
        }
    }

    /// Run until `running` is cleared.
    pub(crate) fn run(mut self, running: Arc<AtomicBool>, idle_sleep: Duration) {
        info!(transport = self.transport.name(), "Telemetry worker started");

        while running.load(Ordering::Acquire) {
            match self.poll_once() {
                PollOutcome::Idle | PollOutcome::Error => std::thread::sleep(idle_sleep),
                PollOutcome::NoFrame | PollOutcome::Updated => {}
            }
        }

        info!(transport = self.transport.name(), "Telemetry worker stopped");
    }

    /// One iteration: flush commands, then read everything available.
    pub(crate) fn poll_once(&mut self) -> PollOutcome {
        self.flush_commands();

        let available = match self.transport.bytes_available() {
            Ok(n) => n,
            Err(e) => {
                debug!(error = %e, "Transport poll failed");
                return PollOutcome::Error;
            }
        };
        if available == 0 {
            return PollOutcome::Idle;
        }

        let mut remaining = available;
        let mut batch: Option<TelemetryFrame> = None;
        let mut failed = false;

        while remaining > 0 {
            let want = remaining.min(self.buf.len());
            match self.transport.read(&mut self.buf[..want]) {
                Ok(0) => break,
                Ok(n) => {
                    remaining = remaining.saturating_sub(n);
                    if let Some(frame) = self.decoder.push_merged(&self.buf[..n]) {
                        match batch.as_mut() {
                            Some(merged) => merged.merge(&frame),
                            None => batch = Some(frame),
                        }
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Transport read failed");
                    failed = true;
                    break;
                }
            }
        }

        match batch {
            Some(frame) => {
                trace!(fields = frame.len(), "Publishing telemetry batch");
                self.state.apply(&frame);
                PollOutcome::Updated
            }
            None if failed => PollOutcome::Error,
            None => PollOutcome::NoFrame,
        }
    }

    fn flush_commands(&mut self) {
        loop {
            match self.commands.try_recv() {
                Ok(command) => {
                    if let Err(e) = self.transport.write_all(&command) {
                        debug!(error = %e, "Transport write failed");
                    }
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::state::LinkSnapshot;
    use crate::transport::{MemoryHandle, MemoryTransport};
    use std::sync::mpsc::{channel, Sender};

    fn worker() -> (LinkWorker, MemoryHandle, SharedLinkState, Sender<Vec<u8>>) {
        let (transport, handle) = MemoryTransport::pair();
        let state = SharedLinkState::new(LinkSnapshot::new(TelemetryFrame::new()));
        let (tx, rx) = channel();
        let worker = LinkWorker::new(Box::new(transport), state.clone(), rx, 8);
        (worker, handle, state, tx)
    }

    #[test]
    fn test_idle_without_bytes() {
        let (mut worker, _handle, state, _tx) = worker();
        assert_eq!(worker.poll_once(), PollOutcome::Idle);
        assert_eq!(state.snapshot().updates, 0);
    }

    #[test]
    fn test_reads_everything_available_in_one_poll() {
        let (mut worker, handle, state, _tx) = worker();
        // Larger than the 8-byte read chunk: must still be drained in one poll.
        handle.feed(b"{\"r\":10,\"p\":0}\n{\"p\":5}\n{\"alt\":30}\n");

        assert_eq!(worker.poll_once(), PollOutcome::Updated);
        assert_eq!(handle.unread(), 0);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.updates, 1, "batch is published once");
        assert_eq!(snapshot.frame.roll(), Some(10.0));
        assert_eq!(snapshot.frame.pitch(), Some(5.0));
        assert_eq!(snapshot.frame.altitude(), Some(30.0));
    }

    #[test]
    fn test_partial_record_completes_on_next_poll() {
        let (mut worker, handle, state, _tx) = worker();
        handle.feed(b"{\"r\":");
        assert_eq!(worker.poll_once(), PollOutcome::NoFrame);

        handle.feed(b"7}\n");
        assert_eq!(worker.poll_once(), PollOutcome::Updated);
        assert_eq!(state.snapshot().frame.roll(), Some(7.0));
    }

    #[test]
    fn test_read_error_does_not_stop_worker() {
        let (mut worker, handle, state, _tx) = worker();
        handle.feed(b"{\"r\":1}\n");
        handle.fail_reads(1);

        assert_eq!(worker.poll_once(), PollOutcome::Error);
        assert_eq!(worker.poll_once(), PollOutcome::Updated);
        assert_eq!(state.snapshot().frame.roll(), Some(1.0));
    }

    #[test]
    fn test_commands_are_written() {
        let (mut worker, handle, _state, tx) = worker();
        tx.send(b"ARM\n".to_vec()).unwrap();
        worker.poll_once();
        assert_eq!(handle.written(), b"ARM\n");
    }

    #[test]
    fn test_closed_transport_reports_error() {
        let (mut worker, handle, _state, _tx) = worker();
        handle.close();
        assert_eq!(worker.poll_once(), PollOutcome::Error);
    }
}
