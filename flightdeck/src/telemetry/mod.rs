//! Telemetry records and their wire decoding.
//!
//! The sensor board writes one flat JSON object per line. This module turns
//! that byte stream into [`TelemetryFrame`]s.
//!
//! # Architecture
//!
//! ```text
//! Transport bytes ─────► FrameDecoder ─────► TelemetryFrame ─────► TelemetryLink
//!                        (partial tail)      (field-wise merge)    (LinkSnapshot)
//! ```
//!
//! # Example
//!
//! ```
//! use flightdeck::telemetry::FrameDecoder;
//!
//! let mut decoder = FrameDecoder::new();
//! assert!(decoder.push_merged(b"{\"r\":10,\"p\":0}\n{\"p\"").is_some());
//!
//! let latest = decoder.push_merged(b":5}\n").unwrap();
//! assert_eq!(latest.pitch(), Some(5.0));
//! ```

mod decoder;
mod frame;

pub use decoder::{FrameDecoder, MAX_RECORD_LEN};
pub use frame::{
    fields, FlightStatus, GpsFix, TelemetryFrame, DEFAULT_LATITUDE, DEFAULT_LONGITUDE,
    MIN_FIX_SATELLITES,
};
