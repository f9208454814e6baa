//! FlightDeck - cockpit pipeline for serial attitude and position telemetry
//!
//! This library turns a newline-delimited JSON stream from a flight board
//! into everything a heads-up display needs to draw: smoothed flight state,
//! a projected aircraft model, an artificial horizon with pitch ladder, and
//! a moving-map tile around the current position.
//!
//! The pieces, from the wire inwards:
//!
//! - [`transport`]: serial, in-memory and simulated byte streams
//! - [`telemetry`]: frame decoding with last-value-wins merging
//! - [`link`]: background reader publishing the newest frame
//! - [`smoother`]: exponential smoothing and heading integration
//! - [`kernel`]: rotation, perspective projection, horizon geometry
//! - [`coord`], [`provider`], [`map`]: slippy-map tiles fetched off-thread
//! - [`cockpit`]: the per-tick driver tying it together
//! - [`config`], [`logging`]: `config.ini` and tracing setup

pub mod cockpit;
pub mod config;
pub mod coord;
pub mod kernel;
pub mod link;
pub mod logging;
pub mod map;
pub mod provider;
pub mod smoother;
pub mod telemetry;
pub mod transport;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
