pub mod common;
pub mod config;
pub mod ports;
pub mod run;
pub mod send;
pub mod tile;
