//! Ports command - list serial ports.

use flightdeck::config::ConfigFile;
use flightdeck::transport::available_ports;

use crate::error::CliError;

/// Run the ports command.
pub fn run() -> Result<(), CliError> {
    let ports = available_ports()?;
    let configured = ConfigFile::load().unwrap_or_default().link.port;

    if ports.is_empty() {
        println!("No serial ports found.");
        return Ok(());
    }

    for port in &ports {
        let marker = if *port == configured { "*" } else { " " };
        println!("{} {}", marker, port);
    }
    println!();
    println!("* = configured port (link.port)");
    Ok(())
}
