//! Send command - write one command line to the board.

use std::time::{Duration, Instant};

use clap::Args;
use flightdeck::telemetry::{FrameDecoder, TelemetryFrame};
use tracing::info;

use super::common::{create_opener, LinkArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the send command.
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Command text, e.g. ARM or DISARM
    pub command: String,

    #[command(flatten)]
    pub link: LinkArgs,

    /// Milliseconds to listen for telemetry after sending
    #[arg(long, default_value_t = 0)]
    pub listen: u64,
}

/// Run the send command.
pub fn run(args: SendArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("send");

    let mut config = runner.config().clone();
    args.link.apply(&mut config)?;

    let command = args.command.trim();
    if command.is_empty() {
        return Err(CliError::Config("command must not be empty".to_string()));
    }

    let opener = create_opener(&config);
    let mut transport = opener.open()?;
    transport.write_all(format!("{}\n", command).as_bytes())?;
    info!(transport = %opener.describe(), command, "Command sent");
    println!("Sent '{}' to {}", command, opener.describe());

    if args.listen == 0 {
        return Ok(());
    }

    let deadline = Instant::now() + Duration::from_millis(args.listen);
    let mut decoder = FrameDecoder::new();
    let mut buf = [0u8; 1024];
    let mut last: Option<TelemetryFrame> = None;

    while Instant::now() < deadline {
        let read = transport.read(&mut buf)?;
        if read == 0 {
            std::thread::sleep(Duration::from_millis(5));
            continue;
        }
        if let Some(frame) = decoder.push_merged(&buf[..read]) {
            last.get_or_insert_with(TelemetryFrame::new).merge(&frame);
        }
    }

    match last {
        Some(frame) => {
            println!("Latest telemetry:");
            for (field, value) in frame.iter() {
                println!("  {:<6} {}", field, value);
            }
        }
        None => println!("No telemetry received."),
    }
    Ok(())
}
