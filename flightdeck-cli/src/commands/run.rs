//! Run command - headless cockpit loop.
//!
//! Drives the full pipeline at the configured frame rate and prints a status
//! line periodically. Stops on Ctrl-C or after `--duration`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use flightdeck::cockpit::{Cockpit, CockpitFrame, CockpitStatus, TickClock};
use flightdeck::config::ConfigKey;
use flightdeck::link::TelemetryLink;
use flightdeck::map::TilePrefetcher;
use tracing::{debug, info};

use super::common::{create_opener, create_provider, LinkArgs, MapArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

const MIN_STATUS_INTERVAL_SECS: f64 = 0.05;

/// Arguments for the run command.
#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub link: LinkArgs,

    #[command(flatten)]
    pub map: MapArgs,

    /// Disable the moving map
    #[arg(long)]
    pub no_map: bool,

    /// Frame rate in Hz (1-240)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration: Option<u64>,

    /// Seconds between status lines
    #[arg(long, default_value_t = 1.0)]
    pub status_interval: f64,

    /// Print status lines as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the run command.
pub fn run(args: RunArgs, verbose: bool) -> Result<(), CliError> {
    let runner = CliRunner::new(verbose)?;
    runner.log_startup("run");

    let mut config = runner.config().clone();
    args.link.apply(&mut config)?;
    args.map.apply(&mut config)?;
    if args.no_map {
        config.map.enabled = false;
    }
    if let Some(fps) = args.fps {
        ConfigKey::DisplayFps.set(&mut config, &fps.to_string())?;
    }

    let status_interval = parse_status_interval(args.status_interval)?;

    let opener = create_opener(&config);
    let link = TelemetryLink::new(Arc::clone(&opener), config.link_config());
    let mut cockpit = Cockpit::new(link, config.cockpit_config()?)?;

    let map_line = if config.map.enabled {
        let provider = create_provider(&config)?;
        let line = format!("{} (zoom {})", provider.name(), config.map.zoom);
        cockpit = cockpit.with_map(TilePrefetcher::new(provider, config.map_config())?);
        line
    } else {
        "disabled".to_string()
    };

    println!(
        "{}",
        startup_banner(&opener.describe(), &map_line, &config.display.model, config.display.fps)
    );
    println!();
    println!("Press Ctrl+C to stop.");
    println!();

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::SeqCst);
    })?;

    cockpit.start();

    let mut clock = TickClock::new(config.display.fps);
    let deadline = args.duration.map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut last_status: Option<Instant> = None;

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        let frame = cockpit.tick();
        if frame.map_updated {
            debug!(tick = frame.tick, "Map tile installed");
        }

        if last_status.map_or(true, |t| t.elapsed() >= status_interval) {
            print_status(&frame, args.json);
            last_status = Some(Instant::now());
        }

        clock.wait();
    }

    cockpit.stop();
    info!(
        ticks = cockpit.ticks(),
        overruns = clock.overruns(),
        "Cockpit stopped"
    );
    println!();
    println!("Stopped after {} ticks.", cockpit.ticks());
    Ok(())
}

/// Version line followed by the link, map, model and rate block.
fn startup_banner(link: &str, map: &str, model: &str, fps: u32) -> String {
    [
        format!("FlightDeck v{}", flightdeck::VERSION),
        format!("Link:      {}", link),
        format!("Map:       {}", map),
        format!("Model:     {}", model),
        format!("Rate:      {} Hz", fps),
    ]
    .join("\n")
}

/// Seconds between status lines, floored at 50 ms.
fn parse_status_interval(secs: f64) -> Result<Duration, CliError> {
    Duration::try_from_secs_f64(secs.max(MIN_STATUS_INTERVAL_SECS)).map_err(|e| {
        CliError::Config(format!("invalid --status-interval {}: {}", secs, e))
    })
}

fn print_status(frame: &CockpitFrame, json: bool) {
    let status = frame.status();
    if json {
        match serde_json::to_string(&status) {
            Ok(line) => println!("{}", line),
            Err(e) => debug!(error = %e, "Failed to serialize status"),
        }
    } else {
        println!("{}", format_status(&status));
    }
}

/// One human-readable status line.
fn format_status(status: &CockpitStatus) -> String {
    let alert = match status.status {
        "STABLE" => style(status.status).green(),
        "TURBULENCE" => style(status.status).yellow(),
        _ => style(status.status).red().bold(),
    };
    let mut line = format!(
        "#{:<6} {:<7} R{:>+7.1} P{:>+7.1} HDG {:>5.1} ALT {:>7.1}m  {:.5},{:.5}  AS {:>5.1}%  {}",
        status.tick,
        status.link,
        status.roll,
        status.pitch,
        status.heading,
        status.altitude,
        status.latitude,
        status.longitude,
        status.safety_score,
        alert,
    );
    if status.armed {
        line.push_str("  ARMED");
    }
    if let Some(satellites) = status.satellites {
        line.push_str(&format!("  GPS {} ({} sats)", status.gps, satellites));
    }
    if let Some(map) = status.map {
        line.push_str("  map:");
        line.push_str(map);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> CockpitStatus {
        CockpitStatus {
            tick: 12,
            link: "online",
            roll: 5.0,
            pitch: -2.5,
            heading: 90.0,
            altitude: 120.0,
            latitude: 42.87,
            longitude: 74.56,
            safety_score: 98.0,
            status: "STABLE",
            armed: true,
            gps: "3D FIX LOCKED",
            satellites: Some(8),
            battery: None,
            visible_edges: 28,
            map: Some("ready"),
        }
    }

    #[test]
    fn test_format_status() {
        let line = console::strip_ansi_codes(&format_status(&status())).into_owned();
        assert!(line.starts_with("#12"));
        assert!(line.contains("R   +5.0"));
        assert!(line.contains("STABLE"));
        assert!(line.contains("ARMED"));
        assert!(line.contains("GPS 3D FIX LOCKED (8 sats)"));
        assert!(line.ends_with("map:ready"));
    }

    #[test]
    fn test_status_interval_bounds() {
        assert_eq!(parse_status_interval(2.5).unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_status_interval(0.0).unwrap(), Duration::from_millis(50));
        assert_eq!(parse_status_interval(-3.0).unwrap(), Duration::from_millis(50));
        assert_eq!(parse_status_interval(f64::NAN).unwrap(), Duration::from_millis(50));
        for bad in [f64::INFINITY, f64::MAX] {
            assert!(
                matches!(parse_status_interval(bad), Err(CliError::Config(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_banner_leads_with_version() {
        let banner = startup_banner("simulated (50 Hz)", "osm (zoom 13)", "quadcopter", 60);
        let labels: Vec<_> = banner
            .lines()
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(labels, ["FlightDeck", "Link:", "Map:", "Model:", "Rate:"]);
        assert!(banner.contains("Map:       osm (zoom 13)"));
    }
}
