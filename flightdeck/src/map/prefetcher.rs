//! Background tile fetching with a single-slot handoff.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use image::RgbaImage;
use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use super::config::MapConfig;
use super::{render_tile, MapError};
use crate::coord::{to_tile_position, TileCoord, TilePosition};
use crate::provider::Provider;
use crate::telemetry::GpsFix;

/// What the map panel is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStatus {
    /// No image yet and nothing in flight.
    Idle,
    /// A fetch is in flight.
    Downloading,
    /// An image is available and nothing is in flight.
    Ready,
}

impl MapStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapStatus::Idle => "idle",
            MapStatus::Downloading => "downloading",
            MapStatus::Ready => "ready",
        }
    }
}

impl std::fmt::Display for MapStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The displayed map image.
#[derive(Debug, Clone)]
pub struct MapImage {
    /// Resized and remapped pixels.
    pub pixels: RgbaImage,
    pub tile: TileCoord,
    /// Aircraft position inside `pixels`.
    pub marker: (u32, u32),
    /// Position the fetch was requested for.
    pub position: (f64, f64),
    pub received_at: Instant,
}

impl MapImage {
    /// Pixel inside an image of `size` that `position` falls on.
    pub fn marker_for(position: &TilePosition, size: (u32, u32)) -> (u32, u32) {
        (
            marker_offset(position.x, size.0),
            marker_offset(position.y, size.1),
        )
    }
}

#[derive(Debug, Clone, Copy)]
struct TileRequest {
    lat: f64,
    lon: f64,
}

struct TilePayload {
    request: TileRequest,
    position: TilePosition,
    bytes: Vec<u8>,
}

/// State shared between the consumer and the worker.
struct Shared {
    request: Mutex<Option<TileRequest>>,
    wake: Condvar,
    handoff: Mutex<Option<TilePayload>>,
    in_flight: AtomicBool,
    failed: AtomicBool,
    running: AtomicBool,
    fetches: AtomicU64,
}

/// Keeps a map tile around the current position.
///
/// Call [`drain`](Self::drain) then [`update`](Self::update) once per tick
/// from the render thread. Neither blocks on the network: downloads happen
/// on a worker thread and the encoded bytes are handed back through a
/// single-slot buffer. Decoding and resizing run on the consumer side in
/// `drain`.
pub struct TilePrefetcher {
    shared: Arc<Shared>,
    config: MapConfig,
    last_position: Option<(f64, f64)>,
    retry_at: Option<Instant>,
    current: Option<MapImage>,
    dispatched: u64,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for TilePrefetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilePrefetcher")
            .field("zoom", &self.config.zoom)
            .field("status", &self.status())
            .field("last_position", &self.last_position)
            .finish_non_exhaustive()
    }
}

impl TilePrefetcher {
    /// Validate `config` and start the worker thread.
    pub fn new(provider: Box<dyn Provider>, config: MapConfig) -> Result<Self, MapError> {
        config.validate()?;

        let shared = Arc::new(Shared {
            request: Mutex::new(None),
            wake: Condvar::new(),
            handoff: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            failed: AtomicBool::new(false),
            running: AtomicBool::new(true),
            fetches: AtomicU64::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        let zoom = config.zoom;
        let wait = config.request_wait;
        let worker = std::thread::Builder::new()
            .name("tile-prefetch".to_string())
            .spawn(move || run_worker(worker_shared, provider, zoom, wait))
            .map_err(MapError::Spawn)?;

        Ok(Self {
            shared,
            config,
            last_position: None,
            retry_at: None,
            current: None,
            dispatched: 0,
            worker: Some(worker),
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Request a tile for `(lat, lon)` if the aircraft moved far enough.
    ///
    /// `(0, 0)` means no GPS fix and is replaced by the fallback position.
    /// Returns whether a fetch was dispatched. Never blocks.
    pub fn update(&mut self, lat: f64, lon: f64) -> bool {
        self.update_with_fix(lat, lon, GpsFix::Unknown)
    }

    /// Like [`update`](Self::update), but a lost fix also selects the
    /// fallback position whatever coordinates the board still reports.
    pub fn update_with_fix(&mut self, lat: f64, lon: f64, fix: GpsFix) -> bool {
        if !self.shared.running.load(Ordering::Acquire) {
            return false;
        }
        if !(lat.is_finite() && lon.is_finite()) {
            return false;
        }

        let (lat, lon) = if fix.is_lost() || (lat == 0.0 && lon == 0.0) {
            self.config.fallback_position
        } else {
            (lat, lon)
        };

        if self.shared.failed.swap(false, Ordering::AcqRel) {
            self.retry_at = Some(Instant::now() + self.config.retry_delay);
        }

        if self.shared.in_flight.load(Ordering::Acquire) {
            return false;
        }

        let moved = match self.last_position {
            None => true,
            Some((last_lat, last_lon)) => {
                (lat - last_lat).abs() > self.config.threshold_deg
                    || (lon - last_lon).abs() > self.config.threshold_deg
            }
        };
        let retry_due = self.retry_at.is_some_and(|at| Instant::now() >= at);
        if !moved && !retry_due {
            return false;
        }

        self.shared.in_flight.store(true, Ordering::Release);
        self.last_position = Some((lat, lon));
        self.retry_at = None;
        self.dispatched += 1;

        *self.shared.request.lock() = Some(TileRequest { lat, lon });
        self.shared.wake.notify_one();
        debug!(lat, lon, zoom = self.config.zoom, "Tile fetch dispatched");
        true
    }

    /// Install a downloaded tile if one is waiting. Returns whether the
    /// displayed image changed.
    ///
    /// A tile that fails to decode is dropped and the previous image stays.
    pub fn drain(&mut self) -> bool {
        let Some(payload) = self.shared.handoff.lock().take() else {
            return false;
        };

        let size = (self.config.display_width, self.config.display_height);
        let rendered = render_tile(&payload.bytes, size, self.config.remap);
        self.shared.in_flight.store(false, Ordering::Release);

        match rendered {
            Ok(pixels) => {
                let marker = MapImage::marker_for(&payload.position, size);
                debug!(tile = %payload.position.tile, "Map tile installed");
                self.current = Some(MapImage {
                    pixels,
                    tile: payload.position.tile,
                    marker,
                    position: (payload.request.lat, payload.request.lon),
                    received_at: Instant::now(),
                });
                true
            }
            Err(e) => {
                warn!(tile = %payload.position.tile, error = %e, "Discarding undecodable map tile");
                false
            }
        }
    }

    /// The image to display, if any has arrived.
    pub fn current_image(&self) -> Option<&MapImage> {
        self.current.as_ref()
    }

    pub fn status(&self) -> MapStatus {
        if self.shared.in_flight.load(Ordering::Acquire) {
            MapStatus::Downloading
        } else if self.current.is_some() {
            MapStatus::Ready
        } else {
            MapStatus::Idle
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    /// Fetches handed to the worker so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Provider calls made by the worker so far.
    pub fn fetch_attempts(&self) -> u64 {
        self.shared.fetches.load(Ordering::Acquire)
    }

    /// Stop the worker. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        self.shared.wake.notify_all();

        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Tile prefetch worker panicked");
            }
            info!("Tile prefetcher stopped");
        }
    }
}

impl Drop for TilePrefetcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn marker_offset(fraction: f64, size: u32) -> u32 {
    let max = size.saturating_sub(1);
    ((fraction * size as f64) as u32).min(max)
}

fn run_worker(
    shared: Arc<Shared>,
    provider: Box<dyn Provider>,
    zoom: u8,
    wait: std::time::Duration,
) {
    info!(provider = provider.name(), zoom, "Tile prefetch worker started");

    while shared.running.load(Ordering::Acquire) {
        let request = {
            let mut slot = shared.request.lock();
            if slot.is_none() {
                shared.wake.wait_for(&mut slot, wait);
            }
            slot.take()
        };

        let Some(request) = request else {
            continue;
        };

        match fetch(&shared, provider.as_ref(), request, zoom) {
            Ok(payload) => {
                *shared.handoff.lock() = Some(payload);
            }
            Err(reason) => {
                debug!(lat = request.lat, lon = request.lon, reason = %reason, "Tile fetch failed");
                shared.failed.store(true, Ordering::Release);
                shared.in_flight.store(false, Ordering::Release);
            }
        }
    }

    debug!("Tile prefetch worker exiting");
}

fn fetch(
    shared: &Shared,
    provider: &dyn Provider,
    request: TileRequest,
    zoom: u8,
) -> Result<TilePayload, String> {
    let position = to_tile_position(request.lat, request.lon, zoom).map_err(|e| e.to_string())?;
    shared.fetches.fetch_add(1, Ordering::AcqRel);
    let bytes = provider.fetch(&position.tile).map_err(|e| e.to_string())?;
    Ok(TilePayload {
        request,
        position,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;
    use std::time::Duration;

    fn png_tile() -> Vec<u8> {
        let image = RgbaImage::from_pixel(8, 8, Rgba([200, 200, 200, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    struct FixedProvider(Result<Vec<u8>, ProviderError>);

    impl Provider for FixedProvider {
        fn download_tile(&self, _row: u32, _col: u32, _zoom: u8) -> Result<Vec<u8>, ProviderError> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn min_zoom(&self) -> u8 {
            0
        }

        fn max_zoom(&self) -> u8 {
            19
        }
    }

    fn config() -> MapConfig {
        MapConfig {
            request_wait: Duration::from_millis(5),
            ..MapConfig::default().with_display_size(16, 16)
        }
    }

    fn drain_until(prefetcher: &mut TilePrefetcher, done: impl Fn(&TilePrefetcher) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done(prefetcher) && Instant::now() < deadline {
            prefetcher.drain();
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_fetch_decode_and_install() {
        let mut prefetcher =
            TilePrefetcher::new(Box::new(FixedProvider(Ok(png_tile()))), config()).unwrap();
        assert_eq!(prefetcher.status(), MapStatus::Idle);

        assert!(prefetcher.update(42.87, 74.56));
        assert_eq!(prefetcher.status(), MapStatus::Downloading);
        drain_until(&mut prefetcher, |p| p.current_image().is_some());

        let image = prefetcher.current_image().unwrap();
        assert_eq!(image.pixels.dimensions(), (16, 16));
        assert!(image.marker.0 < 16 && image.marker.1 < 16);
        assert_eq!(prefetcher.status(), MapStatus::Ready);
    }

    #[test]
    fn test_no_fix_uses_fallback() {
        let mut prefetcher =
            TilePrefetcher::new(Box::new(FixedProvider(Ok(png_tile()))), config()).unwrap();
        assert!(prefetcher.update(0.0, 0.0));
        drain_until(&mut prefetcher, |p| p.current_image().is_some());
        assert_eq!(prefetcher.current_image().unwrap().position, (42.87, 74.56));
    }

    #[test]
    fn test_lost_fix_uses_fallback_over_stale_position() {
        let mut prefetcher =
            TilePrefetcher::new(Box::new(FixedProvider(Ok(png_tile()))), config()).unwrap();
        assert!(prefetcher.update_with_fix(51.5, -0.12, GpsFix::NoFix));
        drain_until(&mut prefetcher, |p| p.current_image().is_some());
        assert_eq!(prefetcher.current_image().unwrap().position, (42.87, 74.56));

        // Fix acquired: the reported position is used.
        assert!(prefetcher.update_with_fix(51.5, -0.12, GpsFix::Fix3d));
        drain_until(&mut prefetcher, |p| {
            p.current_image().is_some_and(|image| image.position == (51.5, -0.12))
        });
        assert_eq!(prefetcher.current_image().unwrap().position, (51.5, -0.12));
    }

    #[test]
    fn test_failed_fetch_clears_in_flight() {
        let failing = FixedProvider(Err(ProviderError::HttpStatus {
            status: 404,
            url: "http://tiles/13/1/1".to_string(),
        }));
        let mut prefetcher = TilePrefetcher::new(Box::new(failing), config()).unwrap();

        assert!(prefetcher.update(10.0, 10.0));
        let deadline = Instant::now() + Duration::from_secs(2);
        while prefetcher.is_in_flight() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }

        assert!(!prefetcher.is_in_flight());
        assert!(prefetcher.current_image().is_none());
        assert_eq!(prefetcher.status(), MapStatus::Idle);
        // Same position, retry delay not yet elapsed.
        assert!(!prefetcher.update(10.0, 10.0));
        // Moving on retries straight away.
        assert!(prefetcher.update(10.1, 10.0));
    }

    #[test]
    fn test_undecodable_tile_keeps_previous_image() {
        let mut prefetcher =
            TilePrefetcher::new(Box::new(FixedProvider(Ok(b"not an image".to_vec()))), config())
                .unwrap();
        assert!(prefetcher.update(1.0, 1.0));

        let deadline = Instant::now() + Duration::from_secs(2);
        while prefetcher.is_in_flight() && Instant::now() < deadline {
            assert!(!prefetcher.drain());
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(prefetcher.current_image().is_none());
        assert!(!prefetcher.is_in_flight());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut prefetcher =
            TilePrefetcher::new(Box::new(FixedProvider(Ok(png_tile()))), config()).unwrap();
        prefetcher.stop();
        prefetcher.stop();
        assert!(!prefetcher.update(5.0, 5.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = TilePrefetcher::new(
            Box::new(FixedProvider(Ok(vec![]))),
            MapConfig::default().with_zoom(40),
        );
        assert!(matches!(result, Err(MapError::InvalidConfig(_))));
    }

    #[test]
    fn test_marker_offset_clamps() {
        assert_eq!(marker_offset(0.5, 400), 200);
        assert_eq!(marker_offset(1.0, 400), 399);
        assert_eq!(marker_offset(0.0, 0), 0);
    }
}
