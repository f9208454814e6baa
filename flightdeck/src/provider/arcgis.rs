//! ArcGIS Online basemap provider.
//!
//! Serves Esri's public basemaps: World Imagery (satellite and aerial
//! photography) and World Shaded Relief (terrain hillshade, readable with a
//! night-vision remap).
//!
//! # URL Pattern
//!
//! `https://server.arcgisonline.com/ArcGIS/rest/services/{service}/MapServer/tile/{z}/{y}/{x}`
//!
//! - Row comes before column
//! - No authentication required for the public tier
//!
//! # Terms of Use
//!
//! The basemaps are provided by Esri and are subject to their terms of use.
//! See: <https://www.esri.com/en-us/legal/terms/full-master-agreement>

use std::fmt;
use std::str::FromStr;

use crate::provider::{HttpClient, Provider, ProviderError};

/// ArcGIS Online tile root.
const ARCGIS_ROOT: &str = "https://server.arcgisonline.com/ArcGIS/rest/services";

const MIN_ZOOM: u8 = 0;

/// World Imagery goes to 19 in most areas.
const IMAGERY_MAX_ZOOM: u8 = 19;

/// Shaded relief is only published down to 13.
const RELIEF_MAX_ZOOM: u8 = 13;

/// Which ArcGIS basemap to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArcGisService {
    /// Satellite and aerial imagery.
    #[default]
    WorldImagery,
    /// Grayscale terrain hillshade.
    WorldShadedRelief,
}

impl ArcGisService {
    /// Service name used in the URL path.
    pub fn path(&self) -> &'static str {
        match self {
            ArcGisService::WorldImagery => "World_Imagery",
            ArcGisService::WorldShadedRelief => "World_Shaded_Relief",
        }
    }

    /// Short name used in configuration files.
    pub fn config_name(&self) -> &'static str {
        match self {
            ArcGisService::WorldImagery => "imagery",
            ArcGisService::WorldShadedRelief => "relief",
        }
    }

    fn max_zoom(&self) -> u8 {
        match self {
            ArcGisService::WorldImagery => IMAGERY_MAX_ZOOM,
            ArcGisService::WorldShadedRelief => RELIEF_MAX_ZOOM,
        }
    }
}

impl fmt::Display for ArcGisService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

impl FromStr for ArcGisService {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imagery" | "world_imagery" | "satellite" => Ok(ArcGisService::WorldImagery),
            "relief" | "world_shaded_relief" | "terrain" => Ok(ArcGisService::WorldShadedRelief),
            other => Err(format!("unknown ArcGIS service '{}'", other)),
        }
    }
}

/// ArcGIS Online basemap provider.
///
/// # Example
///
/// ```ignore
/// use flightdeck::provider::{ArcGisProvider, ArcGisService, ReqwestClient};
///
/// let client = ReqwestClient::new()?;
/// let provider = ArcGisProvider::with_service(client, ArcGisService::WorldShadedRelief);
/// ```
pub struct ArcGisProvider<C: HttpClient> {
    http_client: C,
    service: ArcGisService,
}

impl<C: HttpClient> ArcGisProvider<C> {
    /// World Imagery provider.
    pub fn new(http_client: C) -> Self {
        Self::with_service(http_client, ArcGisService::default())
    }

    pub fn with_service(http_client: C, service: ArcGisService) -> Self {
        Self {
            http_client,
            service,
        }
    }

    pub fn service(&self) -> ArcGisService {
        self.service
    }

    /// `{root}/{service}/MapServer/tile/{z}/{row}/{col}`
    fn build_url(&self, row: u32, col: u32, zoom: u8) -> String {
        format!(
            "{}/{}/MapServer/tile/{}/{}/{}",
            ARCGIS_ROOT,
            self.service.path(),
            zoom,
            row,
            col
        )
    }
}

impl<C: HttpClient> Provider for ArcGisProvider<C> {
    fn download_tile(&self, row: u32, col: u32, zoom: u8) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(zoom) {
            return Err(ProviderError::UnsupportedZoom(zoom));
        }

        let url = self.build_url(row, col, zoom);
        self.http_client.get(&url)
    }

    fn name(&self) -> &str {
        match self.service {
            ArcGisService::WorldImagery => "ArcGIS World Imagery",
            ArcGisService::WorldShadedRelief => "ArcGIS Shaded Relief",
        }
    }

    fn min_zoom(&self) -> u8 {
        MIN_ZOOM
    }

    fn max_zoom(&self) -> u8 {
        self.service.max_zoom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHttpClient;

    fn sample_jpeg_response() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0]
    }

    fn provider(service: ArcGisService) -> ArcGisProvider<MockHttpClient> {
        ArcGisProvider::with_service(MockHttpClient::new(Ok(sample_jpeg_response())), service)
    }

    #[test]
    fn test_url_construction() {
        let provider = provider(ArcGisService::WorldImagery);
        assert_eq!(
            provider.build_url(3024, 11888, 13),
            "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/13/3024/11888"
        );
    }

    #[test]
    fn test_relief_url_and_zoom_range() {
        let provider = provider(ArcGisService::WorldShadedRelief);
        assert!(provider
            .build_url(1, 2, 3)
            .contains("/World_Shaded_Relief/MapServer/tile/3/1/2"));
        assert!(provider.supports_zoom(13));
        assert!(!provider.supports_zoom(14));
    }

    #[test]
    fn test_download_tile_success() {
        let provider = provider(ArcGisService::WorldImagery);
        let result = provider.download_tile(100, 200, 10);
        assert_eq!(result.unwrap(), sample_jpeg_response());
        assert_eq!(provider.http_client.requested().len(), 1);
    }

    #[test]
    fn test_unsupported_zoom_skips_request() {
        let provider = provider(ArcGisService::WorldImagery);
        assert_eq!(
            provider.download_tile(0, 0, 20),
            Err(ProviderError::UnsupportedZoom(20))
        );
        assert!(provider.http_client.requested().is_empty());
    }

    #[test]
    fn test_network_error_propagates() {
        let provider = ArcGisProvider::new(MockHttpClient::new(Err(ProviderError::HttpError(
            "Connection refused".to_string(),
        ))));
        match provider.download_tile(1, 1, 5) {
            Err(ProviderError::HttpError(msg)) => assert!(msg.contains("Connection refused")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_service_parsing() {
        assert_eq!("relief".parse::<ArcGisService>(), Ok(ArcGisService::WorldShadedRelief));
        assert_eq!("World_Imagery".parse::<ArcGisService>(), Ok(ArcGisService::WorldImagery));
        assert!("bing".parse::<ArcGisService>().is_err());
        assert_eq!(ArcGisService::WorldShadedRelief.to_string(), "relief");
    }
}
