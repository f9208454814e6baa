//! Generic `{z}/{x}/{y}` URL template provider.
//!
//! Covers OpenStreetMap-style tile servers and self-hosted tile caches.

use crate::provider::{HttpClient, Provider, ProviderError};

const PLACEHOLDERS: [&str; 3] = ["{z}", "{x}", "{y}"];

/// Provider that fills a URL template.
pub struct TemplateProvider<C: HttpClient> {
    http_client: C,
    template: String,
    name: String,
    min_zoom: u8,
    max_zoom: u8,
}

impl<C: HttpClient> TemplateProvider<C> {
    /// Create a provider for `template`, which must contain `{z}`, `{x}` and
    /// `{y}`.
    pub fn new(http_client: C, template: impl Into<String>) -> Result<Self, ProviderError> {
        let template = template.into();
        if let Some(&missing) = PLACEHOLDERS.iter().find(|p| !template.contains(*p)) {
            return Err(ProviderError::InvalidTemplate {
                template,
                missing,
            });
        }

        Ok(Self {
            http_client,
            name: template_host(&template).unwrap_or("custom").to_string(),
            template,
            min_zoom: 0,
            max_zoom: 19,
        })
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    fn build_url(&self, row: u32, col: u32, zoom: u8) -> String {
        self.template
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &col.to_string())
            .replace("{y}", &row.to_string())
    }
}

/// Host part of a URL, used as the display name.
fn template_host(template: &str) -> Option<&str> {
    let rest = template.split_once("://")?.1;
    rest.split('/').next().filter(|host| !host.is_empty())
}

impl<C: HttpClient> Provider for TemplateProvider<C> {
    fn download_tile(&self, row: u32, col: u32, zoom: u8) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(zoom) {
            return Err(ProviderError::UnsupportedZoom(zoom));
        }
        self.http_client.get(&self.build_url(row, col, zoom))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}
