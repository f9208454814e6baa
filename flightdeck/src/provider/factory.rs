//! Provider construction from configuration.

use std::fmt;

use super::{ArcGisProvider, ArcGisService, HttpClient, Provider, ProviderError, TemplateProvider};

/// Which tile source to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    ArcGis(ArcGisService),
    /// `{z}/{x}/{y}` URL template.
    Template(String),
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::ArcGis(ArcGisService::default())
    }
}

impl ProviderConfig {
    /// Parse a configuration value: an ArcGIS service name or a URL template.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.contains("{z}") {
            Ok(ProviderConfig::Template(value.to_string()))
        } else {
            value.parse().map(ProviderConfig::ArcGis)
        }
    }
}

impl fmt::Display for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::ArcGis(service) => write!(f, "{}", service),
            ProviderConfig::Template(template) => f.write_str(template),
        }
    }
}

/// Builds boxed providers sharing one HTTP client type.
pub struct ProviderFactory<C: HttpClient + Clone + 'static> {
    http_client: C,
}

impl<C: HttpClient + Clone + 'static> ProviderFactory<C> {
    pub fn new(http_client: C) -> Self {
        Self { http_client }
    }

    pub fn create(&self, config: &ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
        let client = self.http_client.clone();
        Ok(match config {
            ProviderConfig::ArcGis(service) => {
                Box::new(ArcGisProvider::with_service(client, *service))
            }
            ProviderConfig::Template(template) => {
                Box::new(TemplateProvider::new(client, template.clone())?)
            }
        })
    }
}
