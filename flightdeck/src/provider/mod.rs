//! Map tile provider abstraction
//!
//! Traits and implementations for downloading background map tiles. The
//! prefetcher only sees [`Provider`]; HTTP access goes through [`HttpClient`]
//! so tests can swap in a mock.
//!
//! ```ignore
//! use flightdeck::provider::{ProviderConfig, ProviderFactory, ReqwestClient};
//!
//! let factory = ProviderFactory::new(ReqwestClient::new()?);
//! let provider = factory.create(&ProviderConfig::default())?;
//! let jpeg = provider.download_tile(3024, 11888, 13)?;
//! ```

mod arcgis;
mod factory;
mod http;
mod template;
mod types;

pub use arcgis::{ArcGisProvider, ArcGisService};
pub use factory::{ProviderConfig, ProviderFactory};
pub use http::{HttpClient, ReqwestClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use template::TemplateProvider;
pub use types::{Provider, ProviderError};

#[cfg(test)]
pub use http::tests::MockHttpClient;
