// # HTTP Geo Lookup
//
// This crate provides an HTTP-based geo-lookup for the geo-DNS service.
//
// ## Purpose
//
// Queries an ip-api style JSON endpoint (`GET {base}/{ip}`) for the
// coordinates of an address. Works against the public ip-api.com service or
// any self-hosted lookalike.
//
// ## Answer semantics
//
// A response with `"status": "fail"` (or missing coordinates) means the
// service has no geography for that address; that is reported as `Ok(None)`,
// not as an error. Transport failures, timeouts and malformed bodies are
// errors and surface to the engine's per-member handling.

use std::net::IpAddr;
use std::time::Duration;

use geodns_core::config::GeoLookupConfig;
use geodns_core::traits::{GeoInfo, GeoLookup, GeoLookupFactory};
use geodns_core::{BackendRegistry, Error, Result};

use serde::Deserialize;
use tracing::debug;

/// Default request timeout
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Response shape of an ip-api style lookup
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl LookupResponse {
    fn into_geo_info(self) -> Option<GeoInfo> {
        if self.status.as_deref() == Some("fail") {
            return None;
        }
        let (lat, lon) = (self.lat?, self.lon?);
        let display_name = match (self.city, self.country) {
            (Some(city), Some(country)) => format!("{}, {}", city, country),
            (Some(city), None) => city,
            (None, Some(country)) => country,
            (None, None) => "unknown".to_string(),
        };
        Some(GeoInfo::new(display_name, lat, lon))
    }
}

/// HTTP-based geo-lookup
pub struct HttpGeoLookup {
    /// Base URL of the lookup service
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpGeoLookup {
    /// Create a new lookup against the given base URL
    ///
    /// # Parameters
    ///
    /// - `url`: base URL, e.g. "http://ip-api.com/json"
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create with a custom request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait::async_trait]
impl GeoLookup for HttpGeoLookup {
    async fn lookup(&self, ip: IpAddr) -> Result<Option<GeoInfo>> {
        let url = format!("{}/{}", self.url.trim_end_matches('/'), ip);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::geo_lookup(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::geo_lookup(format!("HTTP error: {}", response.status())));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| Error::geo_lookup(format!("malformed response: {}", e)))?;

        let info = body.into_geo_info();
        debug!("geo lookup for {}: {:?}", ip, info);
        Ok(info)
    }
}

/// Factory for creating HTTP geo-lookups
pub struct HttpGeoLookupFactory;

impl GeoLookupFactory for HttpGeoLookupFactory {
    fn create(&self, config: &GeoLookupConfig) -> Result<Box<dyn GeoLookup>> {
        match config {
            GeoLookupConfig::Http { url, timeout_secs } => Ok(Box::new(
                HttpGeoLookup::with_timeout(url.clone(), Duration::from_secs(*timeout_secs)),
            )),
            _ => Err(Error::config("Invalid config for HTTP geo-lookup")),
        }
    }
}

/// Register the HTTP geo-lookup with a registry
pub fn register(registry: &BackendRegistry) {
    registry.register_geo_lookup("http", Box::new(HttpGeoLookupFactory));
}
