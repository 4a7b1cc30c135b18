// # Geo Lookup and Name Resolution Traits
//
// Defines the interfaces the locator uses to turn hostnames and IPs into
// geographic coordinates.
//
// ## Implementations
//
// - HTTP geo-lookup: `geodns-geo-http` crate
// - System name resolution: `geodns_core::locate::SystemNameResolver`
//
// A lookup that completes but knows nothing about the address returns
// `Ok(None)`; that is an ordinary answer, not an error. Reserve `Err` for
// the lookup itself failing (timeout, transport, malformed response).

use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Geographic information for a single address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoInfo {
    /// Human-readable location name (e.g. "London, GB")
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoInfo {
    pub fn new(display_name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            display_name: display_name.into(),
            latitude,
            longitude,
        }
    }
}

/// Trait for geo-lookup implementations
///
/// Implementations must be thread-safe and usable across async tasks. The
/// engine calls lookups synchronously within its poll; a slow lookup slows
/// the poll but never overlaps with another run.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Look up geographic information for an IP address
    ///
    /// # Returns
    ///
    /// - `Ok(Some(GeoInfo))`: Geography is known for this address
    /// - `Ok(None)`: The lookup has no geography for this address
    /// - `Err(Error)`: The lookup itself failed
    async fn lookup(&self, ip: IpAddr) -> Result<Option<GeoInfo>, crate::Error>;
}

/// Trait for hostname-to-address resolution
///
/// Split from [`GeoLookup`] so tests and embedders can control DNS behavior
/// independently of the geography database.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve a hostname to one of its addresses
    async fn resolve(&self, hostname: &str) -> Result<IpAddr, crate::Error>;
}

/// Helper trait for constructing geo-lookups from configuration
pub trait GeoLookupFactory: Send + Sync {
    /// Create a GeoLookup instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this lookup
    ///
    /// # Returns
    ///
    /// A boxed GeoLookup trait object
    fn create(
        &self,
        config: &crate::config::GeoLookupConfig,
    ) -> Result<Box<dyn GeoLookup>, crate::Error>;
}
