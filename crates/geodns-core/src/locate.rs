//! Geo location of resolved addresses
//!
//! The locator turns a hostname/IP pair into a [`GeoRecord`], preferring the
//! hostname path for geography but honoring the configured address policy
//! for what gets published.

use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use tracing::trace;

use crate::error::{Error, Result};
use crate::geo::GeoRecord;
use crate::traits::{GeoInfo, GeoLookup, NameResolver};

/// Name resolver backed by the operating system
///
/// Uses tokio's resolver (getaddrinfo on most platforms) and returns the
/// first address of the answer set.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNameResolver;

#[async_trait]
impl NameResolver for SystemNameResolver {
    async fn resolve(&self, hostname: &str) -> Result<IpAddr> {
        let mut addresses = tokio::net::lookup_host((hostname, 0))
            .await
            .map_err(|e| Error::resolution(hostname, e.to_string()))?;

        addresses
            .next()
            .map(|sock: SocketAddr| sock.ip())
            .ok_or_else(|| Error::resolution(hostname, "no addresses returned"))
    }
}

/// Derives a [`GeoRecord`] from a member's hostname and/or IP
///
/// The hostname is the canonical identity and is always tried first for
/// geography. `use_hostnames == false` only says that a known IP should win
/// as the PUBLISHED address: the geographic metadata still comes from
/// whichever identifier resolved, and hostname-resolution failures are
/// tolerated as long as the IP can stand in.
pub struct GeoLocator {
    resolver: std::sync::Arc<dyn NameResolver>,
    lookup: std::sync::Arc<dyn GeoLookup>,
    use_hostnames: bool,
}

impl GeoLocator {
    pub fn new(
        resolver: std::sync::Arc<dyn NameResolver>,
        lookup: std::sync::Arc<dyn GeoLookup>,
        use_hostnames: bool,
    ) -> Self {
        Self {
            resolver,
            lookup,
            use_hostnames,
        }
    }

    /// Locate the geography for a hostname/IP pair
    ///
    /// # Returns
    ///
    /// - `Ok(Some(GeoRecord))`: A publishable record
    /// - `Ok(None)`: No geography is available from any path ("homeless");
    ///   the caller decides whether policy still admits the member
    /// - `Err(Error)`: Resolution or lookup failed hard; the caller treats
    ///   the member as failed for this poll
    pub async fn locate(&self, hostname: Option<&str>, ip: Option<IpAddr>) -> Result<Option<GeoRecord>> {
        let mut from_hostname: Option<GeoRecord> = None;

        if let Some(host) = hostname {
            match self.resolver.resolve(host).await {
                Ok(resolved) => {
                    from_hostname = self
                        .lookup
                        .lookup(resolved)
                        .await?
                        .map(|info| record(host.to_string(), info));
                }
                Err(e) => {
                    if self.use_hostnames || ip.is_none() {
                        return Err(e);
                    }
                    trace!(
                        "failed to locate geo info from hostname {}; will try with IP {:?} ({})",
                        host, ip, e
                    );
                }
            }
        }

        // Switch to the IP address if that's what we're configured to
        // publish, and it's available
        if !self.use_hostnames && let Some(ip) = ip {
            return match from_hostname {
                None => {
                    let located = self
                        .lookup
                        .lookup(ip)
                        .await?
                        .map(|info| record(ip.to_string(), info));
                    trace!(
                        "located geo info {:?} from ip {} (hostname {:?} unavailable)",
                        located, ip, hostname
                    );
                    Ok(located)
                }
                Some(rec) => {
                    trace!(
                        "located geo info from hostname {:?}; switching address to ip {}",
                        hostname, ip
                    );
                    Ok(Some(GeoRecord {
                        address: ip.to_string(),
                        ..rec
                    }))
                }
            };
        }

        Ok(from_hostname)
    }
}

fn record(address: String, info: GeoInfo) -> GeoRecord {
    GeoRecord::new(address, info.display_name, info.latitude, info.longitude)
}
