// # DNS Backend Trait
//
// Defines the interface for pushing the consolidated target set to a
// geo-DNS provider.
//
// ## Implementations
//
// - Logging-only: `geodns_core::backend::LoggingBackend`
// - Production backends wrap a provider API (geo-DNS SaaS, split-horizon
//   nameserver, etc.) and translate the record set into provider calls.
//
// ## Contract
//
// `reconfigure` receives the COMPLETE deduplicated target set on every call;
// it is not an incremental diff. An empty slice means "no targets" and must
// reconfigure the provider accordingly rather than being treated as an error.
// The engine decides WHEN to publish; backends only carry the call out, and
// must not retry, cache or reorder on their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::geo::GeoRecord;

/// Lifecycle state published for the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Created,
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl ServiceState {
    /// Whether this state counts as "service up" for the published flag
    pub fn is_up(&self) -> bool {
        matches!(self, ServiceState::Running)
    }
}

/// Trait for DNS backend implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
///
/// # Idempotency
///
/// `reconfigure` must be idempotent: republishing an unchanged target set
/// (the engine does this on its staleness interval) must be safe.
#[async_trait]
pub trait DnsBackend: Send + Sync {
    /// Reconfigure the provider so the given hosts are targeted
    ///
    /// # Parameters
    ///
    /// - `targets`: the complete, deduplicated target set (may be empty)
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider now serves this target set
    /// - `Err(Error)`: The provider could not be reconfigured; the engine
    ///   logs the failure and retries on a later poll
    async fn reconfigure(&self, targets: &[GeoRecord]) -> Result<(), crate::Error>;

    /// DNS name the service itself is published under
    fn hostname(&self) -> String;

    /// Get the backend name (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS backends from configuration
pub trait DnsBackendFactory: Send + Sync {
    /// Create a DnsBackend instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this backend
    ///
    /// # Returns
    ///
    /// A boxed DnsBackend trait object
    fn create(&self, config: &crate::config::BackendConfig)
    -> Result<Box<dyn DnsBackend>, crate::Error>;
}
