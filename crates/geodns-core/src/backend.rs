// # Logging Backend
//
// DNS backend that logs reconfigurations instead of performing them.
//
// ## Purpose
//
// Stands in for a real provider during dry runs, demos and development.
// Every publish is visible in the logs at info level, so the full
// reconciliation pipeline can be exercised without touching DNS.

use async_trait::async_trait;
use tracing::info;

use crate::config::BackendConfig;
use crate::error::{Error, Result};
use crate::geo::GeoRecord;
use crate::traits::{DnsBackend, DnsBackendFactory};

/// Logging-only DNS backend
pub struct LoggingBackend {
    hostname: String,
}

impl LoggingBackend {
    /// Create a backend publishing under the given service hostname
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }
}

#[async_trait]
impl DnsBackend for LoggingBackend {
    async fn reconfigure(&self, targets: &[GeoRecord]) -> Result<()> {
        if targets.is_empty() {
            info!("{}: reconfigured with no targets", self.hostname);
        } else {
            for target in targets {
                info!("{}: targeting {}", self.hostname, target);
            }
        }
        Ok(())
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }

    fn backend_name(&self) -> &'static str {
        "logging"
    }
}

/// Factory for creating logging backends
pub struct LoggingBackendFactory;

impl DnsBackendFactory for LoggingBackendFactory {
    fn create(&self, config: &BackendConfig) -> Result<Box<dyn DnsBackend>> {
        match config {
            BackendConfig::Logging { hostname } => Ok(Box::new(LoggingBackend::new(hostname))),
            _ => Err(Error::config("Invalid config for logging backend")),
        }
    }
}
