//! Configuration types for the geo-DNS service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Main geo-DNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoDnsConfig {
    /// DNS backend configuration
    pub backend: BackendConfig,

    /// Geo-lookup configuration
    pub geo_lookup: GeoLookupConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl GeoDnsConfig {
    /// Create a new configuration with defaults
    pub fn new(backend: BackendConfig, geo_lookup: GeoLookupConfig) -> Self {
        Self {
            backend,
            geo_lookup,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.backend.validate()?;
        self.geo_lookup.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// DNS backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Logging-only backend (dry runs, demos)
    Logging {
        /// DNS name the service itself is published under
        hostname: String,
    },

    /// Custom backend
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl BackendConfig {
    /// Validate the backend configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            BackendConfig::Logging { hostname } => {
                if hostname.is_empty() {
                    return Err(crate::Error::config("Backend hostname cannot be empty"));
                }
                Ok(())
            }
            BackendConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom backend factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom backend config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the backend type name
    pub fn type_name(&self) -> &str {
        match self {
            BackendConfig::Logging { .. } => "logging",
            BackendConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Logging {
            hostname: String::new(),
        }
    }
}

/// Geo-lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeoLookupConfig {
    /// HTTP-based geo-lookup (external service)
    Http {
        /// Base URL of the lookup service
        url: String,
        /// Request timeout in seconds
        #[serde(default = "default_geo_timeout_secs")]
        timeout_secs: u64,
    },

    /// Custom geo-lookup
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl GeoLookupConfig {
    /// Validate the geo-lookup configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            GeoLookupConfig::Http { url, timeout_secs } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Geo-lookup URL cannot be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("Geo-lookup timeout must be > 0"));
                }
                Ok(())
            }
            GeoLookupConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom geo-lookup factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom geo-lookup config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the geo-lookup type name
    pub fn type_name(&self) -> &str {
        match self {
            GeoLookupConfig::Http { .. } => "http",
            GeoLookupConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Engine configuration
///
/// The mismatch threshold and refresh interval default to the values the
/// service has always shipped with (3 degrees, one hour); they are exposed
/// here rather than hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Prefer hostnames over IP addresses for the published address and for
    /// geo derivation
    #[serde(default = "default_use_hostnames")]
    pub use_hostnames: bool,

    /// Include members lacking usable geo-info instead of excluding them
    #[serde(default)]
    pub include_homeless_entities: bool,

    /// Poll period of the reconciliation loop (in seconds)
    #[serde(default = "default_poll_period_secs")]
    pub poll_period_secs: u64,

    /// Maximum age of the published target set before a full publish is
    /// forced even with no detected changes (in seconds)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Difference (degrees, either axis) between a member's self-declared
    /// coordinates and the geo-lookup result that triggers a mismatch warning
    #[serde(default = "default_coordinate_mismatch_degrees")]
    pub coordinate_mismatch_degrees: f64,

    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.poll_period_secs == 0 {
            return Err(crate::Error::config("Poll period must be > 0"));
        }
        if self.coordinate_mismatch_degrees < 0.0 {
            return Err(crate::Error::config(
                "Coordinate mismatch threshold cannot be negative",
            ));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            use_hostnames: default_use_hostnames(),
            include_homeless_entities: false,
            poll_period_secs: default_poll_period_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            coordinate_mismatch_degrees: default_coordinate_mismatch_degrees(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_use_hostnames() -> bool {
    true
}

fn default_poll_period_secs() -> u64 {
    30
}

fn default_refresh_interval_secs() -> u64 {
    3600
}

fn default_coordinate_mismatch_degrees() -> f64 {
    3.0
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_geo_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GeoDnsConfig::new(
            BackendConfig::Logging {
                hostname: "geo.example.com".to_string(),
            },
            GeoLookupConfig::Http {
                url: "http://ip-api.example/json".to_string(),
                timeout_secs: 10,
            },
        );
        assert!(config.validate().is_ok());
        assert!(config.engine.use_hostnames);
        assert!(!config.engine.include_homeless_entities);
        assert_eq!(config.engine.refresh_interval_secs, 3600);
    }

    #[test]
    fn zero_poll_period_rejected() {
        let mut config = GeoDnsConfig::new(
            BackendConfig::Logging {
                hostname: "geo.example.com".to_string(),
            },
            GeoLookupConfig::Http {
                url: "http://ip-api.example/json".to_string(),
                timeout_secs: 10,
            },
        );
        config.engine.poll_period_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_backend_hostname_rejected() {
        let config = GeoDnsConfig::new(
            BackendConfig::Logging {
                hostname: String::new(),
            },
            GeoLookupConfig::Http {
                url: "http://ip-api.example/json".to_string(),
                timeout_secs: 10,
            },
        );
        assert!(config.validate().is_err());
    }
}
