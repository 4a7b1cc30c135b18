//! Plugin-based backend registry
//!
//! The registry allows DNS backends and geo-lookups to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use geodns_core::registry::BackendRegistry;
//! use geodns_core::config::BackendConfig;
//!
//! let registry = BackendRegistry::new();
//! registry.register_backend("logging", Box::new(logging_factory));
//!
//! let config = BackendConfig::Logging { hostname: "geo.example.com".into() };
//! let backend = registry.create_backend(&config)?;
//! ```
//!
//! Implementation crates should expose a `register()` entry point that adds
//! their factories during initialization.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::{BackendConfig, GeoLookupConfig};
use crate::error::{Error, Result};
use crate::traits::{DnsBackend, DnsBackendFactory, GeoLookup, GeoLookupFactory};

/// Registry of named component factories
///
/// ## Thread Safety
///
/// Uses interior mutability with RwLock, allowing concurrent reads and
/// exclusive writes.
#[derive(Default)]
pub struct BackendRegistry {
    /// Registered DNS backend factories
    backends: RwLock<HashMap<String, Box<dyn DnsBackendFactory>>>,

    /// Registered geo-lookup factories
    geo_lookups: RwLock<HashMap<String, Box<dyn GeoLookupFactory>>>,
}

impl BackendRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS backend factory
    ///
    /// # Parameters
    ///
    /// - `name`: Backend type name (e.g., "logging", "geoscaling")
    /// - `factory`: Factory object for creating backend instances
    pub fn register_backend(&self, name: impl Into<String>, factory: Box<dyn DnsBackendFactory>) {
        let mut backends = self.backends.write().unwrap();
        backends.insert(name.into(), factory);
    }

    /// Register a geo-lookup factory
    ///
    /// # Parameters
    ///
    /// - `name`: Geo-lookup type name (e.g., "http")
    /// - `factory`: Factory object for creating lookup instances
    pub fn register_geo_lookup(&self, name: impl Into<String>, factory: Box<dyn GeoLookupFactory>) {
        let mut lookups = self.geo_lookups.write().unwrap();
        lookups.insert(name.into(), factory);
    }

    /// Create a DNS backend from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsBackend>)`: Created backend instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_backend(&self, config: &BackendConfig) -> Result<Box<dyn DnsBackend>> {
        let backend_type = config.type_name();
        let backends = self.backends.read().unwrap();

        let factory = backends
            .get(backend_type)
            .ok_or_else(|| Error::config(format!("Unknown backend type: {}", backend_type)))?;

        factory.create(config)
    }

    /// Create a geo-lookup from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn GeoLookup>)`: Created lookup instance
    /// - `Err(Error)`: If the type is not registered or creation fails
    pub fn create_geo_lookup(&self, config: &GeoLookupConfig) -> Result<Box<dyn GeoLookup>> {
        let lookup_type = config.type_name();
        let lookups = self.geo_lookups.read().unwrap();

        let factory = lookups
            .get(lookup_type)
            .ok_or_else(|| Error::config(format!("Unknown geo-lookup type: {}", lookup_type)))?;

        factory.create(config)
    }

    /// List all registered backend types
    pub fn list_backends(&self) -> Vec<String> {
        let backends = self.backends.read().unwrap();
        backends.keys().cloned().collect()
    }

    /// List all registered geo-lookup types
    pub fn list_geo_lookups(&self) -> Vec<String> {
        let lookups = self.geo_lookups.read().unwrap();
        lookups.keys().cloned().collect()
    }

    /// Check if a backend type is registered
    pub fn has_backend(&self, name: &str) -> bool {
        let backends = self.backends.read().unwrap();
        backends.contains_key(name)
    }

    /// Check if a geo-lookup type is registered
    pub fn has_geo_lookup(&self, name: &str) -> bool {
        let lookups = self.geo_lookups.read().unwrap();
        lookups.contains_key(name)
    }
}
