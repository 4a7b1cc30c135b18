//! Test doubles and common utilities for reconciliation contract tests
//!
//! These mocks let tests control pool membership, name resolution and
//! geography precisely, and observe every backend reconfiguration.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use geodns_core::config::{BackendConfig, EngineConfig, GeoDnsConfig, GeoLookupConfig};
use geodns_core::error::Result;
use geodns_core::geo::GeoRecord;
use geodns_core::traits::{DnsBackend, GeoInfo, GeoLookup, Member, MembershipSource, NameResolver};

/// A membership source whose pool tests can mutate between polls
#[derive(Clone, Default)]
pub struct ControlledMembership {
    pool: Arc<std::sync::Mutex<Vec<Member>>>,
    rescan_count: Arc<AtomicUsize>,
}

impl ControlledMembership {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            pool: Arc::new(std::sync::Mutex::new(members)),
            rescan_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_pool(&self, members: Vec<Member>) {
        *self.pool.lock().unwrap() = members;
    }

    pub fn rescan_count(&self) -> usize {
        self.rescan_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipSource for ControlledMembership {
    async fn rescan(&self) -> Result<()> {
        self.rescan_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn members(&self) -> Result<Vec<Member>> {
        Ok(self.pool.lock().unwrap().clone())
    }
}

/// A DNS backend that records every reconfiguration
#[derive(Clone)]
pub struct RecordingBackend {
    reconfigure_count: Arc<AtomicUsize>,
    history: Arc<std::sync::Mutex<Vec<Vec<GeoRecord>>>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            reconfigure_count: Arc::new(AtomicUsize::new(0)),
            history: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Number of times reconfigure() was called
    pub fn reconfigure_count(&self) -> usize {
        self.reconfigure_count.load(Ordering::SeqCst)
    }

    /// The target set of the most recent reconfiguration
    pub fn last_targets(&self) -> Option<Vec<GeoRecord>> {
        self.history.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DnsBackend for RecordingBackend {
    async fn reconfigure(&self, targets: &[GeoRecord]) -> Result<()> {
        self.reconfigure_count.fetch_add(1, Ordering::SeqCst);
        self.history.lock().unwrap().push(targets.to_vec());
        Ok(())
    }

    fn hostname(&self) -> String {
        "geo.example.com".to_string()
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

/// A name resolver backed by a fixed host table
///
/// IP literals resolve to themselves, as the system resolver would.
pub struct TableNameResolver {
    table: HashMap<String, IpAddr>,
}

impl TableNameResolver {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(host, ip)| (host.to_string(), ip.parse().unwrap()))
                .collect(),
        }
    }
}

#[async_trait]
impl NameResolver for TableNameResolver {
    async fn resolve(&self, hostname: &str) -> Result<IpAddr> {
        if let Ok(ip) = hostname.parse::<IpAddr>() {
            return Ok(ip);
        }
        self.table
            .get(hostname)
            .copied()
            .ok_or_else(|| geodns_core::Error::resolution(hostname, "unknown host"))
    }
}

/// A geo-lookup backed by a fixed IP table; unlisted IPs have no geography
pub struct TableGeoLookup {
    table: HashMap<IpAddr, GeoInfo>,
}

impl TableGeoLookup {
    pub fn new(entries: &[(&str, &str, f64, f64)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(ip, name, lat, lon)| {
                    (ip.parse().unwrap(), GeoInfo::new(name.to_string(), *lat, *lon))
                })
                .collect(),
        }
    }
}

#[async_trait]
impl GeoLookup for TableGeoLookup {
    async fn lookup(&self, ip: IpAddr) -> Result<Option<GeoInfo>> {
        Ok(self.table.get(&ip).cloned())
    }
}

/// Helper to assemble an engine from test doubles
pub fn build_engine(
    membership: ControlledMembership,
    backend: RecordingBackend,
    resolver: TableNameResolver,
    lookup: TableGeoLookup,
    config: GeoDnsConfig,
) -> (
    geodns_core::GeoDnsEngine,
    tokio::sync::mpsc::Receiver<geodns_core::EngineEvent>,
) {
    geodns_core::GeoDnsEngine::new(
        Box::new(membership),
        Box::new(backend),
        Arc::new(resolver),
        Arc::new(lookup),
        config,
    )
    .expect("engine construction succeeds")
}

/// Drain all events currently queued on the receiver
pub fn drain_events(
    rx: &mut tokio::sync::mpsc::Receiver<geodns_core::EngineEvent>,
) -> Vec<geodns_core::EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Helper to create a GeoDnsConfig for testing
pub fn test_config(use_hostnames: bool, include_homeless: bool) -> GeoDnsConfig {
    GeoDnsConfig {
        backend: BackendConfig::Logging {
            hostname: "geo.example.com".to_string(),
        },
        geo_lookup: GeoLookupConfig::Http {
            url: "http://geo.test/json".to_string(),
            timeout_secs: 5,
        },
        engine: EngineConfig {
            use_hostnames,
            include_homeless_entities: include_homeless,
            poll_period_secs: 1,
            refresh_interval_secs: 3600,
            coordinate_mismatch_degrees: 3.0,
            event_channel_capacity: 100,
        },
    }
}
