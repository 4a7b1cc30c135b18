//! Core reconciliation engine
//!
//! The GeoDnsEngine is responsible for:
//! - Polling the membership source for the current pool
//! - Resolving each member to an address and geographic record
//! - Diffing against the tracked target set
//! - Publishing the consolidated set via the DnsBackend when needed
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ MembershipSource │─── pool of Members ──┐
//! └──────────────────┘                      │
//!                                           ▼
//!                                  ┌──────────────┐
//!                                  │ GeoDnsEngine │── EngineEvent ──▶
//!                                  └──────────────┘
//!                │                         │                      │
//!                ▼                         ▼                      ▼
//!       ┌──────────────┐          ┌───────────────┐      ┌──────────────┐
//!       │ NameResolver │          │   GeoLookup   │      │  DnsBackend  │
//!       │ (hostname→IP)│          │ (IP→geography)│      │ (reconfigure)│
//!       └──────────────┘          └───────────────┘      └──────────────┘
//! ```
//!
//! ## Poll Flow
//!
//! 1. Ask the membership source to rescan, then read the pool
//! 2. Add/update every present member (address inference → policy filters →
//!    geo location → change detection)
//! 3. Remove members that left the pool
//! 4. Publish if anything changed, or if the published set has gone stale
//!
//! A poll that fails is logged and abandoned; the next tick re-converges.
//! Reconciliation is idempotent, so a half-applied poll is harmless.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::attributes::PublishedAttributes;
use crate::config::GeoDnsConfig;
use crate::error::Result;
use crate::geo::{Coordinates, GeoRecord, is_private_subnet};
use crate::locate::GeoLocator;
use crate::resolve::resolve_address;
use crate::suppress::Suppressions;
use crate::targets::TargetTracker;
use crate::traits::{
    DnsBackend, GeoLookup, Member, MemberId, MembershipSource, NameResolver, ServiceState,
};

/// Events emitted by the GeoDnsEngine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Engine started
    Started,

    /// A reconciliation pass finished
    ScanCompleted {
        pool_size: usize,
        changed: bool,
    },

    /// A member was added to (or re-addressed in) the target set
    TargetAdded {
        member: MemberId,
        address: String,
    },

    /// A member left the target set
    TargetRemoved {
        member: MemberId,
    },

    /// A member's declared coordinates disagree with the geo lookup
    CoordinateMismatch {
        member: MemberId,
        declared: Coordinates,
        resolved: Coordinates,
    },

    /// The target set was pushed to the DNS backend
    Published {
        target_count: usize,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// Core geo-DNS reconciliation engine
///
/// ## Lifecycle
///
/// 1. Create with [`GeoDnsEngine::new()`]
/// 2. Start with [`GeoDnsEngine::run()`]
/// 3. Engine polls until a shutdown signal is received
///
/// ## Threading
///
/// One timer drives the loop, so at most one reconciliation pass is ever in
/// flight; overlap is impossible by construction rather than by locking.
/// The tracked target map and published attributes are shared handles
/// ([`TargetTracker`], [`PublishedAttributes`]) that external readers may
/// clone; they always observe snapshot copies, never the live map.
pub struct GeoDnsEngine {
    /// Source of pool membership
    membership: Box<dyn MembershipSource>,

    /// DNS reconfiguration target
    backend: Box<dyn DnsBackend>,

    /// Hostname/IP to geography
    locator: GeoLocator,

    /// Tracked member → record associations
    tracker: TargetTracker,

    /// Externally visible attributes
    attributes: PublishedAttributes,

    /// One-time diagnostic bookkeeping
    suppressions: Mutex<Suppressions>,

    /// Timestamp of the last full publish
    last_publish: Mutex<Option<DateTime<Utc>>>,

    poll_period: Duration,
    refresh_interval: chrono::Duration,
    use_hostnames: bool,
    include_homeless: bool,
    mismatch_degrees: f64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl GeoDnsEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `membership`: Pool membership source
    /// - `backend`: DNS backend implementation
    /// - `resolver`: Hostname resolution implementation
    /// - `geo_lookup`: Geo-lookup implementation
    /// - `config`: Service configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields
    /// engine events
    pub fn new(
        membership: Box<dyn MembershipSource>,
        backend: Box<dyn DnsBackend>,
        resolver: std::sync::Arc<dyn NameResolver>,
        geo_lookup: std::sync::Arc<dyn GeoLookup>,
        config: GeoDnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;
        let engine_config = config.engine;

        let (tx, rx) = mpsc::channel(engine_config.event_channel_capacity);

        let engine = Self {
            membership,
            backend,
            locator: GeoLocator::new(resolver, geo_lookup, engine_config.use_hostnames),
            tracker: TargetTracker::new(),
            attributes: PublishedAttributes::new(),
            suppressions: Mutex::new(Suppressions::new()),
            last_publish: Mutex::new(None),
            poll_period: Duration::from_secs(engine_config.poll_period_secs),
            refresh_interval: chrono::Duration::seconds(engine_config.refresh_interval_secs as i64),
            use_hostnames: engine_config.use_hostnames,
            include_homeless: engine_config.include_homeless_entities,
            mismatch_degrees: engine_config.coordinate_mismatch_degrees,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Handle to the tracked target set
    pub fn targets(&self) -> TargetTracker {
        self.tracker.clone()
    }

    /// Handle to the published attributes
    pub fn attributes(&self) -> PublishedAttributes {
        self.attributes.clone()
    }

    /// Run the engine
    ///
    /// Starts the periodic reconciliation loop; the first pass runs
    /// immediately. Runs until SIGINT/SIGTERM.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Internal run implementation that accepts an optional shutdown signal
    async fn run_internal(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.set_service_state(ServiceState::Starting);
        self.emit_event(EngineEvent::Started);
        debug!("starting poll, period {:?}", self.poll_period);

        let mut ticker = tokio::time::interval(self.poll_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.set_service_state(ServiceState::Running);

        if let Some(mut rx) = shutdown_rx {
            // Test mode: wait for provided shutdown signal
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.poll_and_log().await,
                    _ = &mut rx => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        } else {
            // Production mode: wait for SIGINT/SIGTERM
            loop {
                tokio::select! {
                    _ = ticker.tick() => self.poll_and_log().await,
                    _ = tokio::signal::ctrl_c() => {
                        info!("shutdown signal received");
                        self.emit_event(EngineEvent::Stopped {
                            reason: "shutdown signal".to_string(),
                        });
                        break;
                    }
                }
            }
        }

        self.set_service_state(ServiceState::Stopped);
        info!("reconciliation loop stopped");
        Ok(())
    }

    /// A poll failure never escalates past this point; the timer lives on
    async fn poll_and_log(&self) {
        if let Err(e) = self.poll_once().await {
            error!("problem refreshing pool membership: {}", e);
        }
    }

    /// Run a single reconciliation pass
    ///
    /// Public so embedders (and tests) can drive reconciliation manually
    /// instead of through the timer.
    pub async fn poll_once(&self) -> Result<()> {
        debug!("refreshing targets");
        self.membership.rescan().await?;
        let pool = self.membership.members().await?;
        debug!("refreshing targets, pool now has {} members", pool.len());

        let mut changed = false;
        let mut departed: HashSet<MemberId> = self.tracker.member_ids().into_iter().collect();
        for member in &pool {
            departed.remove(&member.id);
            changed |= self.add_target_host(member).await;
        }
        // anything left in departed is no longer in the pool
        for id in departed {
            if self.tracker.remove(&id) {
                info!("removing reference to {}", id);
                self.emit_event(EngineEvent::TargetRemoved { member: id.clone() });
                changed = true;
            }
            self.suppressions.lock().unwrap().forget(&id);
        }

        // periodic full publish as a safety net, even with no changes
        let stale = match *self.last_publish.lock().unwrap() {
            None => true,
            Some(at) => Utc::now().signed_duration_since(at) >= self.refresh_interval,
        };
        if changed || stale {
            self.publish().await?;
        }

        self.emit_event(EngineEvent::ScanCompleted {
            pool_size: pool.len(),
            changed,
        });
        Ok(())
    }

    /// Add or update this member's target, if resolvable under policy
    ///
    /// The inferred hostname is always preferred for geography when
    /// available; `use_hostnames == false` only switches which identifier is
    /// published (and allows geography to fall back to the IP).
    ///
    /// Returns true if the target set changed. Errors analysing a member are
    /// contained here: the member is skipped for this poll.
    async fn add_target_host(&self, member: &Member) -> bool {
        match self.classify_member(member).await {
            Ok(changed) => changed,
            Err(e) => {
                warn!("ignoring {} (error analysing location: {})", member.id, e);
                false
            }
        }
    }

    async fn classify_member(&self, member: &Member) -> Result<bool> {
        let flagged = self.suppressions.lock().unwrap().geo_flagged(&member.id);
        let resolved = resolve_address(member, flagged);

        let addr = match resolved.ip {
            Some(ip) if !self.use_hostnames => Some(ip.to_string()),
            _ => resolved.hostname.clone(),
        };

        let Some(addr) = addr else {
            if self
                .suppressions
                .lock()
                .unwrap()
                .first_without_address(&member.id)
            {
                debug!(
                    "ignoring {}, will continue scanning (no hostname or URL available)",
                    member.id
                );
            }
            return Ok(false);
        };

        if is_private_subnet(&addr) {
            if self.include_homeless {
                if self
                    .suppressions
                    .lock()
                    .unwrap()
                    .first_without_geo(&member.id)
                {
                    info!(
                        "including {}, even though {} is a private subnet (homeless members included)",
                        member.id, addr
                    );
                }
            } else {
                if self
                    .suppressions
                    .lock()
                    .unwrap()
                    .first_without_geo(&member.id)
                {
                    warn!("ignoring {} (private subnet detected for {})", member.id, addr);
                }
                return Ok(false);
            }
        }

        let located = self
            .locator
            .locate(resolved.hostname.as_deref(), resolved.ip)
            .await?;

        let record = match located {
            Some(record) => record,
            None => {
                if self.include_homeless {
                    if self
                        .suppressions
                        .lock()
                        .unwrap()
                        .first_without_geo(&member.id)
                    {
                        info!(
                            "including {}, even though no geography info available for {}",
                            member.id, addr
                        );
                    }
                    match member.declared_coordinates {
                        Some(coords) => GeoRecord::new(
                            addr.clone(),
                            member.id.to_string(),
                            coords.latitude,
                            coords.longitude,
                        ),
                        None => GeoRecord::unknown_location(addr.clone()),
                    }
                } else {
                    if self
                        .suppressions
                        .lock()
                        .unwrap()
                        .first_without_geo(&member.id)
                    {
                        warn!(
                            "ignoring {} (no geography info available for {})",
                            member.id, addr
                        );
                    }
                    return Ok(false);
                }
            }
        };

        // Already tracked at the same published address: nothing to do
        let previous = self.tracker.get(&member.id);
        if let Some(prev) = &previous
            && prev.same_location(&record)
        {
            return Ok(false);
        }

        // Declared coordinates are advisory; warn if the lookup disagrees
        // dramatically, but publish the looked-up record regardless
        if let Some(declared) = member.declared_coordinates {
            let resolved_coords = record.coordinates();
            if resolved_coords.diverges_from(&declared, self.mismatch_degrees) {
                warn!(
                    "geo mismatch: {} declares {} but its address resolves to {}",
                    member.id, declared, resolved_coords
                );
                self.emit_event(EngineEvent::CoordinateMismatch {
                    member: member.id.clone(),
                    declared,
                    resolved: resolved_coords,
                });
            }
        }

        self.suppressions.lock().unwrap().clear(&member.id);
        match &previous {
            Some(prev) => info!("adding {} at {} (previously {})", member.id, record, prev),
            None => info!("adding {} at {}", member.id, record),
        }
        self.emit_event(EngineEvent::TargetAdded {
            member: member.id.clone(),
            address: record.address.clone(),
        });
        self.tracker.insert(member.id.clone(), record);
        Ok(true)
    }

    /// Push the current target set to the backend and refresh attributes
    ///
    /// The publish timestamp is stamped up front, so a failing backend is
    /// retried on the next change or staleness expiry rather than every
    /// poll. Attributes are only updated after the backend accepted the set.
    async fn publish(&self) -> Result<()> {
        debug!("full update of published targets");
        let published_at = Utc::now();
        *self.last_publish.lock().unwrap() = Some(published_at);

        let snapshot = self.tracker.snapshot();
        let targets: Vec<(MemberId, String)> = snapshot
            .iter()
            .map(|(id, record)| (id.clone(), record.address.clone()))
            .collect();

        let mut records: Vec<GeoRecord> = Vec::with_capacity(snapshot.len());
        for (_, record) in snapshot {
            if !records.contains(&record) {
                records.push(record);
            }
        }

        self.backend.reconfigure(&records).await?;
        self.attributes.set_targets(targets, published_at);
        self.emit_event(EngineEvent::Published {
            target_count: records.len(),
        });
        Ok(())
    }

    /// Publish the lifecycle state (and derived up flag and own hostname)
    pub fn set_service_state(&self, state: ServiceState) {
        self.attributes.set_service_state(state, self.backend.hostname());
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Send event, logging a warning if the channel is full; dropping is
        // preferable to unbounded growth when nobody is consuming
        if self.event_tx.try_send(event).is_err() {
            warn!("event channel full, dropping event");
        }
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: contract tests require controlled shutdown.
    /// Production code should use `run()`, which manages shutdown via OS
    /// signals.
    pub async fn run_with_shutdown(
        &self,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }
}
