// # geodns-core
//
// Core library for the geo-aware DNS reconciliation service.
//
// ## Architecture Overview
//
// This library keeps a geo-DNS service converged with a dynamic pool of
// backend endpoints:
// - **MembershipSource**: Trait providing the current pool of members
// - **DnsBackend**: Trait for pushing the consolidated target set to a
//   DNS-reconfiguration backend
// - **GeoLookup** / **NameResolver**: Traits for deriving geographic
//   coordinates from hostnames and IP addresses
// - **GeoDnsEngine**: Periodic reconciliation loop (scan → diff → publish)
// - **BackendRegistry**: Plugin-based registry for backends and geo-lookups
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Reconciliation logic is separate from
//    membership and DNS-provider integrations
// 2. **Polling Convergence**: A fixed-period scan re-converges the published
//    target set; an interrupted run is repaired by the next one
// 3. **Plugin-Based**: Backends and geo-lookups are registered dynamically
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Quiet Failure**: Per-member and per-poll failures are logged and
//    retried on the next scan, never escalated to the timer

pub mod attributes;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod geo;
pub mod locate;
pub mod membership;
pub mod registry;
pub mod resolve;
pub mod suppress;
pub mod targets;
pub mod traits;

// Re-export core types for convenience
pub use attributes::PublishedAttributes;
pub use backend::LoggingBackend;
pub use config::{BackendConfig, EngineConfig, GeoDnsConfig, GeoLookupConfig};
pub use engine::{EngineEvent, GeoDnsEngine};
pub use error::{Error, Result};
pub use geo::{Coordinates, GeoRecord};
pub use locate::{GeoLocator, SystemNameResolver};
pub use membership::StaticMembershipSource;
pub use registry::BackendRegistry;
pub use targets::TargetTracker;
pub use traits::{
    DnsBackend, GeoInfo, GeoLookup, Member, MemberId, MembershipSource, NameResolver,
    ServiceState,
};
