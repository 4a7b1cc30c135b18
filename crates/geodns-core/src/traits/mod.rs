//! Core traits for the geo-DNS service
//!
//! This module defines the abstract interfaces that all implementations must
//! follow.
//!
//! - [`MembershipSource`]: Provide the current pool of members
//! - [`DnsBackend`]: Reconfigure the DNS provider with a target set
//! - [`GeoLookup`] / [`NameResolver`]: Derive geography from addresses

pub mod dns_backend;
pub mod geo_lookup;
pub mod membership;

pub use dns_backend::{DnsBackend, DnsBackendFactory, ServiceState};
pub use geo_lookup::{GeoInfo, GeoLookup, GeoLookupFactory, NameResolver};
pub use membership::{Member, MemberId, MembershipSource};
