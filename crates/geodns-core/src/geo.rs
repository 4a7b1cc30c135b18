//! Geographic value types
//!
//! A [`GeoRecord`] is the unit the service publishes: an address (hostname or
//! literal IP) annotated with a display name and coordinates. Two records
//! point at the same location when their addresses are equal; coordinates are
//! advisory metadata and do not participate in change detection.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True if either axis differs from `other` by more than `degrees`
    pub fn diverges_from(&self, other: &Coordinates, degrees: f64) -> bool {
        (self.latitude - other.latitude).abs() > degrees
            || (self.longitude - other.longitude).abs() > degrees
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// A published geo-located address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    /// Hostname or literal IP the DNS backend should answer with
    pub address: String,
    /// Human-readable location name
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoRecord {
    pub fn new(
        address: impl Into<String>,
        display_name: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
            latitude,
            longitude,
        }
    }

    /// Placeholder record for an address with no geography information
    pub fn unknown_location(address: impl Into<String>) -> Self {
        let address = address.into();
        let display_name = format!("unknown location at {}", address);
        Self {
            address,
            display_name,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    /// Same published location as `other`
    ///
    /// Change detection compares addresses only; coordinate drift in the
    /// lookup service must not churn the published set.
    pub fn same_location(&self, other: &GeoRecord) -> bool {
        self.address == other.address
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

impl fmt::Display for GeoRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{} ({}, {})]",
            self.address, self.display_name, self.latitude, self.longitude
        )
    }
}

/// Whether `addr` is a literal IP on a private subnet
///
/// Hostnames return false; only literal RFC 1918, loopback and link-local
/// addresses count. Private addresses have no public geography and cannot be
/// served to external resolvers.
pub fn is_private_subnet(addr: &str) -> bool {
    match addr.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        Ok(IpAddr::V6(v6)) => v6.is_loopback() || (v6.segments()[0] & 0xfe00) == 0xfc00,
        Err(_) => false,
    }
}
