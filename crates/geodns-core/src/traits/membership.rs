// # Membership Source Trait
//
// Defines the interface for discovering the pool of endpoints the service
// redirects traffic to.
//
// ## Implementations
//
// - Static pool: `geodns_core::membership::StaticMembershipSource`
// - Production sources wrap an orchestrator or auto-scaling group API and
//   translate its instances into `Member` snapshots.
//
// ## Usage
//
// ```rust,ignore
// use geodns_core::traits::MembershipSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* MembershipSource implementation */;
//
//     source.rescan().await?;
//     for member in source.members().await? {
//         println!("{}: {:?}", member.id, member.hostname);
//     }
//     Ok(())
// }
// ```

use std::fmt;
use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Opaque identity of a pool member
///
/// Identities are stable across polls; attribute values are not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for MemberId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Attribute snapshot of a pool member
///
/// All attributes are optional: a freshly provisioned endpoint typically has
/// none of them until it finishes starting. The reconciliation loop treats
/// missing attributes as a transient condition and retries on the next poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Stable member identity
    pub id: MemberId,

    /// Direct hostname attribute, preferred for address inference
    pub hostname: Option<String>,

    /// Direct IP address attribute
    pub address: Option<IpAddr>,

    /// Root URL of the service the member runs; its host component is the
    /// fallback hostname source
    pub root_url: Option<String>,

    /// Self-declared static coordinates, used to sanity-check geo lookups and
    /// as a substitute when lookups fail and homeless members are included
    pub declared_coordinates: Option<Coordinates>,
}

impl Member {
    /// Create a member with no attributes set
    pub fn new(id: impl Into<MemberId>) -> Self {
        Self {
            id: id.into(),
            hostname: None,
            address: None,
            root_url: None,
            declared_coordinates: None,
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn with_address(mut self, address: IpAddr) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_root_url(mut self, url: impl Into<String>) -> Self {
        self.root_url = Some(url.into());
        self
    }

    pub fn with_declared_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.declared_coordinates = Some(coordinates);
        self
    }
}

/// Trait for membership source implementations
///
/// The source owns the pool; the engine only reads it. Implementations must
/// be thread-safe and usable across async tasks.
///
/// # Ordering
///
/// `members()` should return members in a stable order; the engine preserves
/// first-seen order in its published output.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// Re-evaluate dynamic membership before it is read
    ///
    /// Sources backed by a dynamic group (auto-scaling, service discovery)
    /// refresh their view here; fixed pools use the default no-op.
    async fn rescan(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Get the current pool membership as attribute snapshots
    async fn members(&self) -> Result<Vec<Member>, crate::Error>;
}
