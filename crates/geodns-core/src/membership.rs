// # Static Membership Source
//
// Fixed-pool implementation of MembershipSource.
//
// ## Purpose
//
// Serves deployments whose pool is known up front (a handful of regional
// endpoints configured by hand) and doubles as the demo/testing source.
// Dynamic pools (auto-scaling groups, service discovery) implement the
// trait against their own APIs instead.
//
// ## When to Use
//
// - Fixed multi-region endpoint sets
// - Local development and demos
// - Tests that need a pool they can mutate between polls

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::traits::{Member, MembershipSource};

/// Membership source over an in-memory member list
///
/// Clones share the underlying pool, so a handle kept by the embedder can
/// mutate membership while the engine polls.
#[derive(Debug, Clone, Default)]
pub struct StaticMembershipSource {
    pool: Arc<Mutex<Vec<Member>>>,
}

impl StaticMembershipSource {
    /// Create a source with an initial pool
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            pool: Arc::new(Mutex::new(members)),
        }
    }

    /// Add a member to the pool (replaces any member with the same id)
    pub fn upsert(&self, member: Member) {
        let mut pool = self.pool.lock().unwrap();
        match pool.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => *existing = member,
            None => pool.push(member),
        }
    }

    /// Remove a member from the pool; true if it was present
    pub fn remove(&self, id: &crate::traits::MemberId) -> bool {
        let mut pool = self.pool.lock().unwrap();
        let before = pool.len();
        pool.retain(|m| &m.id != id);
        pool.len() != before
    }

    pub fn len(&self) -> usize {
        self.pool.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl MembershipSource for StaticMembershipSource {
    async fn members(&self) -> Result<Vec<Member>, crate::Error> {
        Ok(self.pool.lock().unwrap().clone())
    }
}
