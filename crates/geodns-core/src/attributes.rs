//! Published service attributes
//!
//! The externally visible face of the service: the identity → address
//! mapping of the last publish, the lifecycle state, the up flag and the
//! service's own DNS name. Readers on other threads get snapshot copies;
//! the engine is the only writer.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::traits::{MemberId, ServiceState};

#[derive(Debug, Clone)]
struct Inner {
    targets: Vec<(MemberId, String)>,
    service_state: ServiceState,
    service_up: bool,
    hostname: Option<String>,
    last_publish: Option<DateTime<Utc>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            service_state: ServiceState::Created,
            service_up: false,
            hostname: None,
            last_publish: None,
        }
    }
}

/// Shared attribute holder; clones are handles to the same attributes
#[derive(Debug, Clone, Default)]
pub struct PublishedAttributes {
    inner: Arc<RwLock<Inner>>,
}

impl PublishedAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity → published address mapping from the last successful publish
    pub fn targets(&self) -> Vec<(MemberId, String)> {
        self.inner.read().unwrap().targets.clone()
    }

    pub fn service_state(&self) -> ServiceState {
        self.inner.read().unwrap().service_state
    }

    pub fn service_up(&self) -> bool {
        self.inner.read().unwrap().service_up
    }

    /// DNS name the service itself is reachable under
    pub fn hostname(&self) -> Option<String> {
        self.inner.read().unwrap().hostname.clone()
    }

    pub fn last_publish(&self) -> Option<DateTime<Utc>> {
        self.inner.read().unwrap().last_publish
    }

    pub(crate) fn set_targets(&self, targets: Vec<(MemberId, String)>, published_at: DateTime<Utc>) {
        let mut inner = self.inner.write().unwrap();
        inner.targets = targets;
        inner.last_publish = Some(published_at);
    }

    pub(crate) fn set_service_state(&self, state: ServiceState, hostname: String) {
        let mut inner = self.inner.write().unwrap();
        inner.service_state = state;
        inner.service_up = state.is_up();
        inner.hostname = Some(hostname);
    }
}
