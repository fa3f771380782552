use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use tracing::info;

use super::Discoverer;
use crate::comm::EventKind;
use crate::comm::Query;
use crate::comm::Update;
use crate::DiscoveryArgs;
use crate::DiscoveryError;
use crate::Result;

/// A call observed by a [`MemoryDiscoverer`], in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryCall {
    Query(Query),
    Update(Update),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub service: String,
    pub args: DiscoveryArgs,
}

/// In-process discovery backend.
///
/// Keeps `entity_id -> registration` in memory and records every call. Used by
/// the binary when no remote backend is wired, and by tests to observe what
/// the watcher dispatched.
#[derive(Debug)]
pub struct MemoryDiscoverer {
    discovery_type: String,
    registrations: Mutex<HashMap<String, Registration>>,
    calls: Mutex<Vec<DiscoveryCall>>,
    latency: Option<Duration>,
    fail: bool,
}

impl MemoryDiscoverer {
    pub fn new(discovery_type: impl Into<String>) -> Self {
        Self {
            discovery_type: discovery_type.into(),
            registrations: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            latency: None,
            fail: false,
        }
    }

    /// Every call sleeps this long before taking effect
    pub fn with_latency(
        mut self,
        latency: Duration,
    ) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every call is recorded but then fails
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn discovery_type(&self) -> &str {
        &self.discovery_type
    }

    pub fn calls(&self) -> Vec<DiscoveryCall> {
        self.calls.lock().clone()
    }

    pub fn queries(&self) -> Vec<Query> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                DiscoveryCall::Query(q) => Some(q.clone()),
                DiscoveryCall::Update(_) => None,
            })
            .collect()
    }

    pub fn registration(
        &self,
        entity_id: &str,
    ) -> Option<Registration> {
        self.registrations.lock().get(entity_id).cloned()
    }

    pub fn registrations(&self) -> HashMap<String, Registration> {
        self.registrations.lock().clone()
    }

    async fn settle(&self) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.fail {
            return Err(DiscoveryError::Backend {
                discovery_type: self.discovery_type.clone(),
                reason: "injected failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl Discoverer for MemoryDiscoverer {
    async fn query(
        &self,
        query: &Query,
    ) -> Result<()> {
        self.calls.lock().push(DiscoveryCall::Query(query.clone()));
        self.settle().await?;

        let args = query.args()?;
        let mut registrations = self.registrations.lock();
        match query.event() {
            EventKind::Delete => {
                if registrations.remove(query.entity_id()).is_none() {
                    debug!(entity_id = query.entity_id(), "delete of unregistered entity");
                }
            }
            EventKind::Add | EventKind::Update => {
                registrations.insert(
                    query.entity_id().to_string(),
                    Registration {
                        service: query.service().to_string(),
                        args,
                    },
                );
            }
        }
        info!(
            discovery_type = %self.discovery_type,
            registrations = registrations.len(),
            "applied query: {}",
            query
        );
        Ok(())
    }

    async fn update(
        &self,
        update: &Update,
    ) -> Result<()> {
        self.calls.lock().push(DiscoveryCall::Update(update.clone()));
        self.settle().await?;

        let old_args = update.old_args()?;
        let new_args = update.new_args()?;
        let mut registrations = self.registrations.lock();
        let mut touched = 0usize;
        for registration in registrations.values_mut() {
            if registration.service == update.service() && registration.args == old_args {
                registration.args = new_args.clone();
                touched += 1;
            }
        }
        info!(
            discovery_type = %self.discovery_type,
            touched,
            "applied update: {}",
            update
        );
        Ok(())
    }
}
