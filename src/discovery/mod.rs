//! Discovery backend abstraction.
//!
//! A discovery backend keeps live service registrations for one discovery
//! type (nacos, zookeeper, ...). The watcher only ever talks to backends
//! through [`Discoverer`], looked up by type in a [`DiscovererRegistry`].
mod memory;
pub use memory::*;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::comm::Query;
use crate::comm::Update;
use crate::constants::ENTITY_ID_SEPARATOR;
use crate::DiscoveryError;
use crate::Result;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Discoverer: Send + Sync + 'static {
    /// Upserts (add) or removes (delete) the registration of one entity.
    ///
    /// Retry and backoff, if any, are the backend's own business; the
    /// watcher logs the error and moves on.
    async fn query(
        &self,
        query: &Query,
    ) -> Result<()>;

    /// Rewrites the arguments of existing registrations of a service
    async fn update(
        &self,
        update: &Update,
    ) -> Result<()>;
}

/// Discovery type -> backend handle
#[derive(Default, Clone)]
pub struct DiscovererRegistry {
    discoverers: HashMap<String, Arc<dyn Discoverer>>,
}

impl std::fmt::Debug for DiscovererRegistry {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("DiscovererRegistry")
            .field("types", &self.discoverers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl DiscovererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `discoverer` for `discovery_type`, replacing any previous one
    pub fn register(
        &mut self,
        discovery_type: impl Into<String>,
        discoverer: Arc<dyn Discoverer>,
    ) -> &mut Self {
        self.discoverers.insert(discovery_type.into(), discoverer);
        self
    }

    /// Looks up the backend for a discovery type.
    ///
    /// An unknown type means the process was wired without a backend that
    /// its stores reference.
    pub fn get(
        &self,
        discovery_type: &str,
    ) -> Result<Arc<dyn Discoverer>> {
        self.discoverers
            .get(discovery_type)
            .cloned()
            .ok_or_else(|| DiscoveryError::UnknownType(discovery_type.to_string()).into())
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.discoverers.keys().map(String::as_str)
    }
}

/// `(store_type, key)` -> `"store_type;key"`
pub fn encode_entity_id(
    store_type: &str,
    key: &str,
) -> String {
    format!("{store_type}{ENTITY_ID_SEPARATOR}{key}")
}

/// Inverse of [`encode_entity_id`]. Keys may themselves contain the separator.
pub fn decode_entity_id(entity_id: &str) -> Result<(&str, &str)> {
    entity_id
        .split_once(ENTITY_ID_SEPARATOR)
        .filter(|(store_type, _)| !store_type.is_empty())
        .ok_or_else(|| DiscoveryError::InvalidEntityId(entity_id.to_string()).into())
}
