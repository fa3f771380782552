//! Store-resident entities that may reference a discoverable service.
//!
//! Every entity kind carries an optional upstream definition; an entity is
//! *service-bearing* when that definition names a service. The
//! [`Discoverable`] capability is what the watcher diffs against.
mod upstream;
pub use upstream::*;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::constants::DEFAULT_DISCOVERY_TYPE;
use crate::constants::STORE_KIND_ROUTES;
use crate::constants::STORE_KIND_SERVICES;
use crate::constants::STORE_KIND_UPSTREAMS;
use crate::StoreError;

/// Capability shared by every entity kind the watcher can diff
pub trait Discoverable {
    /// Whether this entity references a discovery-relevant service
    fn is_service_bearing(&self) -> bool;

    /// Returns `(id, service_name, discovery_args)`
    fn extract(&self) -> (String, String, DiscoveryArgs);

    /// Backend responsible for this entity's service
    fn discovery_type(&self) -> &str;

    /// Same target, different arguments
    fn service_updated(
        &self,
        newer: &Self,
    ) -> bool;

    /// Target itself (service name or discovery type) changed
    fn service_replaced(
        &self,
        newer: &Self,
    ) -> bool;
}

/// Store kinds, one per store type string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Routes,
    Services,
    Upstreams,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Routes => STORE_KIND_ROUTES,
            EntityKind::Services => STORE_KIND_SERVICES,
            EntityKind::Upstreams => STORE_KIND_UPSTREAMS,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STORE_KIND_ROUTES => Ok(EntityKind::Routes),
            STORE_KIND_SERVICES => Ok(EntityKind::Services),
            STORE_KIND_UPSTREAMS => Ok(EntityKind::Upstreams),
            other => Err(StoreError::UnknownKind(other.to_string())),
        }
    }
}

/// One observed version of a store-resident object. Never mutated after decode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Route(Route),
    Service(Service),
    Upstream(Upstream),
}

impl Entity {
    /// Parses a raw store value as the given kind, stamping `key` as its id
    pub fn decode(
        kind: EntityKind,
        raw: &str,
        key: &str,
    ) -> Result<Self, StoreError> {
        let decode_err = |source| StoreError::Decode {
            key: key.to_string(),
            source,
        };
        let entity = match kind {
            EntityKind::Routes => {
                let mut route: Route = serde_json::from_str(raw).map_err(decode_err)?;
                route.id = key.to_string();
                Entity::Route(route)
            }
            EntityKind::Services => {
                let mut service: Service = serde_json::from_str(raw).map_err(decode_err)?;
                service.id = key.to_string();
                Entity::Service(service)
            }
            EntityKind::Upstreams => {
                let mut upstream: Upstream = serde_json::from_str(raw).map_err(decode_err)?;
                upstream.id = key.to_string();
                Entity::Upstream(upstream)
            }
        };
        Ok(entity)
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Route(_) => EntityKind::Routes,
            Entity::Service(_) => EntityKind::Services,
            Entity::Upstream(_) => EntityKind::Upstreams,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entity::Route(r) => &r.id,
            Entity::Service(s) => &s.id,
            Entity::Upstream(u) => &u.id,
        }
    }

    /// Upstream definition carrying the service reference, if any
    pub fn upstream(&self) -> Option<&UpstreamDef> {
        match self {
            Entity::Route(r) => r.upstream.as_ref(),
            Entity::Service(s) => s.upstream.as_ref(),
            Entity::Upstream(u) => Some(&u.upstream),
        }
    }

    fn target(&self) -> Option<(&str, &str)> {
        self.upstream()
            .filter(|u| u.has_service())
            .map(|u| (u.service_name(), u.discovery_type()))
    }
}

impl Discoverable for Entity {
    fn is_service_bearing(&self) -> bool {
        self.target().is_some()
    }

    fn extract(&self) -> (String, String, DiscoveryArgs) {
        let (service, args) = self
            .upstream()
            .map(|u| (u.service_name().to_string(), u.discovery_args.clone().unwrap_or_default()))
            .unwrap_or_default();
        (self.id().to_string(), service, args)
    }

    fn discovery_type(&self) -> &str {
        self.upstream()
            .map(UpstreamDef::discovery_type)
            .unwrap_or(DEFAULT_DISCOVERY_TYPE)
    }

    fn service_updated(
        &self,
        newer: &Self,
    ) -> bool {
        match (self.target(), newer.target()) {
            (Some(old), Some(new)) if old == new => {
                self.upstream().and_then(UpstreamDef::args) != newer.upstream().and_then(UpstreamDef::args)
            }
            _ => false,
        }
    }

    fn service_replaced(
        &self,
        newer: &Self,
    ) -> bool {
        matches!((self.target(), newer.target()), (Some(old), Some(new)) if old != new)
    }
}

/// Predicate handed to [`crate::Store::list`] during reconciliation
pub fn service_filter(entity: &Entity) -> bool {
    entity.is_service_bearing()
}
