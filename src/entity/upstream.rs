use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_DISCOVERY_TYPE;

/// Opaque argument bag passed through to the discovery backend
pub type DiscoveryArgs = BTreeMap<String, serde_json::Value>;

/// Discovery-relevant subset of an upstream definition.
///
/// Fields unrelated to discovery (nodes, timeouts, balancer) are ignored on
/// decode; they never influence classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_args: Option<DiscoveryArgs>,
}

impl UpstreamDef {
    pub fn has_service(&self) -> bool {
        !self.service_name().is_empty()
    }

    pub fn service_name(&self) -> &str {
        self.service_name.as_deref().unwrap_or_default()
    }

    pub fn discovery_type(&self) -> &str {
        self.discovery_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_DISCOVERY_TYPE)
    }

    /// Arguments with an absent bag and an empty bag treated alike
    pub fn args(&self) -> Option<&DiscoveryArgs> {
        self.discovery_args.as_ref().filter(|a| !a.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Stamped from the store key on decode; the body's own `id` may be a
    /// string or an integer and is never read
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<UpstreamDef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(flatten)]
    pub upstream: UpstreamDef,
}
