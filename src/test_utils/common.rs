use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;
use tokio::time::Instant;

use crate::storage::GenericStore;
use crate::storage::MemoryBackend;
use crate::DiscoveryArgs;
use crate::EntityKind;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}

/// Raw route value referencing `service` on `discovery_type`
pub fn route_json(
    service: &str,
    discovery_type: &str,
    args: serde_json::Value,
) -> String {
    json!({
        "uri": "/demo",
        "upstream": {
            "service_name": service,
            "discovery_type": discovery_type,
            "discovery_args": args,
        }
    })
    .to_string()
}

pub fn group_args(group: &str) -> DiscoveryArgs {
    DiscoveryArgs::from([("group_name".to_string(), json!(group))])
}

pub fn routes_store(backend: &Arc<MemoryBackend>) -> Arc<GenericStore> {
    Arc::new(GenericStore::new("/apisix", EntityKind::Routes, backend.clone(), 16))
}

pub fn upstreams_store(backend: &Arc<MemoryBackend>) -> Arc<GenericStore> {
    Arc::new(GenericStore::new("/apisix", EntityKind::Upstreams, backend.clone(), 16))
}

/// Polls `condition` every few milliseconds; panics after two seconds
pub async fn wait_until<F>(
    what: &str,
    mut condition: F,
) where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    while !condition() {
        if Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        sleep(Duration::from_millis(5)).await;
    }
}
