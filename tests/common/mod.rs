use std::sync::Arc;
use std::time::Duration;

use seed_watcher::DiscovererRegistry;
use seed_watcher::EntityKind;
use seed_watcher::GenericStore;
use seed_watcher::MemoryBackend;
use seed_watcher::MemoryDiscoverer;
use seed_watcher::Store;
use seed_watcher::Watcher;
use seed_watcher::WatcherConfig;
use serde_json::json;
use tokio::time::sleep;
use tokio::time::Instant;

pub const PREFIX: &str = "/apisix";

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for integration test.");
}

/// Raw route value whose upstream references `service`
pub fn route_json(
    service: &str,
    discovery_type: &str,
    args: serde_json::Value,
) -> String {
    json!({
        "uri": "/orders",
        "upstream": {
            "service_name": service,
            "discovery_type": discovery_type,
            "discovery_args": args,
        }
    })
    .to_string()
}

pub struct Harness {
    pub backend: Arc<MemoryBackend>,
    pub nacos: Arc<MemoryDiscoverer>,
    pub watcher: Watcher,
}

/// One watcher over `kinds`, with a single nacos backend
pub fn harness(
    backend: Arc<MemoryBackend>,
    kinds: &[EntityKind],
) -> Harness {
    let stores: Vec<Arc<dyn Store>> = kinds
        .iter()
        .map(|kind| Arc::new(GenericStore::new(PREFIX, *kind, backend.clone(), 16)) as Arc<dyn Store>)
        .collect();

    let nacos = Arc::new(MemoryDiscoverer::new("nacos"));
    let mut registry = DiscovererRegistry::new();
    registry.register("nacos", nacos.clone());

    let config = WatcherConfig {
        max_concurrency: Some(4),
        ..Default::default()
    };
    let watcher = Watcher::new(stores, Arc::new(registry), &config);

    Harness { backend, nacos, watcher }
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
