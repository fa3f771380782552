use std::sync::Arc;

use seed_watcher::comm::EventKind;
use seed_watcher::EntityKind;
use seed_watcher::Error;
use seed_watcher::MemoryBackend;
use seed_watcher::StoreError;
use serde_json::json;

use crate::common::enable_logger;
use crate::common::harness;

#[tokio::test]
async fn init_should_register_every_seeded_service_entity() {
    enable_logger();
    let temp_dir = tempfile::tempdir().unwrap();
    let seed_path = temp_dir.path().join("seed.json");
    std::fs::write(
        &seed_path,
        json!({
            "/apisix/routes/1": {
                "uri": "/orders",
                "upstream": {"service_name": "orders", "discovery_args": {"group_name": "a"}}
            },
            "/apisix/routes/2": {"uri": "/static", "upstream": {"nodes": {"127.0.0.1:80": 1}}},
            "/apisix/services/3": {"upstream": {"service_name": "billing"}},
            "/apisix/upstreams/4": {"service_name": "stock", "discovery_type": "nacos"},
        })
        .to_string(),
    )
    .unwrap();

    let backend = Arc::new(MemoryBackend::new());
    assert_eq!(backend.load_seed_file(&seed_path).await.unwrap(), 4);

    let h = harness(
        backend,
        &[EntityKind::Routes, EntityKind::Services, EntityKind::Upstreams],
    );
    h.watcher.init().await.unwrap();

    let queries = h.nacos.queries();
    assert_eq!(queries.len(), 3);
    assert!(queries.iter().all(|q| q.event() == EventKind::Add));

    let registrations = h.nacos.registrations();
    assert_eq!(registrations["routes;1"].service, "orders");
    assert_eq!(registrations["services;3"].service, "billing");
    assert_eq!(registrations["upstreams;4"].service, "stock");
    assert!(!registrations.contains_key("routes;2"));
}

#[tokio::test]
async fn load_seed_file_should_reject_non_object_content() {
    enable_logger();
    let temp_dir = tempfile::tempdir().unwrap();
    let seed_path = temp_dir.path().join("seed.json");
    std::fs::write(&seed_path, "[1, 2, 3]").unwrap();

    let backend = MemoryBackend::new();
    let result = backend.load_seed_file(&seed_path).await;

    assert!(matches!(result, Err(Error::Store(StoreError::SeedFile { .. }))));
}

#[tokio::test]
async fn init_should_ignore_entities_on_unregistered_discovery_types() {
    enable_logger();
    let backend = Arc::new(MemoryBackend::new());
    backend
        .put(
            "/apisix/upstreams/1",
            json!({"service_name": "legacy", "discovery_type": "eureka"}).to_string(),
        )
        .await;
    backend
        .put("/apisix/upstreams/2", json!({"service_name": "orders"}).to_string())
        .await;

    let h = harness(backend, &[EntityKind::Upstreams]);
    h.watcher.init().await.unwrap();

    let queries = h.nacos.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].entity_id(), "upstreams;2");
}
