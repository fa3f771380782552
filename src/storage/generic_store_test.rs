use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;

use super::*;
use crate::comm::EventKind;
use crate::comm::WatchValue;
use crate::service_filter;
use crate::Discoverable;
use crate::EntityKind;
use crate::Error;
use crate::StoreError;

fn routes_store(backend: Arc<MemoryBackend>) -> GenericStore {
    GenericStore::new("/apisix", EntityKind::Routes, backend, 8)
}

fn route_value(service: &str) -> String {
    json!({"uri": "/a", "upstream": {"service_name": service}}).to_string()
}

#[test]
fn key_prefix_should_join_prefix_and_kind() {
    let store = GenericStore::new("/apisix/", EntityKind::Upstreams, Arc::new(MemoryBackend::new()), 8);

    assert_eq!(store.key_prefix(), "/apisix/upstreams/");
    assert_eq!(store.store_type(), "upstreams");
}

#[tokio::test]
async fn list_should_filter_and_skip_undecodable_values() {
    let backend = Arc::new(MemoryBackend::new());
    backend.put("/apisix/routes/1", route_value("svc")).await;
    backend.put("/apisix/routes/2", json!({"uri": "/plain"}).to_string()).await;
    backend.put("/apisix/routes/3", "{broken").await;
    let store = routes_store(backend);

    let listed = store.list(service_filter).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), "1");
    assert!(listed[0].is_service_bearing());
}

#[tokio::test]
async fn list_should_wrap_backend_failure() {
    let mut backend = MockStoreBackend::new();
    backend
        .expect_list()
        .returning(|_| Err(Error::Fatal("connection refused".to_string())));
    let store = GenericStore::new("/apisix", EntityKind::Routes, Arc::new(backend), 8);

    let result = store.list(service_filter).await;

    assert!(matches!(
        result,
        Err(Error::Store(StoreError::List { ref store, .. })) if store == "routes"
    ));
}

#[test]
fn store_and_delete_should_swap_atomically() {
    let store = routes_store(Arc::new(MemoryBackend::new()));
    let first = store.decode_value(&route_value("a"), "1").unwrap();
    let second = store.decode_value(&route_value("b"), "1").unwrap();

    assert!(store.store("1", first.clone()).is_none());
    assert_eq!(store.store("1", second.clone()), Some(first));
    assert_eq!(store.cached("1"), Some(second.clone()));
    assert_eq!(store.delete("1"), Some(second));
    assert!(store.delete("1").is_none());
}

#[tokio::test]
async fn watch_should_encode_batches_with_local_keys() {
    let backend = Arc::new(MemoryBackend::new());
    let store = routes_store(backend.clone());
    let mut feed = store.watch();

    backend
        .apply(vec![
            Op::put("/apisix/routes/1", route_value("svc")),
            Op::remove("/apisix/routes/2"),
        ])
        .await;

    let message = timeout(Duration::from_secs(1), feed.recv()).await.unwrap().unwrap();
    assert_eq!(
        message.decode().unwrap(),
        vec![
            WatchValue::new(EventKind::Add, "1", route_value("svc")),
            WatchValue::new(EventKind::Delete, "2", ""),
        ]
    );
}

#[tokio::test]
async fn unwatch_should_close_store_feed() {
    let backend = Arc::new(MemoryBackend::new());
    let store = routes_store(backend);
    let mut feed = store.watch();

    store.unwatch();

    assert!(timeout(Duration::from_secs(1), feed.recv()).await.unwrap().is_none());
}
