use std::sync::Arc;
use std::time::Duration;

use seed_watcher::comm::EventKind;
use seed_watcher::storage::Op;
use seed_watcher::DiscoveryArgs;
use seed_watcher::DiscoveryCall;
use seed_watcher::EntityKind;
use seed_watcher::MemoryBackend;
use serde_json::json;

use crate::common::enable_logger;
use crate::common::harness;
use crate::common::route_json;
use crate::common::wait_until;

fn group(name: &str) -> DiscoveryArgs {
    DiscoveryArgs::from([("group_name".to_string(), json!(name))])
}

/// A single route key walks through every classification in order:
/// no service, new service, changed args, different service, removal.
#[tokio::test]
async fn route_lifecycle_should_drive_matching_discovery_calls() {
    enable_logger();
    let h = harness(Arc::new(MemoryBackend::new()), &[EntityKind::Routes]);
    h.watcher.init().await.unwrap();
    h.watcher.watch();

    let key = "/apisix/routes/1";

    // No service: nothing dispatched, nothing cached
    h.backend.put(key, json!({"uri": "/orders"}).to_string()).await;

    // New
    h.backend.put(key, route_json("orders", "nacos", json!({"group_name": "a"}))).await;
    wait_until("add of orders", || h.nacos.calls().len() == 1).await;

    // Update
    h.backend.put(key, route_json("orders", "nacos", json!({"group_name": "b"}))).await;
    wait_until("update of orders", || h.nacos.calls().len() == 2).await;

    // Replace
    h.backend.put(key, route_json("billing", "nacos", json!({}))).await;
    wait_until("replace by billing", || h.nacos.calls().len() == 4).await;

    // Delete
    h.backend.remove(key).await;
    wait_until("delete of billing", || h.nacos.calls().len() == 5).await;

    let calls = h.nacos.calls();
    match &calls[0] {
        DiscoveryCall::Query(q) => {
            assert_eq!(q.event(), EventKind::Add);
            assert_eq!(q.entity_id(), "routes;1");
            assert_eq!(q.service(), "orders");
            assert_eq!(q.args().unwrap(), group("a"));
        }
        other => panic!("expected add query, got {other:?}"),
    }
    match &calls[1] {
        DiscoveryCall::Update(u) => {
            assert_eq!(u.service(), "orders");
            assert_eq!(u.old_args().unwrap(), group("a"));
            assert_eq!(u.new_args().unwrap(), group("b"));
        }
        other => panic!("expected update, got {other:?}"),
    }
    match (&calls[2], &calls[3]) {
        (DiscoveryCall::Query(del), DiscoveryCall::Query(add)) => {
            assert_eq!(del.event(), EventKind::Delete);
            assert_eq!(del.service(), "orders");
            assert_eq!(add.event(), EventKind::Add);
            assert_eq!(add.service(), "billing");
            assert_eq!(add.entity_id(), "routes;1");
        }
        other => panic!("expected delete then add, got {other:?}"),
    }
    match &calls[4] {
        DiscoveryCall::Query(q) => {
            assert_eq!(q.event(), EventKind::Delete);
            assert_eq!(q.service(), "billing");
        }
        other => panic!("expected delete query, got {other:?}"),
    }
    assert!(h.nacos.registrations().is_empty());

    h.watcher.close();
    h.watcher.join().await;
}

#[tokio::test]
async fn one_commit_should_settle_as_one_batch() {
    enable_logger();
    let h = harness(Arc::new(MemoryBackend::new()), &[EntityKind::Routes, EntityKind::Upstreams]);
    h.watcher.watch();

    h.backend
        .apply(vec![
            Op::put("/apisix/routes/1", route_json("orders", "nacos", json!({}))),
            Op::put("/apisix/routes/2", route_json("billing", "nacos", json!({}))),
            Op::put(
                "/apisix/upstreams/7",
                json!({"service_name": "stock", "discovery_type": "nacos"}).to_string(),
            ),
        ])
        .await;

    wait_until("three registrations", || h.nacos.registrations().len() == 3).await;
    let registrations = h.nacos.registrations();
    assert_eq!(registrations["routes;1"].service, "orders");
    assert_eq!(registrations["routes;2"].service, "billing");
    assert_eq!(registrations["upstreams;7"].service, "stock");

    h.watcher.close();
    h.watcher.join().await;
}

#[tokio::test]
async fn delete_of_unknown_key_should_not_dispatch() {
    enable_logger();
    let h = harness(Arc::new(MemoryBackend::new()), &[EntityKind::Routes]);
    h.watcher.watch();

    h.backend.remove("/apisix/routes/404").await;
    h.backend.put("/apisix/routes/1", route_json("orders", "nacos", json!({}))).await;
    wait_until("add of orders", || !h.nacos.calls().is_empty()).await;

    let queries = h.nacos.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].event(), EventKind::Add);

    h.watcher.close();
    h.watcher.join().await;
}

#[tokio::test]
async fn close_should_stop_every_loop_and_unsubscribe() {
    enable_logger();
    let h = harness(Arc::new(MemoryBackend::new()), &[EntityKind::Routes, EntityKind::Services]);
    h.watcher.watch();
    wait_until("subscriptions", || h.backend.subscriber_count() == 2).await;

    h.watcher.close();
    tokio::time::timeout(Duration::from_secs(2), h.watcher.join())
        .await
        .expect("watch loops exit after close");
    assert_eq!(h.backend.subscriber_count(), 0);

    h.backend.put("/apisix/routes/1", route_json("orders", "nacos", json!({}))).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.nacos.calls().is_empty());
}
