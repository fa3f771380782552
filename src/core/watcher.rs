//! The Watcher keeps discovery backends in step with service-bearing
//! entities in every configured store.
//!
//! # Lifecycle
//!
//! ```text
//! init()   list every store -> add-Query per service entity (blocks until sent)
//! watch()  one loop per store: feed batch -> classify each record -> dispatch
//! close()  cancel loops between batches, unsubscribe every store
//! ```
//!
//! # Concurrency
//!
//! All dispatch tasks, from reconciliation and from every store's loop, share
//! one permit pool. Each loop waits for its whole batch before reading the
//! next one, so diffs against a key's cached value never race.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::classify;
use super::dispatch;
use super::plan;
use super::query_dispatch;
use super::Change;
use crate::comm::EventKind;
use crate::comm::WatchMessage;
use crate::comm::WatchValue;
use crate::discovery::encode_entity_id;
use crate::service_filter;
use crate::utils::spawn_task;
use crate::DiscovererRegistry;
use crate::Entity;
use crate::Result;
use crate::Store;
use crate::WatcherConfig;

pub struct Watcher {
    stores: Vec<Arc<dyn Store>>,
    registry: Arc<DiscovererRegistry>,

    /// Limits the number of simultaneous dispatch tasks across all stores
    permits: Arc<Semaphore>,
    capacity: usize,

    cancel: CancellationToken,
    /// Set by the first [`Watcher::watch`]; one loop per store, ever
    watching: AtomicBool,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for Watcher {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("stores", &self.stores.iter().map(|s| s.store_type()).collect::<Vec<_>>())
            .field("registry", &self.registry)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Watcher {
    pub fn new(
        stores: Vec<Arc<dyn Store>>,
        registry: Arc<DiscovererRegistry>,
        config: &WatcherConfig,
    ) -> Self {
        let capacity = config.capacity();
        Self {
            stores,
            registry,
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            cancel: CancellationToken::new(),
            watching: AtomicBool::new(false),
            loops: Mutex::new(Vec::new()),
        }
    }

    /// Permit pool capacity
    pub fn permits(&self) -> usize {
        self.capacity
    }

    /// Reconciles every store: one add-Query per service-bearing entity.
    ///
    /// Stores are handled one after another; within a store all entities are
    /// dispatched concurrently and the whole batch settles before the next
    /// store is listed. Does not touch the snapshot cache.
    ///
    /// # Errors
    /// A listing failure is returned as-is; the process cannot start from an
    /// unknown initial state. Per-entity failures are only logged.
    pub async fn init(&self) -> Result<()> {
        for store in &self.stores {
            let store_type = store.store_type();
            let entities = store.list(service_filter).await?;
            info!(store = %store_type, count = entities.len(), "Watcher reconciling store");

            let mut batch = Vec::with_capacity(entities.len());
            for entity in entities {
                let permit = self.permits.clone().acquire_owned().await?;
                let registry = self.registry.clone();
                let store_type = store_type.clone();
                batch.push(tokio::spawn(async move {
                    handle_query(&registry, &store_type, &entity).await;
                    drop(permit);
                }));
            }
            join_batch(batch).await;
        }
        Ok(())
    }

    /// Subscribes to every store's change feed and starts one loop per store.
    /// Returns immediately.
    ///
    /// Only the first call after construction does anything; later calls and
    /// calls after [`Watcher::close`] are logged and ignored.
    pub fn watch(&self) {
        if self.cancel.is_cancelled() {
            warn!("Watcher is closed, ignoring watch");
            return;
        }
        if self.watching.swap(true, Ordering::AcqRel) {
            warn!("Watcher is already watching, ignoring watch");
            return;
        }

        let mut loops = self.loops.lock();
        for store in &self.stores {
            let feed = store.watch();
            let store_type = store.store_type();
            let watch_loop = handle_watch(
                store.clone(),
                feed,
                self.registry.clone(),
                self.permits.clone(),
                self.cancel.clone(),
            );
            spawn_task(&format!("watch {store_type}"), watch_loop, Some(&mut *loops));
        }
    }

    /// Stops every loop at its next batch boundary and unsubscribes every
    /// store. Does not wait; see [`Watcher::join`].
    pub fn close(&self) {
        self.cancel.cancel();

        for store in &self.stores {
            store.unwatch();
        }
    }

    /// Waits for every watch loop started by [`Watcher::watch`] to exit
    pub async fn join(&self) {
        let loops = std::mem::take(&mut *self.loops.lock());
        for result in join_all(loops).await {
            if let Err(e) = result {
                error!("watch loop aborted: {:?}", e);
            }
        }
    }
}

async fn join_batch(batch: Vec<JoinHandle<()>>) {
    for result in join_all(batch).await {
        if let Err(e) = result {
            error!("Watcher dispatch task aborted: {:?}", e);
        }
    }
}

async fn handle_query(
    registry: &DiscovererRegistry,
    store_type: &str,
    entity: &Entity,
) {
    match query_dispatch(EventKind::Add, store_type, entity) {
        Ok(outgoing) => {
            info!(store = %store_type, "Watcher query: {}", outgoing);
            dispatch(registry, outgoing).await;
        }
        Err(e) => warn!(
            store = %store_type,
            entity_id = %encode_entity_id(store_type, entity.id()),
            "Watcher encode query message error: {:?}",
            e
        ),
    }
}

async fn handle_watch(
    store: Arc<dyn Store>,
    mut feed: mpsc::Receiver<WatchMessage>,
    registry: Arc<DiscovererRegistry>,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
) -> Result<()> {
    let store_type = store.store_type();

    loop {
        let message = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(store = %store_type, "Watcher loop cancelled");
                return Ok(());
            }
            message = feed.recv() => message,
        };

        let Some(message) = message else {
            info!(store = %store_type, "Watcher loop stopped: change feed ended");
            return Ok(());
        };

        let values = match message.decode() {
            Ok(values) => values,
            Err(e) => {
                warn!(store = %store_type, "Watcher decode watch message error: {:?}", e);
                continue;
            }
        };

        let mut batch = Vec::with_capacity(values.len());
        for value in values {
            let permit = permits.clone().acquire_owned().await?;
            let store = store.clone();
            let registry = registry.clone();
            batch.push(tokio::spawn(async move {
                handle_value(store.as_ref(), &registry, value).await;
                drop(permit);
            }));
        }
        join_batch(batch).await;
    }
}

async fn handle_value(
    store: &dyn Store,
    registry: &DiscovererRegistry,
    value: WatchValue,
) {
    let store_type = store.store_type();
    info!(
        store = %store_type,
        key = %value.key,
        "Watcher handle {} event: value={}",
        value.event,
        value.value
    );

    match value.event {
        EventKind::Add => handle_add(store, registry, &store_type, value).await,
        EventKind::Delete => handle_delete(store, registry, &store_type, &value.key).await,
        EventKind::Update => warn!(
            store = %store_type,
            key = %value.key,
            "Watcher ignores update record from change feed"
        ),
    }
}

async fn handle_add(
    store: &dyn Store,
    registry: &DiscovererRegistry,
    store_type: &str,
    value: WatchValue,
) {
    let entity = match store.decode_value(&value.value, &value.key) {
        Ok(entity) => entity,
        Err(e) => {
            warn!(store = %store_type, key = %value.key, "value string error: {:?}", e);
            return;
        }
    };
    if !service_filter(&entity) {
        trace!(store = %store_type, key = %value.key, "entity carries no service");
        return;
    }

    let entity_id = encode_entity_id(store_type, &value.key);
    let previous = store.store(&value.key, entity.clone());
    let change = classify(previous.as_ref(), &entity);
    match change {
        Change::New => info!(%entity_id, "Watcher obtains a new entity with service information"),
        Change::Update => info!(%entity_id, "Watcher updates the service information of existing entity"),
        Change::Replace => info!(%entity_id, "Watcher replaces the service information of existing entity"),
        Change::Unchanged => {
            debug!(%entity_id, "Watcher sees no service change for entity");
            return;
        }
    }

    let dispatches = match plan(change, store_type, previous.as_ref(), &entity) {
        Ok(dispatches) => dispatches,
        Err(e) => {
            warn!(%entity_id, "Watcher encode {:?} message error: {:?}", change, e);
            return;
        }
    };
    for outgoing in dispatches {
        dispatch(registry, outgoing).await;
    }
}

async fn handle_delete(
    store: &dyn Store,
    registry: &DiscovererRegistry,
    store_type: &str,
    key: &str,
) {
    let Some(entity) = store.delete(key) else {
        trace!(store = %store_type, key, "delete of unknown entity");
        return;
    };

    let entity_id = encode_entity_id(store_type, key);
    info!(%entity_id, "Watcher deletes an existing entity");
    match query_dispatch(EventKind::Delete, store_type, &entity) {
        Ok(outgoing) => dispatch(registry, outgoing).await,
        Err(e) => warn!(%entity_id, "Watcher encode query message error: {:?}", e),
    }
}
