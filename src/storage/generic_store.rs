use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::local_key;
use super::EntityFilter;
use super::Store;
use super::StoreBackend;
use crate::comm::WatchMessage;
use crate::comm::WatchValue;
use crate::Entity;
use crate::EntityKind;
use crate::Error;
use crate::Result;
use crate::StoreError;

/// [`Store`] for one entity kind over a shared [`StoreBackend`].
///
/// Keys live under `<prefix>/<kind>/`; the remainder is the store-local key.
pub struct GenericStore {
    typ: String,
    kind: EntityKind,
    key_prefix: String,
    backend: Arc<dyn StoreBackend>,
    /// Last value observed per store-local key
    cache: DashMap<String, Entity>,
    feed_buffer_size: usize,
}

impl std::fmt::Debug for GenericStore {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("GenericStore")
            .field("typ", &self.typ)
            .field("key_prefix", &self.key_prefix)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl GenericStore {
    pub fn new(
        prefix: &str,
        kind: EntityKind,
        backend: Arc<dyn StoreBackend>,
        feed_buffer_size: usize,
    ) -> Self {
        Self {
            typ: kind.to_string(),
            kind,
            key_prefix: format!("{}/{}/", prefix.trim_end_matches('/'), kind),
            backend,
            cache: DashMap::new(),
            feed_buffer_size,
        }
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Snapshot of the cached value at `key`
    pub fn cached(
        &self,
        key: &str,
    ) -> Option<Entity> {
        self.cache.get(key).map(|e| e.value().clone())
    }
}

#[async_trait]
impl Store for GenericStore {
    fn store_type(&self) -> String {
        self.typ.clone()
    }

    async fn list(
        &self,
        filter: EntityFilter,
    ) -> Result<Vec<Entity>> {
        let pairs = self.backend.list(&self.key_prefix).await.map_err(|e| {
            Error::from(StoreError::List {
                store: self.typ.clone(),
                reason: e.to_string(),
            })
        })?;

        let mut entities = Vec::with_capacity(pairs.len());
        for (full_key, raw) in pairs {
            let Some(key) = local_key(&self.key_prefix, &full_key) else {
                continue;
            };
            match self.decode_value(&raw, key) {
                Ok(entity) if filter(&entity) => entities.push(entity),
                Ok(_) => trace!(store = %self.typ, key, "skip entity without service"),
                Err(e) => warn!(store = %self.typ, key, "skip undecodable entity: {:?}", e),
            }
        }
        debug!(store = %self.typ, count = entities.len(), "listed service entities");
        Ok(entities)
    }

    fn watch(&self) -> mpsc::Receiver<WatchMessage> {
        let mut raw_rx = self.backend.watch(&self.key_prefix, self.feed_buffer_size);
        let (tx, rx) = mpsc::channel(self.feed_buffer_size);
        let prefix = self.key_prefix.clone();
        let typ = self.typ.clone();

        tokio::spawn(async move {
            while let Some(events) = raw_rx.recv().await {
                let values: Vec<WatchValue> = events
                    .into_iter()
                    .filter_map(|e| local_key(&prefix, &e.key).map(|k| WatchValue::new(e.kind, k, e.value)))
                    .collect();
                if values.is_empty() {
                    continue;
                }

                match WatchMessage::new(&values) {
                    Ok(message) => {
                        if tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(store = %typ, "encode watch message failed: {:?}", e),
                }
            }
            debug!(store = %typ, "change feed closed");
        });

        rx
    }

    fn unwatch(&self) {
        self.backend.unwatch(&self.key_prefix);
    }

    fn store(
        &self,
        key: &str,
        entity: Entity,
    ) -> Option<Entity> {
        self.cache.insert(key.to_string(), entity)
    }

    fn delete(
        &self,
        key: &str,
    ) -> Option<Entity> {
        self.cache.remove(key).map(|(_, entity)| entity)
    }

    fn decode_value(
        &self,
        raw: &str,
        key: &str,
    ) -> Result<Entity> {
        Ok(Entity::decode(self.kind, raw, key)?)
    }
}
