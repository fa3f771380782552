use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::storage::RawEvent;
use crate::storage::StoreBackend;
use crate::Result;
use crate::StoreError;

/// A single write applied by [`MemoryBackend::apply`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Put { key: String, value: String },
    Remove { key: String },
}

impl Op {
    pub fn put(
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Op::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        Op::Remove { key: key.into() }
    }
}

#[derive(Debug)]
struct Subscriber {
    prefix: String,
    sender: mpsc::Sender<Vec<RawEvent>>,
}

/// In-memory [`StoreBackend`].
///
/// Every [`MemoryBackend::apply`] call commits atomically and becomes exactly
/// one batch on each matching subscription, in commit order.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<BTreeMap<String, String>>,
    subscribers: Mutex<Vec<Subscriber>>,
    /// Serializes writers so feed order matches commit order
    commit: tokio::sync::Mutex<()>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preloads a JSON object of `full key -> entity value` without notifying
    /// subscribers. Meant for startup, before anything watches.
    pub async fn load_seed_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<usize> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(StoreError::Io)?;
        let entries: BTreeMap<String, serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| StoreError::SeedFile {
                path: path.to_path_buf(),
                source,
            })?;

        let count = entries.len();
        let mut data = self.data.write();
        for (key, value) in entries {
            data.insert(key, value.to_string());
        }
        info!(?path, count, "loaded seed entries");
        Ok(count)
    }

    pub async fn put(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.apply(vec![Op::put(key, value)]).await;
    }

    /// Removes `key`. A delete event is emitted even when the key is absent.
    pub async fn remove(
        &self,
        key: impl Into<String>,
    ) {
        self.apply(vec![Op::remove(key)]).await;
    }

    /// Commits `ops` as one batch and delivers it to matching subscribers
    pub async fn apply(
        &self,
        ops: Vec<Op>,
    ) {
        let _commit = self.commit.lock().await;

        let events: Vec<RawEvent> = {
            let mut data = self.data.write();
            ops.into_iter()
                .map(|op| match op {
                    Op::Put { key, value } => {
                        data.insert(key.clone(), value.clone());
                        RawEvent::put(key, value)
                    }
                    Op::Remove { key } => {
                        data.remove(&key);
                        RawEvent::delete(key)
                    }
                })
                .collect()
        };

        let targets: Vec<(mpsc::Sender<Vec<RawEvent>>, Vec<RawEvent>)> = {
            let mut subscribers = self.subscribers.lock();
            subscribers.retain(|s| !s.sender.is_closed());
            subscribers
                .iter()
                .filter_map(|s| {
                    let matching: Vec<RawEvent> =
                        events.iter().filter(|e| e.key.starts_with(&s.prefix)).cloned().collect();
                    (!matching.is_empty()).then(|| (s.sender.clone(), matching))
                })
                .collect()
        };

        for (sender, batch) in targets {
            trace!(events = batch.len(), "deliver batch");
            if sender.send(batch).await.is_err() {
                debug!("subscriber went away during delivery");
            }
        }
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<String> {
        self.data.read().get(key).cloned()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().iter().filter(|s| !s.sender.is_closed()).count()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn list(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, String)>> {
        let data = self.data.read();
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn watch(
        &self,
        prefix: &str,
        buffer: usize,
    ) -> mpsc::Receiver<Vec<RawEvent>> {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        self.subscribers.lock().push(Subscriber {
            prefix: prefix.to_string(),
            sender,
        });
        debug!(prefix, "subscribed");
        receiver
    }

    fn unwatch(
        &self,
        prefix: &str,
    ) {
        self.subscribers.lock().retain(|s| s.prefix != prefix);
        debug!(prefix, "unsubscribed");
    }
}
