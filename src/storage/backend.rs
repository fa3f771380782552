use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

use crate::comm::EventKind;
use crate::Result;

/// One raw change as produced by a backing store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    /// Full backend key, prefix included
    pub key: String,
    /// Raw value; empty for deletes
    pub value: String,
}

impl RawEvent {
    pub fn put(
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind: EventKind::Add,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Delete,
            key: key.into(),
            value: String::new(),
        }
    }
}

/// Raw keyed store with prefix listing and a prefix change feed (etcd-like)
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StoreBackend: Send + Sync + 'static {
    /// All `(full_key, raw_value)` pairs under `prefix`
    async fn list(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, String)>>;

    /// Subscribes to changes under `prefix`; one message per committed batch
    fn watch(
        &self,
        prefix: &str,
        buffer: usize,
    ) -> mpsc::Receiver<Vec<RawEvent>>;

    /// Drops every subscription under `prefix`
    fn unwatch(
        &self,
        prefix: &str,
    );
}
