use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

use crate::comm::WatchMessage;
use crate::Entity;
use crate::Result;

/// Predicate applied to every entity during bulk listing
pub type EntityFilter = fn(&Entity) -> bool;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Store type, e.g. `routes`; first half of every entity id from this store
    fn store_type(&self) -> String;

    /// Lists every resident entity passing `filter`.
    ///
    /// # Errors
    /// Returns `StoreError::List` when the backing store cannot be read.
    async fn list(
        &self,
        filter: EntityFilter,
    ) -> Result<Vec<Entity>>;

    /// Subscribes to the change feed. The receiver ends after [`Store::unwatch`].
    fn watch(&self) -> mpsc::Receiver<WatchMessage>;

    /// Releases the change-feed subscription
    fn unwatch(&self);

    /// Atomically caches `entity` at `key`, returning the previous value
    fn store(
        &self,
        key: &str,
        entity: Entity,
    ) -> Option<Entity>;

    /// Atomically removes and returns the cached value at `key`
    fn delete(
        &self,
        key: &str,
    ) -> Option<Entity>;

    /// Deserializes a raw feed value into this store's entity kind
    fn decode_value(
        &self,
        raw: &str,
        key: &str,
    ) -> Result<Entity>;
}
