//! Keeps service-discovery backends in step with the service-bearing
//! entities (routes, services, upstreams) of a gateway's configuration store.
//!
//! The [`Watcher`] reconciles every store once at startup, then follows each
//! store's change feed, diffing every change against the last value seen at
//! that key and issuing the matching add/update/delete to the backend that
//! owns the entity's discovery type.

pub mod comm;
mod config;
pub mod constants;
mod core;
mod discovery;
mod entity;
mod errors;
pub mod storage;
pub mod utils;

pub use config::*;
pub use core::*;
pub use discovery::*;
pub use entity::*;
pub use errors::*;
pub use storage::EntityFilter;
pub use storage::GenericStore;
pub use storage::MemoryBackend;
pub use storage::Store;
pub use storage::StoreBackend;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
