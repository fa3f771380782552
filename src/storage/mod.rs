//! Typed, keyed views over backing stores.
//!
//! A [`Store`] is what the watcher consumes: bulk listing, a change feed of
//! encoded batches, and a snapshot cache of the last value seen per key.
//! [`GenericStore`] implements it for one entity kind on top of any
//! [`StoreBackend`].
mod adaptors;
mod backend;
mod generic_store;
mod store;

pub use adaptors::*;
pub use backend::*;
pub use generic_store::*;
pub use store::*;

#[cfg(test)]
mod generic_store_test;

/// Strips `prefix` from a full backend key, yielding the store-local key
pub(crate) fn local_key<'a>(
    prefix: &str,
    full_key: &'a str,
) -> Option<&'a str> {
    full_key.strip_prefix(prefix).filter(|k| !k.is_empty())
}
