//! Reconciliation and continuous synchronization between stores and
//! discovery backends.
mod classify;
mod dispatch;
mod watcher;

pub use classify::*;
pub use dispatch::*;
pub use watcher::*;
