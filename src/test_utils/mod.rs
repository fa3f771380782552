//! Shared fixtures for unit tests: logger setup, entity builders, polling
//! helpers and an instrumented discovery backend.
mod common;
mod probe;

pub use common::*;
pub use probe::*;
