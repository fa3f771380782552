//! Seed Watcher Error Hierarchy
//!
//! Defines the error types shared by the store, codec, discovery and watcher
//! layers. Only [`Error::Fatal`] and listing failures surfaced by
//! [`crate::Watcher::init`] ever reach a caller; every other error is logged and
//! dropped by the task that produced it.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Store listing, decoding and feed failures
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Message encoding/decoding failures
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Discovery backend lookup and call failures
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Bulk listing failed; fatal during reconciliation
    #[error("Listing store {store} failed: {reason}")]
    List { store: String, reason: String },

    /// A raw value could not be turned into a typed entity
    #[error("Decode value at key {key} failed")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Store type does not name a known entity kind
    #[error("Unknown store kind: {0}")]
    UnknownKind(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Seed file exists but is not a JSON object of key -> entity
    #[error("Invalid seed file {path}")]
    SeedFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Header has the wrong number of fields
    #[error("Invalid header: expected {expected} fields, got {actual}")]
    InvalidHeader { expected: usize, actual: usize },

    /// Header carries an event kind the message type does not accept
    #[error("Unexpected event {actual}, expected one of {expected}")]
    UnexpectedEvent { expected: &'static str, actual: String },

    #[error("Unknown event kind: {0}")]
    UnknownEvent(String),

    /// Argument payload could not be serialized or parsed
    #[error("Argument payload error")]
    Args(#[source] serde_json::Error),

    /// A watch batch is not a list of (event, key, value) triples
    #[error("Malformed watch message")]
    Malformed(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// No backend registered for this discovery type
    #[error("No discoverer registered for type {0}")]
    UnknownType(String),

    /// Backend rejected or failed a call
    #[error("Discoverer {discovery_type} failed: {reason}")]
    Backend { discovery_type: String, reason: String },

    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),
}

// ============== Conversion Implementations ============== //
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Store(StoreError::Io(e))
    }
}

impl From<tokio::sync::AcquireError> for Error {
    fn from(e: tokio::sync::AcquireError) -> Self {
        Error::Fatal(format!("permit pool closed: {e}"))
    }
}
