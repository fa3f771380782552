//! Message codec between stores, the watcher and discovery backends.
//!
//! - [`Query`]: single-entity add/delete against a backend
//! - [`Update`]: in-place argument delta for an existing registration
//! - [`WatchMessage`]: one encoded change-feed batch
mod query;
mod update;
mod watch;
pub use query::*;
pub use update::*;
pub use watch::*;

use std::fmt;
use std::str::FromStr;

use crate::constants::EVENT_ADD;
use crate::constants::EVENT_DELETE;
use crate::constants::EVENT_UPDATE;
use crate::CodecError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Update,
    Delete,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Add => EVENT_ADD,
            EventKind::Update => EVENT_UPDATE,
            EventKind::Delete => EVENT_DELETE,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            EVENT_ADD => Ok(EventKind::Add),
            EVENT_UPDATE => Ok(EventKind::Update),
            EVENT_DELETE => Ok(EventKind::Delete),
            other => Err(CodecError::UnknownEvent(other.to_string())),
        }
    }
}

fn check_header_len(
    header: &[&str],
    expected: usize,
) -> Result<(), CodecError> {
    if header.len() != expected {
        return Err(CodecError::InvalidHeader {
            expected,
            actual: header.len(),
        });
    }
    Ok(())
}
