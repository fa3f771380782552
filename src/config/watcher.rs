use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::constants::DEFAULT_PERMIT_HEADROOM;
use crate::utils::permit_capacity;
use crate::Error;
use crate::Result;

/// Sizing of the permit pool shared by reconciliation and every watch loop
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatcherConfig {
    /// Permits added on top of available parallelism
    ///
    /// **Default**: 10
    #[serde(default = "default_permit_headroom")]
    pub permit_headroom: usize,

    /// Overrides the whole pool capacity when set
    ///
    /// Useful to pin concurrency in tests or on hosts where available
    /// parallelism is misreported (cgroup-limited containers).
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            permit_headroom: default_permit_headroom(),
            max_concurrency: None,
        }
    }
}

impl WatcherConfig {
    /// Total number of dispatch tasks allowed in flight at once
    pub fn capacity(&self) -> usize {
        self.max_concurrency
            .unwrap_or_else(|| permit_capacity(self.permit_headroom))
    }

    pub fn validate(&self) -> Result<()> {
        match self.max_concurrency {
            Some(0) => {
                return Err(Error::Config(ConfigError::Message(
                    "watcher.max_concurrency must be greater than 0".into(),
                )));
            }
            Some(_) => {}
            None if self.permit_headroom == 0 => {
                return Err(Error::Config(ConfigError::Message(
                    "watcher.permit_headroom must be greater than 0 when max_concurrency is unset".into(),
                )));
            }
            None => {}
        }

        if self.capacity() > 10_000 {
            warn!(
                "watcher permit pool capacity ({}) is very large; backend fan-out is effectively unbounded",
                self.capacity()
            );
        }

        Ok(())
    }
}

const fn default_permit_headroom() -> usize {
    DEFAULT_PERMIT_HEADROOM
}
