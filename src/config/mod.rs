//! Configuration management module for the seed watcher.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Environment variable overrides
//! - Configuration file support
//! - Component-wise validation
mod discovery;
mod log;
mod store;
mod watcher;
pub use discovery::*;
pub use log::*;
pub use store::*;
pub use watcher::*;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Main configuration container for the seed watcher process
///
/// Combines all subsystem configurations with hierarchical override support:
/// 1. Default values from code implementation
/// 2. Configuration file specified by `CONFIG_PATH`
/// 3. Environment variables (highest priority)
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct SeedConfig {
    /// Permit pool sizing for dispatch tasks
    #[serde(default)]
    pub watcher: WatcherConfig,
    /// Which entity stores to reconcile and watch
    #[serde(default)]
    pub store: StoreConfig,
    /// Discovery backends known to this process
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Debug for SeedConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("watcher", &self.watcher)
            .field("store", &self.store)
            .field("discovery", &self.discovery)
            .finish()
    }
}

impl SeedConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Configuration sources are merged in the following order (later sources override earlier):
    /// 1. Type defaults (lowest priority)
    /// 2. Configuration file from `CONFIG_PATH` environment variable (if set)
    /// 3. Environment variables with `SEED__` prefix (highest priority)
    ///
    /// # Note
    /// Validation is deferred to allow further overrides via `with_override_config()`.
    /// Callers MUST call `validate()` before using the configuration.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/seed.toml");
    /// std::env::set_var("SEED__WATCHER__PERMIT_HEADROOM", "4");
    /// let cfg = SeedConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    ///
    /// Merging order (later sources override earlier):
    /// 1. Current configuration values
    /// 2. New configuration file
    /// 3. Latest environment variables (highest priority)
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first invalid field.
    pub fn validate(self) -> Result<Self> {
        self.watcher.validate()?;
        self.store.validate()?;
        self.discovery.validate()?;
        self.log.validate()?;
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("SEED")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("store.kinds")
        .with_list_parse_key("discovery.types")
}
