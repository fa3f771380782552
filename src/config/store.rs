use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::STORE_KIND_ROUTES;
use crate::constants::STORE_KIND_SERVICES;
use crate::constants::STORE_KIND_UPSTREAMS;
use crate::EntityKind;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Key prefix shared by every store, e.g. `/apisix`
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Store types to reconcile and watch
    #[serde(default = "default_kinds")]
    pub kinds: Vec<String>,

    /// Buffered change batches per store before the feed applies backpressure
    #[serde(default = "default_feed_buffer_size")]
    pub feed_buffer_size: usize,

    /// JSON object of `full key -> entity value` preloaded at startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            kinds: default_kinds(),
            feed_buffer_size: default_feed_buffer_size(),
            seed_file: None,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(Error::Config(ConfigError::Message("store.prefix cannot be empty".into())));
        }

        if self.kinds.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "store.kinds must name at least one store".into(),
            )));
        }

        for kind in &self.kinds {
            kind.parse::<EntityKind>()
                .map_err(|_| Error::Config(ConfigError::Message(format!("store.kinds: unknown kind {kind}"))))?;
        }

        if self.feed_buffer_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "store.feed_buffer_size must be greater than 0".into(),
            )));
        }

        Ok(())
    }
}

fn default_prefix() -> String {
    "/apisix".to_string()
}

fn default_kinds() -> Vec<String> {
    vec![
        STORE_KIND_ROUTES.to_string(),
        STORE_KIND_SERVICES.to_string(),
        STORE_KIND_UPSTREAMS.to_string(),
    ]
}

const fn default_feed_buffer_size() -> usize {
    64
}
