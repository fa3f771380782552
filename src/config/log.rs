use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogConfig {
    /// Fallback filter directive when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_level() }
    }
}

impl LogConfig {
    pub fn validate(&self) -> Result<()> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| Error::Config(ConfigError::Message(format!("log.level {}: {}", self.level, e))))
    }
}

fn default_level() -> String {
    "info".to_string()
}
