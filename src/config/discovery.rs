use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_DISCOVERY_TYPE;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscoveryConfig {
    /// Discovery types served by this process
    #[serde(default = "default_types")]
    pub types: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { types: default_types() }
    }
}

impl DiscoveryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.types.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "discovery.types must name at least one discovery type".into(),
            )));
        }
        if self.types.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::Config(ConfigError::Message(
                "discovery.types cannot contain empty names".into(),
            )));
        }
        Ok(())
    }
}

fn default_types() -> Vec<String> {
    vec![DEFAULT_DISCOVERY_TYPE.to_string()]
}
