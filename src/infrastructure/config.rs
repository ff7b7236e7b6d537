use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::diff_hash::MAX_HASHABLE_BYTES;
use crate::domain::report::ImpactThresholds;
use crate::domain::value_objects::StripRules;

/// Engine configuration. Every field has a working default, so embedders
/// can run with `AppConfig::default()` and only ship a TOML file when the
/// export dialect or the impact policy differs from stock.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub normalizer: StripRules,
    #[serde(default)]
    pub hashing: HashingConfig,
    #[serde(default)]
    pub impact: ImpactThresholds,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct HashingConfig {
    /// Payloads larger than this many bytes are never hashed.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    MAX_HASHABLE_BYTES
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let cfg: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config TOML")?;
        Ok(cfg)
    }
}
