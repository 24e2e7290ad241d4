//! Balance config loader.

use std::path::Path;

use duel_core::DuelConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`DuelConfig`] from TOML. Missing keys keep their defaults.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<DuelConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<DuelConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse duel config TOML: {}", e))
    }
}
