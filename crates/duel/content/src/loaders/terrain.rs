//! Terrain catalog loader.

use std::path::Path;

use duel_core::Terrain;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Terrain catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainCatalog {
    pub terrains: Vec<Terrain>,
}

pub struct TerrainLoader;

impl TerrainLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<Terrain>> {
        let content = read_file(path)?;
        let catalog: TerrainCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse terrain catalog RON: {}", e))?;

        let mut seen = std::collections::BTreeSet::new();
        for terrain in &catalog.terrains {
            if !seen.insert(terrain.id.clone()) {
                anyhow::bail!("Duplicate terrain id `{}` in {}", terrain.id, path.display());
            }
        }
        Ok(catalog.terrains)
    }
}
