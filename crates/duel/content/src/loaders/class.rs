//! Character class catalog loader.

use std::path::Path;

use duel_core::CharacterClass;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Class catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassCatalog {
    pub classes: Vec<CharacterClass>,
}

pub struct ClassLoader;

impl ClassLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<CharacterClass>> {
        let content = read_file(path)?;
        let catalog: ClassCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse class catalog RON: {}", e))?;

        let mut seen = std::collections::BTreeSet::new();
        for class in &catalog.classes {
            if !seen.insert(class.id.clone()) {
                anyhow::bail!("Duplicate class id `{}` in {}", class.id, path.display());
            }
            if class.special.cooldown == 0 {
                anyhow::bail!("Class `{}` has a special with zero cooldown", class.id);
            }
        }
        Ok(catalog.classes)
    }
}
