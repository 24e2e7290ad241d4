//! Content factory for building a catalog from data files.

use std::path::{Path, PathBuf};

use duel_core::{Catalog, DuelConfig};

use crate::loaders::{ClassLoader, ConfigLoader, LoadResult, TerrainLoader};

/// Loads all duel content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── duel.toml
/// ├── terrains.ron
/// └── classes.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
    }

    /// Load balance config from `duel.toml`, or defaults if the file is absent.
    pub fn load_config(&self) -> LoadResult<DuelConfig> {
        let path = self.data_dir.join("duel.toml");
        if !path.exists() {
            return Ok(DuelConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load both catalogs into one [`Catalog`].
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        let terrains = TerrainLoader::load(&self.data_dir.join("terrains.ron"))?;
        let classes = ClassLoader::load(&self.data_dir.join("classes.ron"))?;
        Ok(Catalog::new(terrains, classes))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_core::{ClassId, ContentOracle, EventTrigger, TerrainId};

    #[test]
    fn bundled_content_matches_builtin_ids() {
        let factory = ContentFactory::bundled();
        let catalog = factory.load_catalog().expect("bundled content loads");
        let builtin = Catalog::builtin();

        let ids = |c: &Catalog| c.terrains.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&catalog), ids(&builtin));
        assert_eq!(catalog.classes.len(), builtin.classes.len());

        let volcano = catalog
            .terrain(&TerrainId::new("volcano"))
            .expect("volcano ships");
        assert_eq!(volcano.modifiers.fire, 20);
        assert_eq!(
            volcano.special_event.as_ref().map(|e| e.trigger),
            Some(EventTrigger::OnTurn(6))
        );
        assert!(catalog.class(&ClassId::new("rogue")).is_some());

        assert_eq!(factory.load_config().expect("config loads"), DuelConfig::default());
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().expect("defaults"), DuelConfig::default());
        assert!(factory.load_catalog().is_err());
    }

    #[test]
    fn duplicate_terrain_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("terrains.ron"),
            r#"(terrains: [
                (id: "arena", name: "Arena"),
                (id: "arena", name: "Arena Again"),
            ])"#,
        )
        .expect("write");
        let err = TerrainLoader::load(&dir.path().join("terrains.ron")).unwrap_err();
        assert!(err.to_string().contains("Duplicate terrain id"));
    }
}
