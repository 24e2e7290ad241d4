//! Content loaders for reading duel data from files.

pub mod class;
pub mod config;
pub mod factory;
pub mod terrain;

pub use class::ClassLoader;
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use terrain::TerrainLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
