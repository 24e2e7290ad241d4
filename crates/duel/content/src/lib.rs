//! Data-driven duel content.
//!
//! Loads terrain and class catalogs from RON and balance config from TOML.
//! Content is consumed through [`duel_core::ContentOracle`] and never appears
//! in session state except as the copies a session takes at proposal time.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ClassLoader, ConfigLoader, ContentFactory, LoadResult, TerrainLoader};
