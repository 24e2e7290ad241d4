//! Read-only duel content and randomness.
//!
//! Terrains and classes are immutable configuration records looked up through
//! [`ContentOracle`]. [`DuelEnv`] bundles the balance config with the RNG so
//! the resolver can reach both without owning either.
mod catalog;
mod class;
mod rng;
mod terrain;

pub use catalog::Catalog;
pub use class::{
    AbilityId, CharacterClass, ClassId, PassiveModifier, SpecialAbility, SpecialEffect,
    StatusGrant,
};
pub use rng::{
    PcgRng, ROLL_COUNTER, ROLL_CRITICAL, ROLL_MISS, ROLL_TERRAIN_EVENT, RngOracle, compute_seed,
    derive_session_seed,
};
pub use terrain::{EventEffect, EventTrigger, SpecialEvent, Terrain, TerrainId, TerrainModifiers};

use crate::config::DuelConfig;

/// Lookup of terrain and class definitions.
pub trait ContentOracle: Send + Sync {
    fn terrain(&self, id: &TerrainId) -> Option<&Terrain>;

    fn class(&self, id: &ClassId) -> Option<&CharacterClass>;
}

/// Everything the resolver reads but never mutates.
#[derive(Clone, Copy)]
pub struct DuelEnv<'a> {
    config: &'a DuelConfig,
    rng: &'a dyn RngOracle,
}

impl<'a> DuelEnv<'a> {
    pub fn new(config: &'a DuelConfig, rng: &'a dyn RngOracle) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &'a DuelConfig {
        self.config
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }
}

impl core::fmt::Debug for DuelEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DuelEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
