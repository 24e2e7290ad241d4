//! Client configuration structures and loaders.
use std::env;
use std::path::PathBuf;

use duel_core::{ActorId, ClassId, TerrainId};
use duel_runtime::RuntimeConfig;

/// How the third-party actor answers a ritual aimed at it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RitualPolicy {
    Submit,
    Resist,
    /// Never answer; the ritual resolves on timeout.
    #[default]
    Ignore,
}

impl std::str::FromStr for RitualPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "submit" => Ok(Self::Submit),
            "resist" => Ok(Self::Resist),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("unknown ritual policy `{other}`")),
        }
    }
}

/// Event rendering on stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format `{other}`")),
        }
    }
}

/// Configuration for one bot-vs-bot duel run.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub runtime: RuntimeConfig,
    /// Content directory; the bundled data is used when unset.
    pub content_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub terrain: TerrainId,
    pub challenger: ActorId,
    pub target: ActorId,
    pub challenger_class: ClassId,
    pub target_class: ClassId,
    pub wager: u64,
    pub starting_balance: u64,
    /// Third party the challenger may start a ritual against.
    pub spectator: Option<ActorId>,
    pub ritual_policy: RitualPolicy,
    pub output: OutputFormat,
    /// Names the log and settlement directories of this run.
    pub run_id: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            content_dir: None,
            seed: None,
            terrain: TerrainId::new("arena"),
            challenger: ActorId::new("challenger"),
            target: ActorId::new("target"),
            challenger_class: ClassId::new("warrior"),
            target_class: ClassId::new("guardian"),
            wager: 100,
            starting_balance: 1_000,
            spectator: None,
            ritual_policy: RitualPolicy::default(),
            output: OutputFormat::default(),
            run_id: format!("run_{}", chrono::Utc::now().timestamp()),
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DUEL_CONTENT_DIR` - Directory with `duel.toml`, `terrains.ron`, `classes.ron`
    /// - `DUEL_SEED` - Fixed entropy for reproducible duels
    /// - `DUEL_TERRAIN` - Terrain id (default: arena)
    /// - `DUEL_CHALLENGER` / `DUEL_TARGET` - Actor names
    /// - `DUEL_CHALLENGER_CLASS` / `DUEL_TARGET_CLASS` - Class ids
    /// - `DUEL_WAGER` - Wager per side (default: 100)
    /// - `DUEL_STARTING_BALANCE` - Balance seeded for every actor (default: 1000)
    /// - `DUEL_SPECTATOR` - Ritual target; enables rituals when set
    /// - `DUEL_RITUAL_POLICY` - submit, resist or ignore (default: ignore)
    /// - `DUEL_OUTPUT` - text or json (default: text)
    /// - `DUEL_RUN_ID` - Log directory name (default: timestamp)
    ///
    /// Runtime timeouts and buffers are applied later by
    /// [`RuntimeConfig::with_env_overrides`], after the content's balance file.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.content_dir = env::var("DUEL_CONTENT_DIR").ok().map(PathBuf::from);
        config.seed = read_env("DUEL_SEED");

        if let Ok(terrain) = env::var("DUEL_TERRAIN") {
            config.terrain = TerrainId::new(terrain);
        }
        if let Ok(name) = env::var("DUEL_CHALLENGER") {
            config.challenger = ActorId::new(name);
        }
        if let Ok(name) = env::var("DUEL_TARGET") {
            config.target = ActorId::new(name);
        }
        if let Ok(class) = env::var("DUEL_CHALLENGER_CLASS") {
            config.challenger_class = ClassId::new(class);
        }
        if let Ok(class) = env::var("DUEL_TARGET_CLASS") {
            config.target_class = ClassId::new(class);
        }
        if let Some(wager) = read_env("DUEL_WAGER") {
            config.wager = wager;
        }
        if let Some(balance) = read_env("DUEL_STARTING_BALANCE") {
            config.starting_balance = balance;
        }
        config.spectator = env::var("DUEL_SPECTATOR").ok().map(ActorId::new);
        if let Some(policy) = read_env("DUEL_RITUAL_POLICY") {
            config.ritual_policy = policy;
        }
        if let Some(output) = read_env("DUEL_OUTPUT") {
            config.output = output;
        }
        if let Ok(run_id) = env::var("DUEL_RUN_ID") {
            config.run_id = run_id;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!("Resist".parse::<RitualPolicy>(), Ok(RitualPolicy::Resist));
        assert_eq!("submit".parse::<RitualPolicy>(), Ok(RitualPolicy::Submit));
        assert!("shrug".parse::<RitualPolicy>().is_err());
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
    }

    #[test]
    fn defaults_pit_a_warrior_against_a_guardian() {
        let config = ClientConfig::default();
        assert_eq!(config.challenger_class, ClassId::new("warrior"));
        assert_eq!(config.target_class, ClassId::new("guardian"));
        assert!(config.spectator.is_none());
        assert!(config.wager >= config.runtime.duel.min_wager);
    }
}
