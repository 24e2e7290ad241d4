/// Duel balance constants and tunable parameters.
///
/// Every field has a shipped default, and TOML content may override any
/// subset of them.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DuelConfig {
    /// Smallest wager a proposal may carry.
    pub min_wager: u64,
    /// Hit points every combatant starts with.
    pub max_hp: u32,
    /// In-session resources granted at accept time.
    pub starting_resources: u32,
    /// Resources gained at the end of each of the combatant's own turns.
    pub resources_per_turn: u32,

    pub base_damage: u32,
    /// Base damage of `HighRiskStrike`, dealt to both sides.
    pub high_risk_damage: u32,

    /// Chances are whole percentage points rolled against a d100.
    pub base_crit_chance: u32,
    pub base_miss_chance: u32,
    pub max_crit_chance: u32,
    pub max_miss_chance: u32,
    pub crit_multiplier: u32,
    /// Lowest damage a landed hit can deal after all mitigation.
    pub min_damage_floor: u32,

    /// Upper bound for total defense, in percent mitigation.
    pub defense_cap: u32,
    pub defend_bonus: u32,
    pub defend_duration: u8,

    /// Share of the received damage reflected by a successful counter.
    pub counter_ratio_pct: u32,

    /// Attack multiplier gained per resource spent on `BoostedAttack`.
    pub boost_pct_per_resource: u32,
    pub max_boost_cost: u32,

    pub ritual: RitualConfig,
}

/// Side-ritual economics and buff sizes.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RitualConfig {
    /// Minimum resource cost to start a ritual.
    pub min_cost: u32,
    /// Balance debited from the ritual target when the ritual succeeds.
    pub penalty: u64,
    /// `Divine` magnitude granted to the initiator on success.
    pub buff_pct: u32,
    pub buff_turns: u8,
    /// `Curse` magnitude put on the initiator when the target resists.
    pub backfire_curse_pct: u32,
    pub backfire_turns: u8,
}

impl DuelConfig {
    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MIN_WAGER: u64 = 10;
    pub const DEFAULT_MAX_HP: u32 = 100;

    pub fn new() -> Self {
        Self {
            min_wager: Self::DEFAULT_MIN_WAGER,
            max_hp: Self::DEFAULT_MAX_HP,
            starting_resources: 3,
            resources_per_turn: 1,
            base_damage: 12,
            high_risk_damage: 30,
            base_crit_chance: 10,
            base_miss_chance: 15,
            max_crit_chance: 60,
            max_miss_chance: 75,
            crit_multiplier: 2,
            min_damage_floor: 1,
            defense_cap: 75,
            defend_bonus: 30,
            defend_duration: 2,
            counter_ratio_pct: 50,
            boost_pct_per_resource: 25,
            max_boost_cost: 4,
            ritual: RitualConfig::default(),
        }
    }

    pub fn with_min_wager(mut self, min_wager: u64) -> Self {
        self.min_wager = min_wager;
        self
    }
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for RitualConfig {
    fn default() -> Self {
        Self {
            min_cost: 2,
            penalty: 250,
            buff_pct: 75,
            buff_turns: 3,
            backfire_curse_pct: 30,
            backfire_turns: 2,
        }
    }
}
