use core::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct TerrainId(String);

impl TerrainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Percentage-point modifiers applied to every roll in the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TerrainModifiers {
    /// Added to the miss chance of every attack.
    pub evasion: i32,
    /// Added to every combatant's defense.
    pub defense: i32,
    /// Percent change to landed damage.
    pub fire: i32,
    pub critical: i32,
    pub miss: i32,
}

/// When a terrain's one-shot event fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventTrigger {
    /// After the action that closes this turn index.
    OnTurn(u32),
    /// As soon as either combatant drops below this share of max HP.
    HpBelowPercent(u32),
    /// Rolled after every action.
    Chance(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventEffect {
    DamageBoth(u32),
    HealBoth(u32),
    /// Curses the combatant whose action triggered the event.
    CurseActor { magnitude: u32, turns: u8 },
    GrantResources(u32),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpecialEvent {
    pub trigger: EventTrigger,
    pub effect: EventEffect,
    pub narrative: String,
}

/// Immutable battlefield definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Terrain {
    pub id: TerrainId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: TerrainModifiers,
    #[cfg_attr(feature = "serde", serde(default))]
    pub special_event: Option<SpecialEvent>,
}

impl Terrain {
    /// A terrain with no modifiers and no special event.
    pub fn neutral(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TerrainId::new(id),
            name: name.into(),
            modifiers: TerrainModifiers::default(),
            special_event: None,
        }
    }
}
