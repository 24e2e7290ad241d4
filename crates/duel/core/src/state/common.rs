use core::fmt;

/// Opaque actor identity supplied by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ActorId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a duel session, also the settlement idempotency key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duel-{:06}", self.0)
    }
}

/// Ledger reservation handle returned by `Hold`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct HoldId(pub u64);

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hold-{}", self.0)
    }
}

/// Milliseconds since the Unix epoch, supplied by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub const fn saturating_add_millis(self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

/// Which side of the duel a combatant occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatantSlot {
    Challenger,
    Target,
}

impl CombatantSlot {
    pub const fn opponent(self) -> Self {
        match self {
            Self::Challenger => Self::Target,
            Self::Target => Self::Challenger,
        }
    }

    /// Stable index mixed into roll seeds.
    pub const fn index(self) -> u32 {
        match self {
            Self::Challenger => 0,
            Self::Target => 1,
        }
    }
}

/// Hit point meter clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitPoints {
    current: u32,
    max: u32,
}

impl HitPoints {
    pub const fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Creates a meter with `current` clamped to `max`.
    pub fn new(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub const fn current(&self) -> u32 {
        self.current
    }

    pub const fn max(&self) -> u32 {
        self.max
    }

    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Remaining HP as a whole percentage of max.
    pub fn percent(&self) -> u32 {
        if self.max == 0 {
            return 0;
        }
        ((self.current as u64 * 100) / self.max as u64) as u32
    }

    /// Removes up to `amount` HP and returns how much was actually lost.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.current);
        self.current -= lost;
        lost
    }

    /// Restores up to `amount` HP and returns how much was actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max - self.current);
        self.current += gained;
        gained
    }
}
