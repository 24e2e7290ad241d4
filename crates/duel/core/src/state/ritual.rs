use core::fmt;

use super::{ActorId, CombatantSlot, SessionId, Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RitualId(pub u32);

impl fmt::Display for RitualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ritual-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RitualStatus {
    Pending,
    Succeeded,
    Failed,
    Cancelled,
}

/// How a pending ritual was answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum RitualVerdict {
    /// The target gave in; the ritual succeeds.
    Submit,
    /// The target resisted; the ritual backfires on the initiator.
    Resist,
    /// Nobody answered before the ritual timeout; counts as success.
    TimedOut,
}

impl RitualVerdict {
    pub const fn succeeds(self) -> bool {
        matches!(self, Self::Submit | Self::TimedOut)
    }
}

/// A side ritual waiting for its third-party response or its timeout.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingRitual {
    pub id: RitualId,
    pub initiator: CombatantSlot,
    pub target: ActorId,
    pub cost: u32,
    pub started_turn: u32,
    pub started_at: Timestamp,
    pub status: RitualStatus,
    /// Balance actually moved from the target to the initiator.
    pub penalty_collected: u64,
}

impl PendingRitual {
    pub fn is_pending(&self) -> bool {
        self.status == RitualStatus::Pending
    }
}

/// Result of resolving a ritual, handed to the runtime for the economic part.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RitualResolution {
    pub session: SessionId,
    pub ritual: RitualId,
    pub initiator: ActorId,
    pub target: ActorId,
    pub verdict: RitualVerdict,
    pub succeeded: bool,
    /// Upper bound of the balance penalty owed by the target. Zero on failure.
    pub penalty: u64,
}
