use super::{
    AbilityId, CharacterClass, ClassId, ContentOracle, EventEffect, EventTrigger,
    PassiveModifier, SpecialAbility, SpecialEffect, SpecialEvent, StatusGrant, Terrain, TerrainId,
    TerrainModifiers,
};
use crate::state::StatusEffectKind;

/// In-memory terrain and class tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    pub terrains: Vec<Terrain>,
    pub classes: Vec<CharacterClass>,
}

impl Catalog {
    pub fn new(terrains: Vec<Terrain>, classes: Vec<CharacterClass>) -> Self {
        Self { terrains, classes }
    }

    /// The shipped content set.
    pub fn builtin() -> Self {
        Self::new(builtin_terrains(), builtin_classes())
    }
}

impl ContentOracle for Catalog {
    fn terrain(&self, id: &TerrainId) -> Option<&Terrain> {
        self.terrains.iter().find(|t| &t.id == id)
    }

    fn class(&self, id: &ClassId) -> Option<&CharacterClass> {
        self.classes.iter().find(|c| &c.id == id)
    }
}

fn terrain(
    id: &str,
    name: &str,
    modifiers: TerrainModifiers,
    special_event: Option<SpecialEvent>,
) -> Terrain {
    Terrain {
        id: TerrainId::new(id),
        name: name.to_owned(),
        modifiers,
        special_event,
    }
}

fn event(trigger: EventTrigger, effect: EventEffect, narrative: &str) -> Option<SpecialEvent> {
    Some(SpecialEvent {
        trigger,
        effect,
        narrative: narrative.to_owned(),
    })
}

fn builtin_terrains() -> Vec<Terrain> {
    vec![
        terrain("arena", "Arena", TerrainModifiers::default(), None),
        terrain(
            "volcano",
            "Volcano",
            TerrainModifiers {
                fire: 20,
                ..TerrainModifiers::default()
            },
            event(
                EventTrigger::OnTurn(6),
                EventEffect::DamageBoth(10),
                "The volcano erupts and ash burns both fighters.",
            ),
        ),
        terrain(
            "swamp",
            "Swamp",
            TerrainModifiers {
                evasion: 5,
                miss: 5,
                ..TerrainModifiers::default()
            },
            event(
                EventTrigger::Chance(10),
                EventEffect::CurseActor {
                    magnitude: 20,
                    turns: 2,
                },
                "Bog spirits cling to the attacker.",
            ),
        ),
        terrain(
            "tundra",
            "Tundra",
            TerrainModifiers {
                defense: 10,
                fire: -10,
                ..TerrainModifiers::default()
            },
            event(
                EventTrigger::HpBelowPercent(30),
                EventEffect::HealBoth(8),
                "A warm aurora mends the wounded.",
            ),
        ),
        terrain(
            "crypt",
            "Crypt",
            TerrainModifiers {
                critical: 10,
                defense: -5,
                ..TerrainModifiers::default()
            },
            event(
                EventTrigger::OnTurn(4),
                EventEffect::GrantResources(2),
                "Grave offerings scatter across the floor.",
            ),
        ),
        terrain(
            "skyreach",
            "Skyreach",
            TerrainModifiers {
                evasion: 10,
                critical: 5,
                ..TerrainModifiers::default()
            },
            None,
        ),
    ]
}

fn class(
    id: &str,
    name: &str,
    passive: PassiveModifier,
    ability: &str,
    ability_name: &str,
    cooldown: u8,
    effect: SpecialEffect,
) -> CharacterClass {
    CharacterClass {
        id: ClassId::new(id),
        name: name.to_owned(),
        passive,
        special: SpecialAbility {
            id: AbilityId::new(ability),
            name: ability_name.to_owned(),
            cooldown,
            effect,
        },
    }
}

fn grant(kind: StatusEffectKind, magnitude: u32, turns: u8) -> StatusGrant {
    StatusGrant {
        kind,
        magnitude,
        turns,
    }
}

fn builtin_classes() -> Vec<CharacterClass> {
    vec![
        class(
            "warrior",
            "Warrior",
            PassiveModifier {
                damage_pct: 10,
                ..PassiveModifier::default()
            },
            "battle_cry",
            "Battle Cry",
            3,
            SpecialEffect {
                grants: vec![grant(StatusEffectKind::SpecialActive, 50, 2)],
                heal: 0,
            },
        ),
        class(
            "guardian",
            "Guardian",
            PassiveModifier {
                defense: 10,
                ..PassiveModifier::default()
            },
            "bulwark",
            "Bulwark",
            3,
            SpecialEffect {
                grants: vec![
                    grant(StatusEffectKind::Defense, 40, 2),
                    grant(StatusEffectKind::CounterChance, 50, 2),
                ],
                heal: 0,
            },
        ),
        class(
            "mage",
            "Mage",
            PassiveModifier {
                crit_chance: 10,
                miss_chance: 5,
                ..PassiveModifier::default()
            },
            "arcane_surge",
            "Arcane Surge",
            4,
            SpecialEffect {
                grants: vec![
                    grant(StatusEffectKind::SpecialActive, 40, 1),
                    grant(StatusEffectKind::ExtraTurn, 1, 1),
                ],
                heal: 0,
            },
        ),
        class(
            "rogue",
            "Rogue",
            PassiveModifier {
                crit_chance: 15,
                evasion: 10,
                ..PassiveModifier::default()
            },
            "shadow_step",
            "Shadow Step",
            3,
            SpecialEffect {
                grants: vec![grant(StatusEffectKind::ExtraTurn, 1, 1)],
                heal: 0,
            },
        ),
        class(
            "cleric",
            "Cleric",
            PassiveModifier {
                regeneration: 3,
                ..PassiveModifier::default()
            },
            "sanctuary",
            "Sanctuary",
            4,
            SpecialEffect {
                grants: vec![grant(StatusEffectKind::Regeneration, 6, 3)],
                heal: 15,
            },
        ),
        class(
            "warlock",
            "Warlock",
            PassiveModifier {
                damage_pct: 5,
                crit_chance: 5,
                ..PassiveModifier::default()
            },
            "pact",
            "Dark Pact",
            3,
            SpecialEffect {
                grants: vec![
                    grant(StatusEffectKind::Divine, 30, 2),
                    grant(StatusEffectKind::CounterChance, 25, 2),
                ],
                heal: 0,
            },
        ),
    ]
}
