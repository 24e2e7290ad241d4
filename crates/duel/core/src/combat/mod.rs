//! Probability and damage rules.
//!
//! Pure functions only: chances are computed from base config, class passives
//! and terrain modifiers; rolls come from an [`RngOracle`](crate::env::RngOracle)
//! seeded per action, so identical inputs always yield identical outcomes.
pub mod damage;
pub mod hit;
pub mod result;

pub use damage::{DamageInput, calculate_damage, counter_damage};
pub use hit::{check_chance, critical_chance, miss_chance};
pub use result::{AttackOutcome, RollSeed, roll_attack, roll_counter};
