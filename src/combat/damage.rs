//! Single-attack damage resolution.
//!
//! Steps run in a fixed order so that a seeded [Rng] always replays the same outcome:
//! evasion, base damage against penetrated defense, additive variance, critical, strong
//! attack, curse, then life steal on the final number.

use serde::{Deserialize, Serialize};

use crate::combat::rng::Rng;
use crate::combat::stats::CombatantStats;
use crate::combat::status::{StatusKind, StatusSet};
use crate::config::BattleConstants;

pub const MIN_DAMAGE: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub final_damage: i64,
    pub is_critical: bool,
    pub is_strong: bool,
    pub is_miss: bool,
    /// Health the attacker regains through life steal (before clamping to its max).
    pub life_steal_heal: i64,
}

impl AttackOutcome {
    pub fn miss() -> Self {
        Self {
            is_miss: true,
            ..Self::default()
        }
    }
}

/// Extra scaling from the action that produced the attack (skills, combos).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackModifiers {
    pub damage_multiplier: f64,
}

impl Default for AttackModifiers {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
        }
    }
}

/// Defense left after penetration: `defense * (1 - penetration / 100)`, penetration clamped to
/// `[0, 100]`.
pub fn effective_defense(defense: f64, penetration: f64) -> f64 {
    defense.max(0.0) * (1.0 - penetration.clamp(0.0, 100.0) / 100.0)
}

/// `attack - effective_defense`, floored at [MIN_DAMAGE].
pub fn base_damage(attacker: &CombatantStats, defender: &CombatantStats) -> f64 {
    let defense = effective_defense(defender.defense, attacker.penetration);
    (attacker.attack - defense).max(MIN_DAMAGE as f64)
}

/// Critical multiplier: the attacker's own crit damage when it carries one, else the baseline.
pub fn critical_multiplier(attacker: &CombatantStats, constants: &BattleConstants) -> f64 {
    if attacker.critical_damage > 1.0 {
        attacker.critical_damage
    } else {
        constants.critical_multiplier
    }
}

/// Resolves one attack. `attacker` and `defender` are effective snapshots (statuses already
/// folded in); `attacker_statuses` is consulted for curse.
pub fn resolve_attack(
    attacker: &CombatantStats,
    attacker_statuses: &StatusSet,
    defender: &CombatantStats,
    constants: &BattleConstants,
    modifiers: AttackModifiers,
    rng: &mut Rng,
) -> AttackOutcome {
    if rng.chance(defender.evasion) {
        return AttackOutcome::miss();
    }

    let mut damage = base_damage(attacker, defender);

    let half_spread = constants.damage_variation.max(0.0) / 2.0;
    if half_spread > 0.0 {
        damage += rng.range_f64(-half_spread, half_spread);
    }
    damage *= modifiers.damage_multiplier.max(0.0);

    let is_critical = rng.chance(constants.critical_chance + attacker.critical_chance);
    if is_critical {
        damage *= critical_multiplier(attacker, constants);
    }

    let is_strong = rng.chance(constants.strong_attack_chance);
    if is_strong {
        damage *= constants.strong_attack_multiplier;
    }

    if attacker_statuses.has(StatusKind::Curse) {
        damage *= constants.curse_damage_reduction;
    }

    let final_damage = (damage.round() as i64).max(MIN_DAMAGE);
    let life_steal_heal = if attacker.life_steal > 0.0 {
        (final_damage as f64 * attacker.life_steal / 100.0).floor() as i64
    } else {
        0
    };

    AttackOutcome {
        final_damage,
        is_critical,
        is_strong,
        is_miss: false,
        life_steal_heal,
    }
}
