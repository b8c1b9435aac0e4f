use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::combat::combatant::Combatant;
use crate::combat::rng::Rng;
use crate::combat::status::{
    ApplyOutcome, EffectTarget, StackingRules, StatusEffectSpec, StatusKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AbilityTrigger {
    OnAttack,
    OnHit,
    OnTurnStart,
    OnTurnEnd,
    OnBelowHalfHp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AbilityEffect {
    /// Direct damage: `flat + caster.attack * attack_multiplier`, ignoring defense.
    #[serde(rename_all = "camelCase")]
    Damage {
        #[serde(default)]
        target: EffectTarget,
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        attack_multiplier: f64,
    },
    /// Heal by `flat + max_health * percent / 100`.
    #[serde(rename_all = "camelCase")]
    Heal {
        #[serde(default = "caster_target")]
        target: EffectTarget,
        #[serde(default)]
        flat: f64,
        #[serde(default)]
        percent: f64,
    },
    Status(StatusEffectSpec),
}

fn caster_target() -> EffectTarget {
    EffectTarget::Caster
}

impl AbilityEffect {
    pub fn target(&self) -> EffectTarget {
        match self {
            Self::Damage { target, .. } | Self::Heal { target, .. } => *target,
            Self::Status(spec) => spec.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterAbility {
    pub id: String,
    pub name: String,
    pub trigger: AbilityTrigger,
    /// Percent chance per qualifying event.
    pub chance: f64,
    /// Rounds before the ability can fire again; 0 means every qualifying event.
    #[serde(default)]
    pub cooldown_turns: u32,
    pub effects: Vec<AbilityEffect>,
    /// Lets an `onBelowHalfHp` ability fire more than once per battle.
    #[serde(default)]
    pub repeatable: bool,
}

/// Static ability definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct AbilityBook {
    abilities: HashMap<String, MonsterAbility>,
}

impl AbilityBook {
    pub fn new<I>(abilities: I) -> Self
    where
        I: IntoIterator<Item = MonsterAbility>,
    {
        Self {
            abilities: abilities.into_iter().map(|a| (a.id.clone(), a)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MonsterAbility> {
        self.abilities.get(id)
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

/// Runtime state of one ability on one monster instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityState {
    pub ability_id: String,
    pub turns_until_ready: u32,
    /// Set once a non-repeatable below-half-health ability has fired.
    pub spent: bool,
}

impl AbilityState {
    pub fn new(ability_id: impl Into<String>) -> Self {
        Self {
            ability_id: ability_id.into(),
            turns_until_ready: 0,
            spent: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.turns_until_ready == 0 && !self.spent
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggeredAbility {
    pub ability_id: String,
    pub name: String,
    pub effects: Vec<AbilityEffect>,
}

fn qualifies(ability: &MonsterAbility, trigger: AbilityTrigger, health_ratio: f64) -> bool {
    if ability.trigger != trigger {
        return false;
    }
    trigger != AbilityTrigger::OnBelowHalfHp || (health_ratio > 0.0 && health_ratio < 0.5)
}

/// Rolls every ready ability matching `trigger`. Fired abilities go on cooldown. Ids
/// missing from `book` are skipped.
pub fn triggered_abilities(
    states: &mut [AbilityState],
    book: &AbilityBook,
    trigger: AbilityTrigger,
    health_ratio: f64,
    rng: &mut Rng,
) -> Vec<TriggeredAbility> {
    let mut fired = Vec::new();
    for state in states.iter_mut() {
        let Some(ability) = book.get(&state.ability_id) else {
            warn!(ability_id = %state.ability_id, "unknown monster ability, skipping");
            continue;
        };
        if !state.is_ready() || !qualifies(ability, trigger, health_ratio) {
            continue;
        }
        let roll = rng.roll();
        if roll >= ability.chance {
            continue;
        }
        debug!(ability_id = %ability.id, ?trigger, roll, "ability triggered");
        state.turns_until_ready = ability.cooldown_turns;
        if trigger == AbilityTrigger::OnBelowHalfHp && !ability.repeatable {
            state.spent = true;
        }
        fired.push(TriggeredAbility {
            ability_id: ability.id.clone(),
            name: ability.name.clone(),
            effects: ability.effects.clone(),
        });
    }
    fired
}

/// Round-boundary countdown, floored at zero.
pub fn tick_cooldowns(states: &mut [AbilityState]) {
    for state in states {
        state.turns_until_ready = state.turns_until_ready.saturating_sub(1);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EffectOutcome {
    Damaged { target: EffectTarget, amount: i64 },
    Healed { target: EffectTarget, amount: i64 },
    StatusApplied { target: EffectTarget, kind: StatusKind, outcome: ApplyOutcome },
}

/// Resolves one ability effect between `caster` and `opponent`.
pub fn apply_effect(
    effect: &AbilityEffect,
    source: &str,
    caster: &mut Combatant,
    opponent: &mut Combatant,
    rules: &StackingRules,
) -> EffectOutcome {
    let caster_attack = caster.effective_stats().attack;
    let target = effect.target();
    let recipient = match target {
        EffectTarget::Caster => caster,
        EffectTarget::Opponent => opponent,
    };
    match effect {
        AbilityEffect::Damage {
            flat,
            attack_multiplier,
            ..
        } => {
            let amount = (flat + caster_attack * attack_multiplier).round().max(0.0) as i64;
            let dealt = recipient.take_damage(amount);
            EffectOutcome::Damaged { target, amount: dealt }
        }
        AbilityEffect::Heal { flat, percent, .. } => {
            let max = recipient.stats.max_health as f64;
            let amount = (flat + max * percent / 100.0).round().max(0.0) as i64;
            let healed = recipient.heal(amount);
            EffectOutcome::Healed { target, amount: healed }
        }
        AbilityEffect::Status(spec) => {
            let outcome = recipient.statuses.apply(spec.instantiate(source), rules);
            EffectOutcome::StatusApplied {
                target,
                kind: spec.kind,
                outcome,
            }
        }
    }
}
