//! Timed status effects attached to a combatant.
//!
//! Damage-over-time (poison, burn) ticks once per round boundary before durations count
//! down. Buffs and debuffs fold into a derived stat snapshot through [StatStacking];
//! the base snapshot is never touched. Stun and freeze count skipped actions instead of
//! rounds: each skipped action consumes one turn of the status.

use serde::{Deserialize, Serialize};

use crate::combat::stacking::{StackContribution, StatStacking};
use crate::combat::stats::{CombatantStats, StatKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusKind {
    Poison,
    Burn,
    Freeze,
    Stun,
    Curse,
    Buff,
    Debuff,
}

impl StatusKind {
    pub const fn is_periodic_damage(self) -> bool {
        matches!(self, Self::Poison | Self::Burn)
    }

    pub const fn is_incapacitating(self) -> bool {
        matches!(self, Self::Stun | Self::Freeze)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Poison => "poison",
            Self::Burn => "burn",
            Self::Freeze => "freeze",
            Self::Stun => "stun",
            Self::Curse => "curse",
            Self::Buff => "buff",
            Self::Debuff => "debuff",
        }
    }
}

/// Who an effect lands on, relative to whoever triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum EffectTarget {
    #[serde(alias = "self")]
    Caster,
    #[default]
    Opponent,
}

/// What happens when a second status of the same kind lands on a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StackingRule {
    /// Keep both instances; periodic damage and stat modifiers add up.
    Stack,
    /// Keep one instance with the longer duration and the stronger value.
    Refresh,
    /// Drop the new instance while one is active.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackingRules {
    pub poison: StackingRule,
    pub burn: StackingRule,
    pub freeze: StackingRule,
    pub stun: StackingRule,
    pub curse: StackingRule,
    pub buff: StackingRule,
    pub debuff: StackingRule,
}

impl Default for StackingRules {
    fn default() -> Self {
        Self {
            poison: StackingRule::Stack,
            burn: StackingRule::Stack,
            freeze: StackingRule::Ignore,
            stun: StackingRule::Ignore,
            curse: StackingRule::Refresh,
            buff: StackingRule::Refresh,
            debuff: StackingRule::Refresh,
        }
    }
}

impl StackingRules {
    pub fn rule_for(&self, kind: StatusKind) -> StackingRule {
        match kind {
            StatusKind::Poison => self.poison,
            StatusKind::Burn => self.burn,
            StatusKind::Freeze => self.freeze,
            StatusKind::Stun => self.stun,
            StatusKind::Curse => self.curse,
            StatusKind::Buff => self.buff,
            StatusKind::Debuff => self.debuff,
        }
    }
}

/// Template for a status, as written in ability and skill tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffectSpec {
    #[serde(rename = "type")]
    pub kind: StatusKind,
    #[serde(default)]
    pub target: EffectTarget,
    #[serde(default)]
    pub value: f64,
    pub duration_turns: u32,
    #[serde(default)]
    pub stat_affected: Option<StatKey>,
    #[serde(default)]
    pub multiplier: Option<f64>,
}

impl StatusEffectSpec {
    pub fn instantiate(&self, source: &str) -> StatusEffect {
        StatusEffect {
            kind: self.kind,
            value: self.value.max(0.0),
            duration_turns: self.duration_turns,
            stat_affected: self.stat_affected,
            multiplier: self.multiplier,
            source: source.to_string(),
        }
    }
}

/// A live status on a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub value: f64,
    pub duration_turns: u32,
    pub stat_affected: Option<StatKey>,
    pub multiplier: Option<f64>,
    pub source: String,
}

impl StatusEffect {
    fn same_slot(&self, other: &StatusEffect) -> bool {
        self.kind == other.kind && self.stat_affected == other.stat_affected
    }

    fn contribution(&self) -> Option<StackContribution> {
        let key = self.stat_affected?;
        let sign = match self.kind {
            StatusKind::Buff => 1.0,
            StatusKind::Debuff => -1.0,
            _ => return None,
        };
        match self.multiplier {
            Some(multiplier) => Some(StackContribution::multiplier(key, multiplier)),
            None => Some(StackContribution::flat(key, sign * self.value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Added,
    Refreshed,
    Ignored,
}

/// Result of one round-boundary tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub damage_sources: Vec<(StatusKind, i64)>,
    pub expired: Vec<StatusKind>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSet {
    effects: Vec<StatusEffect>,
}

impl StatusSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn effects(&self) -> &[StatusEffect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn has(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }

    pub fn count(&self, kind: StatusKind) -> usize {
        self.effects.iter().filter(|e| e.kind == kind).count()
    }

    pub fn apply(&mut self, effect: StatusEffect, rules: &StackingRules) -> ApplyOutcome {
        if effect.duration_turns == 0 {
            return ApplyOutcome::Ignored;
        }
        let existing = self.effects.iter_mut().find(|e| e.same_slot(&effect));
        match (rules.rule_for(effect.kind), existing) {
            (_, None) | (StackingRule::Stack, Some(_)) => {
                self.effects.push(effect);
                ApplyOutcome::Added
            }
            (StackingRule::Refresh, Some(current)) => {
                current.duration_turns = current.duration_turns.max(effect.duration_turns);
                current.value = current.value.max(effect.value);
                if effect.multiplier.is_some() {
                    current.multiplier = effect.multiplier;
                }
                current.source = effect.source;
                ApplyOutcome::Refreshed
            }
            (StackingRule::Ignore, Some(_)) => ApplyOutcome::Ignored,
        }
    }

    /// Spends one turn of the first stun/freeze. Returns the kind that was consumed.
    pub fn consume_incapacitation(&mut self) -> Option<StatusKind> {
        let index = self.effects.iter().position(|e| e.kind.is_incapacitating())?;
        let kind = self.effects[index].kind;
        let remaining = self.effects[index].duration_turns.saturating_sub(1);
        if remaining == 0 {
            self.effects.remove(index);
        } else {
            self.effects[index].duration_turns = remaining;
        }
        Some(kind)
    }

    /// Periodic damage first, then duration countdown and expiry. Stun and freeze are
    /// left alone; they wear off through [StatusSet::consume_incapacitation].
    pub fn end_of_round(&mut self) -> TickReport {
        let mut report = TickReport::default();
        for effect in &self.effects {
            if effect.kind.is_periodic_damage() {
                let amount = effect.value.round().max(0.0) as i64;
                if amount > 0 {
                    report.damage_sources.push((effect.kind, amount));
                }
            }
        }
        for effect in &mut self.effects {
            if !effect.kind.is_incapacitating() {
                effect.duration_turns = effect.duration_turns.saturating_sub(1);
            }
        }
        self.effects.retain(|effect| {
            let keep = effect.duration_turns > 0;
            if !keep {
                report.expired.push(effect.kind);
            }
            keep
        });
        report
    }

    pub fn stacking(&self) -> StatStacking {
        let mut stacking = StatStacking::new();
        stacking.add_many(self.effects.iter().filter_map(StatusEffect::contribution));
        stacking
    }

    /// Base snapshot with every buff/debuff folded in.
    pub fn effective_stats(&self, base: &CombatantStats) -> CombatantStats {
        let stacking = self.stacking();
        if stacking.is_empty() {
            return *base;
        }
        stacking.apply_to(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(kind: StatusKind, value: f64, turns: u32) -> StatusEffect {
        StatusEffect {
            kind,
            value,
            duration_turns: turns,
            stat_affected: None,
            multiplier: None,
            source: "test".to_string(),
        }
    }

    fn stat_mod(kind: StatusKind, key: StatKey, value: f64, turns: u32) -> StatusEffect {
        StatusEffect {
            stat_affected: Some(key),
            ..effect(kind, value, turns)
        }
    }

    #[test]
    fn stacked_poison_ticks_each_instance() {
        let rules = StackingRules::default();
        let mut set = StatusSet::new();
        assert_eq!(set.apply(effect(StatusKind::Poison, 3.0, 2), &rules), ApplyOutcome::Added);
        assert_eq!(set.apply(effect(StatusKind::Poison, 4.0, 1), &rules), ApplyOutcome::Added);
        assert_eq!(set.count(StatusKind::Poison), 2);

        let report = set.end_of_round();
        let total: i64 = report.damage_sources.iter().map(|(_, amount)| amount).sum();
        assert_eq!(total, 7);
        assert_eq!(report.expired, vec![StatusKind::Poison]);
        assert_eq!(set.count(StatusKind::Poison), 1);
    }

    #[test]
    fn refreshed_curse_keeps_longest_duration_and_strongest_value() {
        let rules = StackingRules::default();
        let mut set = StatusSet::new();
        set.apply(effect(StatusKind::Curse, 2.0, 4), &rules);
        assert_eq!(set.apply(effect(StatusKind::Curse, 5.0, 2), &rules), ApplyOutcome::Refreshed);

        assert_eq!(set.len(), 1);
        let curse = &set.effects()[0];
        assert_eq!(curse.duration_turns, 4);
        assert_eq!(curse.value, 5.0);
    }

    #[test]
    fn second_stun_is_ignored_while_one_is_active() {
        let rules = StackingRules::default();
        let mut set = StatusSet::new();
        set.apply(effect(StatusKind::Stun, 0.0, 1), &rules);
        assert_eq!(set.apply(effect(StatusKind::Stun, 0.0, 3), &rules), ApplyOutcome::Ignored);
        assert_eq!(set.effects()[0].duration_turns, 1);
    }

    #[test]
    fn rules_are_configurable_per_kind() {
        let rules = StackingRules {
            poison: StackingRule::Ignore,
            stun: StackingRule::Stack,
            ..StackingRules::default()
        };
        let mut set = StatusSet::new();
        set.apply(effect(StatusKind::Poison, 3.0, 2), &rules);
        assert_eq!(set.apply(effect(StatusKind::Poison, 3.0, 2), &rules), ApplyOutcome::Ignored);
        set.apply(effect(StatusKind::Stun, 0.0, 1), &rules);
        assert_eq!(set.apply(effect(StatusKind::Stun, 0.0, 1), &rules), ApplyOutcome::Added);
        assert_eq!(set.count(StatusKind::Stun), 2);
    }

    #[test]
    fn modifiers_on_different_stats_do_not_collide() {
        let rules = StackingRules::default();
        let mut set = StatusSet::new();
        set.apply(stat_mod(StatusKind::Buff, StatKey::Attack, 5.0, 2), &rules);
        assert_eq!(
            set.apply(stat_mod(StatusKind::Buff, StatKey::Defense, 5.0, 2), &rules),
            ApplyOutcome::Added
        );
        assert_eq!(set.count(StatusKind::Buff), 2);
    }

    #[test]
    fn zero_duration_never_lands() {
        let mut set = StatusSet::new();
        let outcome = set.apply(effect(StatusKind::Burn, 5.0, 0), &StackingRules::default());
        assert_eq!(outcome, ApplyOutcome::Ignored);
        assert!(set.is_empty());
    }

    #[test]
    fn freeze_wears_off_by_skipped_actions_only() {
        let mut set = StatusSet::new();
        set.apply(effect(StatusKind::Freeze, 0.0, 2), &StackingRules::default());

        set.end_of_round();
        assert_eq!(set.effects()[0].duration_turns, 2);

        assert_eq!(set.consume_incapacitation(), Some(StatusKind::Freeze));
        assert_eq!(set.consume_incapacitation(), Some(StatusKind::Freeze));
        assert_eq!(set.consume_incapacitation(), None);
        assert!(set.is_empty());
    }

    #[test]
    fn burn_reports_its_own_source() {
        let mut set = StatusSet::new();
        set.apply(effect(StatusKind::Burn, 4.6, 1), &StackingRules::default());
        let report = set.end_of_round();
        assert_eq!(report.damage_sources, vec![(StatusKind::Burn, 5)]);
        assert_eq!(report.expired, vec![StatusKind::Burn]);
    }

    #[test]
    fn debuffs_fold_into_effective_stats() {
        let rules = StackingRules::default();
        let mut set = StatusSet::new();
        set.apply(stat_mod(StatusKind::Debuff, StatKey::Defense, 4.0, 2), &rules);
        set.apply(
            StatusEffect {
                multiplier: Some(1.5),
                ..stat_mod(StatusKind::Buff, StatKey::Attack, 0.0, 2)
            },
            &rules,
        );
        let base = CombatantStats::new(100, 20.0, 10.0);
        let derived = set.effective_stats(&base);
        assert_eq!(derived.defense, 6.0);
        assert_eq!(derived.attack, 30.0);
        assert_eq!(base.defense, 10.0);
    }
}
