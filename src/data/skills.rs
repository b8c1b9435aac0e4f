//! Player skill book and the default combo list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::combat::combo::{ComboBonus, SkillCombo};
use crate::combat::stats::StatKey;
use crate::combat::status::{EffectTarget, StatusEffectSpec, StatusKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkillKind {
    /// Attack scaled by `multiplier`.
    Strike { multiplier: f64 },
    /// Heal the caster by a percent of max health.
    Heal { percent: f64 },
    /// Status on the caster.
    Buff { status: StatusEffectSpec },
    /// Attack, then a status on the target if the attack landed.
    Afflict { multiplier: f64, status: StatusEffectSpec },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: SkillKind,
}

#[derive(Debug, Clone, Default)]
pub struct SkillBook {
    skills: HashMap<String, SkillDefinition>,
}

impl SkillBook {
    pub fn new<I>(skills: I) -> Self
    where
        I: IntoIterator<Item = SkillDefinition>,
    {
        Self {
            skills: skills.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&SkillDefinition> {
        self.skills.get(id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn skill(id: &str, name: &str, kind: SkillKind) -> SkillDefinition {
    SkillDefinition {
        id: id.to_string(),
        name: name.to_string(),
        kind,
    }
}

fn stat_buff(stat: StatKey, multiplier: f64, turns: u32) -> StatusEffectSpec {
    StatusEffectSpec {
        kind: StatusKind::Buff,
        target: EffectTarget::Caster,
        value: 0.0,
        duration_turns: turns,
        stat_affected: Some(stat),
        multiplier: Some(multiplier),
    }
}

pub fn default_skills() -> Vec<SkillDefinition> {
    vec![
        skill("slash", "Slash", SkillKind::Strike { multiplier: 1.2 }),
        skill("power_strike", "Power Strike", SkillKind::Strike { multiplier: 1.6 }),
        skill(
            "fireball",
            "Fireball",
            SkillKind::Afflict {
                multiplier: 1.3,
                status: StatusEffectSpec {
                    kind: StatusKind::Burn,
                    target: EffectTarget::Opponent,
                    value: 5.0,
                    duration_turns: 3,
                    stat_affected: None,
                    multiplier: None,
                },
            },
        ),
        skill("heal", "Heal", SkillKind::Heal { percent: 30.0 }),
        skill(
            "focus",
            "Focus",
            SkillKind::Buff {
                status: stat_buff(StatKey::Attack, 1.3, 3),
            },
        ),
        skill(
            "guard",
            "Guard",
            SkillKind::Buff {
                status: stat_buff(StatKey::Defense, 1.5, 2),
            },
        ),
        skill("finisher", "Finisher", SkillKind::Strike { multiplier: 3.0 }),
    ]
}

pub fn default_combos() -> Vec<SkillCombo> {
    vec![
        SkillCombo {
            id: "triple_slash".to_string(),
            name: "Triple Slash".to_string(),
            sequence: vec!["slash".into(), "slash".into(), "slash".into()],
            time_window_ms: 10_000,
            bonus_effect: ComboBonus {
                damage_multiplier: Some(1.5),
                ..ComboBonus::default()
            },
            replace_with_skill: None,
        },
        SkillCombo {
            id: "elemental_burst".to_string(),
            name: "Elemental Burst".to_string(),
            sequence: vec!["slash".into(), "fireball".into(), "power_strike".into()],
            time_window_ms: 8_000,
            bonus_effect: ComboBonus::default(),
            replace_with_skill: Some("finisher".to_string()),
        },
        SkillCombo {
            id: "second_wind".to_string(),
            name: "Second Wind".to_string(),
            sequence: vec!["guard".into(), "heal".into()],
            time_window_ms: 6_000,
            bonus_effect: ComboBonus {
                heal_percent: 10.0,
                ..ComboBonus::default()
            },
            replace_with_skill: None,
        },
    ]
}
