//! Skill combo recognition over a bounded, timestamped cast log.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combat::status::StatusEffectSpec;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCast {
    pub skill_id: String,
    /// Milliseconds on the host clock.
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComboBonus {
    /// Multiplies the damage of the just-cast skill; 1.0 when absent.
    pub damage_multiplier: Option<f64>,
    /// Heals the caster by this percent of max health.
    pub heal_percent: f64,
    pub status: Option<StatusEffectSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCombo {
    pub id: String,
    pub name: String,
    pub sequence: Vec<String>,
    pub time_window_ms: i64,
    #[serde(default)]
    pub bonus_effect: ComboBonus,
    #[serde(default)]
    pub replace_with_skill: Option<String>,
}

impl SkillCombo {
    /// True when the tail of in-window casts equals `sequence` exactly.
    pub fn matches(&self, log: &VecDeque<SkillCast>, now: i64) -> bool {
        let len = self.sequence.len();
        if len == 0 {
            return false;
        }
        let window_start = now.saturating_sub(self.time_window_ms.max(0));
        let recent: Vec<&SkillCast> = log
            .iter()
            .filter(|cast| cast.timestamp >= window_start && cast.timestamp <= now)
            .collect();
        if recent.len() < len {
            return false;
        }
        recent[recent.len() - len..]
            .iter()
            .zip(&self.sequence)
            .all(|(cast, skill_id)| &cast.skill_id == skill_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComboMatch {
    pub combo_id: String,
    pub name: String,
    pub bonus: ComboBonus,
    pub replace_with_skill: Option<String>,
}

/// Watches casts and reports the combo each new cast completes.
///
/// When several combos match the same tail, the longest sequence wins; equal lengths fall
/// back to configuration order. A match leaves the log intact.
#[derive(Debug, Clone)]
pub struct ComboDetector {
    combos: Vec<SkillCombo>,
    log: VecDeque<SkillCast>,
    capacity: usize,
}

impl ComboDetector {
    pub fn new(combos: Vec<SkillCombo>, capacity: usize) -> Self {
        let longest = combos.iter().map(|c| c.sequence.len()).max().unwrap_or(0);
        let capacity = capacity.max(longest).max(1);
        Self {
            combos,
            log: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Restores a cast history persisted from an earlier session.
    pub fn with_history<I>(mut self, history: I) -> Self
    where
        I: IntoIterator<Item = SkillCast>,
    {
        for cast in history {
            self.push(cast);
        }
        self
    }

    pub fn history(&self) -> impl Iterator<Item = &SkillCast> {
        self.log.iter()
    }

    fn push(&mut self, cast: SkillCast) {
        if self.log.len() == self.capacity {
            self.log.pop_front();
        }
        self.log.push_back(cast);
    }

    pub fn record(&mut self, skill_id: &str, timestamp: i64) -> Option<ComboMatch> {
        self.push(SkillCast {
            skill_id: skill_id.to_string(),
            timestamp,
        });

        let best = self
            .combos
            .iter()
            .enumerate()
            .filter(|(_, combo)| combo.matches(&self.log, timestamp))
            .max_by(|(ia, a), (ib, b)| {
                a.sequence
                    .len()
                    .cmp(&b.sequence.len())
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(_, combo)| combo)?;

        debug!(combo_id = %best.id, skill_id, "combo matched");
        Some(ComboMatch {
            combo_id: best.id.clone(),
            name: best.name.clone(),
            bonus: best.bonus_effect.clone(),
            replace_with_skill: best.replace_with_skill.clone(),
        })
    }
}
