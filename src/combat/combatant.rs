use serde::{Deserialize, Serialize};

use crate::combat::abilities::AbilityState;
use crate::combat::stats::CombatantStats;
use crate::combat::status::StatusSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Player,
    Monster,
}

/// One participant of a battle: its stat snapshot plus everything the battle attaches to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub side: Side,
    pub stats: CombatantStats,
    #[serde(default)]
    pub statuses: StatusSet,
    #[serde(default)]
    pub abilities: Vec<AbilityState>,
    #[serde(default)]
    pub experience: u64,
    #[serde(default)]
    pub gold: u64,
}

impl Combatant {
    pub fn player(name: impl Into<String>, stats: CombatantStats) -> Self {
        Self {
            id: "player".to_string(),
            name: name.into(),
            side: Side::Player,
            stats: stats.clamped(),
            statuses: StatusSet::new(),
            abilities: Vec::new(),
            experience: 0,
            gold: 0,
        }
    }

    pub fn monster<I, S>(
        id: impl Into<String>,
        name: impl Into<String>,
        stats: CombatantStats,
        abilities: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            side: Side::Monster,
            stats: stats.clamped(),
            statuses: StatusSet::new(),
            abilities: abilities.into_iter().map(AbilityState::new).collect(),
            experience: 0,
            gold: 0,
        }
    }

    pub fn with_rewards(self, experience: u64, gold: u64) -> Self {
        Self {
            experience,
            gold,
            ..self
        }
    }

    pub fn is_dead(&self) -> bool {
        self.stats.is_dead()
    }

    pub fn health_ratio(&self) -> f64 {
        self.stats.health_ratio()
    }

    /// Base snapshot with active buffs and debuffs folded in.
    pub fn effective_stats(&self) -> CombatantStats {
        self.statuses.effective_stats(&self.stats)
    }

    /// Returns the health actually removed.
    pub fn take_damage(&mut self, amount: i64) -> i64 {
        let before = self.stats.current_health;
        self.stats = self.stats.with_damage(amount);
        before - self.stats.current_health
    }

    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: i64) -> i64 {
        let before = self.stats.current_health;
        self.stats = self.stats.with_heal(amount);
        self.stats.current_health - before
    }
}
