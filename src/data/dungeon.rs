//! Dungeon, stage and monster definitions plus per-dungeon clear progress.

use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::combat::stats::CombatantStats;
use crate::loot::rewards::DropEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
    Nightmare,
}

impl Difficulty {
    /// Multiplier applied to monster health, attack and defense.
    pub const fn stat_scale(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Hard => 1.5,
            Self::Nightmare => 2.2,
        }
    }

    /// Multiplier applied to experience and gold.
    pub const fn reward_scale(self) -> f64 {
        self.stat_scale()
    }

    pub const fn drop_rate_scale(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Hard => 1.2,
            Self::Nightmare => 1.5,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            "nightmare" => Some(Self::Nightmare),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterDefinition {
    pub id: String,
    pub name: String,
    pub stats: CombatantStats,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub experience: u64,
    #[serde(default)]
    pub gold: u64,
}

impl MonsterDefinition {
    /// Fresh instance at full (difficulty-scaled) health.
    pub fn spawn(&self, instance: usize, difficulty: Difficulty) -> Combatant {
        let scale = difficulty.stat_scale();
        let stats = self.stats.scaled(scale, scale, scale).with_full_health();
        Combatant::monster(
            format!("{}#{instance}", self.id),
            self.name.clone(),
            stats,
            self.abilities.iter().cloned(),
        )
        .with_rewards(self.experience, self.gold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    #[serde(default)]
    pub name: String,
    pub monsters: Vec<MonsterDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub clears: u32,
    pub reward: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub recommended_level: u32,
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub drops: Vec<DropEntry>,
    /// Percent chance to also roll one piece of equipment on victory.
    #[serde(default)]
    pub equipment_drop_chance: f64,
    #[serde(default)]
    pub first_clear_bonus_gold: u64,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl DungeonConfig {
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Persisted clear count for one dungeon.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DungeonProgress {
    pub dungeon_id: String,
    #[serde(default)]
    pub clears: u32,
}

impl DungeonProgress {
    pub fn new(dungeon_id: impl Into<String>) -> Self {
        Self {
            dungeon_id: dungeon_id.into(),
            clears: 0,
        }
    }

    pub fn is_first_clear(&self) -> bool {
        self.clears == 0
    }

    /// Records a clear and returns the milestones it newly unlocked.
    pub fn record_clear<'a>(&mut self, dungeon: &'a DungeonConfig) -> Vec<&'a Milestone> {
        self.clears = self.clears.saturating_add(1);
        dungeon
            .milestones
            .iter()
            .filter(|m| m.clears == self.clears)
            .collect()
    }

    pub fn unlocked_milestones<'a>(&self, dungeon: &'a DungeonConfig) -> Vec<&'a Milestone> {
        dungeon
            .milestones
            .iter()
            .filter(|m| m.clears <= self.clears)
            .collect()
    }
}
