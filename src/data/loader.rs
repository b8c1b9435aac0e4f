//! Load and resolve dungeons and monster abilities by name/id. Ships a built-in set so the
//! engine runs without any data directory.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::combat::abilities::{AbilityBook, MonsterAbility};
use crate::combat::rng::Rng;
use crate::data::dungeon::{Difficulty, DungeonConfig};
use crate::error::ConfigError;
use crate::loot::rewards::{calculate_drops, RewardItem};

const BUILTIN_DUNGEONS: &str = include_str!("../../data/dungeons.yaml");

/// On-disk shape of a dungeon data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DungeonFile {
    #[serde(default)]
    pub abilities: Vec<MonsterAbility>,
    #[serde(default)]
    pub dungeons: Vec<DungeonConfig>,
}

#[derive(Debug, Clone, Default)]
pub struct DungeonRegistry {
    dungeons: HashMap<String, DungeonConfig>,
    abilities: AbilityBook,
}

/// Normalize a string for lookup: lowercase, collapse spaces/underscores/dashes.
fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn parse_dungeon_file(raw: &str, extension: &str) -> Result<DungeonFile, ConfigError> {
    match extension {
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

impl DungeonRegistry {
    pub fn from_file(file: DungeonFile) -> Self {
        let registry = Self {
            dungeons: file
                .dungeons
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
            abilities: AbilityBook::new(file.abilities),
        };
        registry.warn_unknown_abilities();
        registry
    }

    /// The dungeons bundled with the crate.
    pub fn builtin() -> Result<Self, ConfigError> {
        parse_dungeon_file(BUILTIN_DUNGEONS, "yaml").map(Self::from_file)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        parse_dungeon_file(&raw, &extension).map(Self::from_file)
    }

    fn warn_unknown_abilities(&self) {
        for dungeon in self.dungeons.values() {
            for monster in dungeon.stages.iter().flat_map(|s| s.monsters.iter()) {
                for ability_id in &monster.abilities {
                    if self.abilities.get(ability_id).is_none() {
                        warn!(
                            dungeon = %dungeon.id,
                            monster = %monster.id,
                            ability_id = %ability_id,
                            "monster references unknown ability"
                        );
                    }
                }
            }
        }
    }

    pub fn abilities(&self) -> &AbilityBook {
        &self.abilities
    }

    pub fn get(&self, id: &str) -> Option<&DungeonConfig> {
        self.dungeons.get(id)
    }

    /// Dungeon ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.dungeons.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Resolve by exact id, normalized id, or normalized display name.
    pub fn resolve(&self, name_or_id: &str) -> Option<&DungeonConfig> {
        if let Some(dungeon) = self.dungeons.get(name_or_id) {
            return Some(dungeon);
        }
        let normalized = normalize_lookup(name_or_id);
        self.dungeons.values().find(|d| {
            normalize_lookup(&d.id) == normalized || normalize_lookup(&d.name) == normalized
        })
    }

    /// Item rewards for clearing `dungeon_id`. Unknown ids yield nothing.
    pub fn calculate_dungeon_rewards(
        &self,
        dungeon_id: &str,
        is_first_clear: bool,
        difficulty: Difficulty,
        rng: &mut Rng,
    ) -> Vec<RewardItem> {
        match self.resolve(dungeon_id) {
            Some(dungeon) => calculate_drops(
                &dungeon.drops,
                is_first_clear,
                difficulty.drop_rate_scale(),
                rng,
            ),
            None => {
                warn!(dungeon_id, "unknown dungeon, no rewards");
                Vec::new()
            }
        }
    }
}
