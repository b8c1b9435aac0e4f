//! Engine configuration: battle constants, regeneration clocks, rarity and stacking tables,
//! and the player's skill book. Every section has working defaults, so a config file only
//! needs the values it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::combo::SkillCombo;
use crate::combat::status::StackingRules;
use crate::data::skills::{default_combos, default_skills, SkillDefinition};
use crate::error::ConfigError;
use crate::loot::rarity::RarityTable;

pub const CONFIG_ENV_VAR: &str = "HABITQUEST_CONFIG";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BattleConstants {
    /// Total width of the additive damage jitter; each hit moves by up to half of it.
    pub damage_variation: f64,
    /// Percent.
    pub critical_chance: f64,
    pub critical_multiplier: f64,
    /// Percent.
    pub strong_attack_chance: f64,
    pub strong_attack_multiplier: f64,
    /// Outgoing damage multiplier while cursed.
    pub curse_damage_reduction: f64,
    /// Host-clock pause between a cleared stage and the next spawn.
    pub stage_delay_ms: i64,
    /// Safety cap; a battle still running after this many rounds ends in defeat.
    pub max_rounds: u32,
    pub combo_log_capacity: usize,
}

impl Default for BattleConstants {
    fn default() -> Self {
        Self {
            damage_variation: 10.0,
            critical_chance: 15.0,
            critical_multiplier: 1.5,
            strong_attack_chance: 10.0,
            strong_attack_multiplier: 1.3,
            curse_damage_reduction: 0.7,
            stage_delay_ms: 1_500,
            max_rounds: 200,
            combo_log_capacity: 16,
        }
    }
}

impl BattleConstants {
    /// No variance, crits, or strong attacks: every hit is exactly `attack - defense`.
    pub fn deterministic() -> Self {
        Self {
            damage_variation: 0.0,
            critical_chance: 0.0,
            strong_attack_chance: 0.0,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnergyConfig {
    pub max: u32,
    pub regen_amount: u32,
    pub regen_interval_secs: i64,
    pub max_offline_hours: i64,
    pub daily_bonus_amount: u32,
    /// Energy spent per dungeon run.
    pub battle_cost: u32,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max: 100,
            regen_amount: 10,
            regen_interval_secs: 300,
            max_offline_hours: 24,
            daily_bonus_amount: 50,
            battle_cost: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketConfig {
    pub max: u32,
    /// Local hour of the daily refill.
    pub reset_hour: u32,
    /// Offset of the player's local time from UTC.
    pub utc_offset_minutes: i32,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            max: 5,
            reset_hour: 5,
            utc_offset_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub battle: BattleConstants,
    pub energy: EnergyConfig,
    pub tickets: TicketConfig,
    pub rarities: RarityTable,
    pub stacking: StackingRules,
    pub skills: Vec<SkillDefinition>,
    pub combos: Vec<SkillCombo>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            battle: BattleConstants::default(),
            energy: EnergyConfig::default(),
            tickets: TicketConfig::default(),
            rarities: RarityTable::default(),
            stacking: StackingRules::default(),
            skills: default_skills(),
            combos: default_combos(),
        }
    }
}

impl EngineConfig {
    /// Loads `.yaml`/`.yml` or `.json` and validates the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let config: Self = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&raw)?,
            "json" => serde_json::from_str(&raw)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads from `HABITQUEST_CONFIG` when set, else defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rarities.validate()?;
        if self.energy.regen_interval_secs <= 0 {
            return Err(ConfigError::Invalid(
                "energy.regenIntervalSecs must be positive".to_string(),
            ));
        }
        if self.energy.regen_amount == 0 {
            return Err(ConfigError::Invalid(
                "energy.regenAmount must be positive".to_string(),
            ));
        }
        if self.tickets.reset_hour >= 24 {
            return Err(ConfigError::Invalid(format!(
                "tickets.resetHour must be below 24, got {}",
                self.tickets.reset_hour
            )));
        }
        if self.battle.combo_log_capacity == 0 {
            return Err(ConfigError::Invalid(
                "battle.comboLogCapacity must be positive".to_string(),
            ));
        }
        if let Some(combo) = self.combos.iter().find(|c| c.sequence.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "combo '{}' has an empty sequence",
                combo.id
            )));
        }
        Ok(())
    }
}
