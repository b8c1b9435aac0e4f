//! Battle and progression engine for a habit-tracking RPG: turn-based dungeon battles with
//! status effects, monster abilities and skill combos, weighted loot generation, and the
//! energy/ticket regeneration clocks that gate play.

pub mod cli;
pub mod combat;
pub mod config;
pub mod data;
pub mod error;
pub mod loot;
pub mod parallel;
pub mod regen;
pub mod sim;

pub use combat::{
    Battle, BattleContext, BattleReport, BattleState, Combatant, CombatantStats, PlayerAction, Rng,
};
pub use config::EngineConfig;
pub use error::{BattleError, ConfigError, ResourceError};
