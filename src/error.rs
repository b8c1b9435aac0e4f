//! Error types for the engine.
//!
//! Battle resolution itself never fails on bad data (entries are skipped and logged);
//! these cover configuration loading, resource spending and misuse of a battle handle.

use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported config extension: {0}")]
    UnsupportedFormat(String),

    #[error("rarity drop rates sum to {total}, expected 100")]
    RarityRatesSum { total: f64 },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Energy, ticket and daily bonus failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceError {
    #[error("not enough energy: need {needed}, have {have}")]
    InsufficientEnergy { needed: u32, have: u32 },

    #[error("no battle tickets left")]
    NoTickets,

    #[error("daily bonus already claimed, next claim in {seconds_remaining}s")]
    BonusNotReady { seconds_remaining: i64 },

    #[error("stored record '{key}' is corrupt: {reason}")]
    CorruptRecord { key: String, reason: String },
}

/// Misuse of a battle handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("battle has not started")]
    NotStarted,

    #[error("battle already finished")]
    Finished,
}
