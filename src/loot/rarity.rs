use serde::{Deserialize, Serialize};

use crate::combat::rng::{Rng, Weighted};
use crate::error::ConfigError;

pub const RATE_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Mythic => "Mythic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRarityConfig {
    pub rarity: Rarity,
    pub color: String,
    pub min_bonuses: u32,
    pub max_bonuses: u32,
    pub min_bonus_value: i64,
    pub max_bonus_value: i64,
    /// Percent; the six tiers sum to 100.
    pub drop_rate: f64,
    /// Sale value before bonus scaling.
    pub base_value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RarityTable {
    tiers: Vec<ItemRarityConfig>,
}

fn tier(
    rarity: Rarity,
    color: &str,
    bonuses: (u32, u32),
    values: (i64, i64),
    drop_rate: f64,
    base_value: u64,
) -> ItemRarityConfig {
    ItemRarityConfig {
        rarity,
        color: color.to_string(),
        min_bonuses: bonuses.0,
        max_bonuses: bonuses.1,
        min_bonus_value: values.0,
        max_bonus_value: values.1,
        drop_rate,
        base_value,
    }
}

impl Default for RarityTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                tier(Rarity::Common, "#9e9e9e", (1, 1), (1, 5), 50.0, 10),
                tier(Rarity::Uncommon, "#4caf50", (1, 2), (3, 8), 25.0, 25),
                tier(Rarity::Rare, "#2196f3", (2, 2), (5, 12), 15.0, 60),
                tier(Rarity::Epic, "#9c27b0", (2, 3), (8, 18), 7.0, 150),
                tier(Rarity::Legendary, "#ff9800", (3, 3), (12, 25), 2.5, 400),
                tier(Rarity::Mythic, "#f44336", (3, 3), (20, 35), 0.5, 1_000),
            ],
        }
    }
}

impl RarityTable {
    pub fn new(tiers: Vec<ItemRarityConfig>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[ItemRarityConfig] {
        &self.tiers
    }

    pub fn get(&self, rarity: Rarity) -> Option<&ItemRarityConfig> {
        self.tiers.iter().find(|t| t.rarity == rarity)
    }

    pub fn total_drop_rate(&self) -> f64 {
        self.tiers.iter().map(|t| t.drop_rate).sum()
    }

    /// All six tiers present once, rates summing to 100, ranges ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rarity in Rarity::ALL {
            let count = self.tiers.iter().filter(|t| t.rarity == rarity).count();
            if count != 1 {
                return Err(ConfigError::Invalid(format!(
                    "rarity {} defined {count} times",
                    rarity.label()
                )));
            }
        }
        let total = self.total_drop_rate();
        if (total - 100.0).abs() > RATE_SUM_TOLERANCE {
            return Err(ConfigError::RarityRatesSum { total });
        }
        for t in &self.tiers {
            if t.drop_rate < 0.0
                || t.min_bonuses > t.max_bonuses
                || t.min_bonus_value > t.max_bonus_value
            {
                return Err(ConfigError::Invalid(format!(
                    "rarity {} has an inverted or negative range",
                    t.rarity.label()
                )));
            }
        }
        Ok(())
    }

    /// One roll against the cumulative drop rates.
    pub fn determine_rarity(&self, rng: &mut Rng) -> Rarity {
        let table: Vec<Weighted<Rarity>> = self
            .tiers
            .iter()
            .map(|t| Weighted::new(t.rarity, t.drop_rate))
            .collect();
        rng.weighted_pick(&table).unwrap_or(Rarity::Common)
    }
}
