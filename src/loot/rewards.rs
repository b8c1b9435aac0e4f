use serde::{Deserialize, Serialize};

use crate::combat::rng::Rng;

/// Quantity kept on repeat clears: a 90% reduction, rounded up, never below one.
pub const REPEAT_CLEAR_QUANTITY_FACTOR: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEntry {
    pub item_id: String,
    /// Percent chance, rolled independently per entry.
    pub drop_rate: f64,
    #[serde(default = "one")]
    pub min_quantity: u32,
    #[serde(default = "one")]
    pub max_quantity: u32,
    #[serde(default)]
    pub first_clear_only: bool,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardItem {
    pub item_id: String,
    pub quantity: u32,
}

pub fn repeat_clear_quantity(quantity: u32) -> u32 {
    ((quantity as f64 * REPEAT_CLEAR_QUANTITY_FACTOR).ceil() as u32).max(1)
}

/// Independent Bernoulli trial per entry. `rate_scale` multiplies every drop rate (capped at
/// 100) for harder difficulties.
pub fn calculate_drops(
    entries: &[DropEntry],
    is_first_clear: bool,
    rate_scale: f64,
    rng: &mut Rng,
) -> Vec<RewardItem> {
    let mut rewards = Vec::new();
    for entry in entries {
        if entry.first_clear_only && !is_first_clear {
            continue;
        }
        let rate = (entry.drop_rate * rate_scale).min(100.0);
        if !rng.chance(rate) {
            continue;
        }
        let mut quantity =
            rng.range_inclusive(entry.min_quantity as i64, entry.max_quantity as i64).max(1) as u32;
        if !is_first_clear {
            quantity = repeat_clear_quantity(quantity);
        }
        rewards.push(RewardItem {
            item_id: entry.item_id.clone(),
            quantity,
        });
    }
    rewards
}
