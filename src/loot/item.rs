use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::combat::rng::Rng;
use crate::combat::stats::{CombatantStats, StatKey};
use crate::config::BattleConstants;
use crate::loot::rarity::{Rarity, RarityTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    Weapon,
    Armor,
    Accessory,
}

const WEAPON_STATS: &[StatKey] = &[
    StatKey::Attack,
    StatKey::CriticalChance,
    StatKey::CriticalDamage,
    StatKey::AttackSpeed,
];
const ARMOR_STATS: &[StatKey] = &[StatKey::Defense, StatKey::MaxHealth, StatKey::Evasion];
const ACCESSORY_STATS: &[StatKey] = &[
    StatKey::AttackSpeed,
    StatKey::CriticalChance,
    StatKey::Evasion,
    StatKey::Penetration,
    StatKey::LifeSteal,
];

const WEAPON_NAMES: &[&str] = &["Sword", "Axe", "Spear", "Dagger", "Staff", "Bow"];
const ARMOR_NAMES: &[&str] = &["Chestplate", "Helm", "Gauntlets", "Greaves", "Robe"];
const ACCESSORY_NAMES: &[&str] = &["Ring", "Amulet", "Charm", "Bracelet", "Earring"];

pub const MYTHIC_EFFECTS: &[&str] = &[
    "Attacks have a chance to strike twice",
    "Heals a little after every victory",
    "Grants a shield at the start of each battle",
    "Burns enemies on critical hits",
    "Greatly increases experience gained",
    "Reflects a portion of damage taken",
];

impl ItemType {
    pub const ALL: [ItemType; 3] = [ItemType::Weapon, ItemType::Armor, ItemType::Accessory];

    /// Stats a bonus on this item type can roll.
    pub const fn stat_pool(self) -> &'static [StatKey] {
        match self {
            Self::Weapon => WEAPON_STATS,
            Self::Armor => ARMOR_STATS,
            Self::Accessory => ACCESSORY_STATS,
        }
    }

    const fn base_names(self) -> &'static [&'static str] {
        match self {
            Self::Weapon => WEAPON_NAMES,
            Self::Armor => ARMOR_NAMES,
            Self::Accessory => ACCESSORY_NAMES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBonus {
    pub stat: StatKey,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub bonuses: Vec<StatBonus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_effect: Option<String>,
}

impl Item {
    pub fn bonus_total(&self) -> i64 {
        self.bonuses.iter().map(|b| b.value).sum()
    }

    /// `base_value[rarity] * (1 + sum_of_bonuses / 100)`, floored.
    pub fn sale_value(&self, table: &RarityTable) -> u64 {
        let base = table.get(self.rarity).map_or(0, |t| t.base_value) as f64;
        (base * (1.0 + self.bonus_total() as f64 / 100.0)).floor().max(0.0) as u64
    }
}

fn item_id(rng: &mut Rng) -> Uuid {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Rolls a concrete item. Bonus stats are drawn without replacement from the type's pool;
/// values scale by `floor(player_level / 10)`.
pub fn generate_item(
    table: &RarityTable,
    item_type: ItemType,
    rarity: Rarity,
    player_level: u32,
    rng: &mut Rng,
) -> Item {
    let id = item_id(rng);
    let names = item_type.base_names();
    let base_name = names[rng.range_inclusive(0, names.len() as i64 - 1) as usize];
    let name = format!("{} {}", rarity.label(), base_name);

    let Some(config) = table.get(rarity) else {
        warn!(rarity = rarity.label(), "rarity missing from table, generating plain item");
        return Item {
            id,
            name,
            item_type,
            rarity,
            bonuses: Vec::new(),
            special_effect: None,
        };
    };

    let mut pool: Vec<StatKey> = item_type.stat_pool().to_vec();
    let count = rng
        .range_inclusive(config.min_bonuses as i64, config.max_bonuses as i64)
        .clamp(0, pool.len() as i64) as usize;
    let level_bonus = (player_level / 10) as i64;

    let mut bonuses = Vec::with_capacity(count);
    for _ in 0..count {
        let index = rng.range_inclusive(0, pool.len() as i64 - 1) as usize;
        let stat = pool.swap_remove(index);
        let value = rng.range_inclusive(
            config.min_bonus_value + level_bonus,
            config.max_bonus_value + level_bonus,
        );
        bonuses.push(StatBonus { stat, value });
    }

    let special_effect = (rarity == Rarity::Mythic).then(|| {
        let index = rng.range_inclusive(0, MYTHIC_EFFECTS.len() as i64 - 1) as usize;
        MYTHIC_EFFECTS[index].to_string()
    });

    Item {
        id,
        name,
        item_type,
        rarity,
        bonuses,
        special_effect,
    }
}

/// Rolls a rarity first, then the item.
pub fn generate_random_item(
    table: &RarityTable,
    item_type: ItemType,
    player_level: u32,
    rng: &mut Rng,
) -> Item {
    let rarity = table.determine_rarity(rng);
    generate_item(table, item_type, rarity, player_level, rng)
}

/// Folds equipped item bonuses into a player snapshot. Health bonuses raise both max and
/// current health; percent stats add directly; crit damage adds `value / 100` on top of the
/// baseline multiplier.
pub fn equip(stats: CombatantStats, items: &[Item], constants: &BattleConstants) -> CombatantStats {
    let mut next = stats;
    for bonus in items.iter().flat_map(|item| item.bonuses.iter()) {
        let value = bonus.value as f64;
        next = match bonus.stat {
            StatKey::MaxHealth => CombatantStats {
                max_health: next.max_health + bonus.value,
                current_health: next.current_health + bonus.value,
                ..next
            },
            StatKey::CriticalDamage => {
                let current = if next.critical_damage > 1.0 {
                    next.critical_damage
                } else {
                    constants.critical_multiplier
                };
                next.with(StatKey::CriticalDamage, current + value / 100.0)
            }
            StatKey::AttackSpeed => {
                next.with(StatKey::AttackSpeed, next.attack_speed + value / 100.0)
            }
            key => next.with(key, next.get(key) + value),
        };
    }
    next.clamped()
}
