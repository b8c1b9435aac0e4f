pub mod item;
pub mod rarity;
pub mod rewards;

pub use item::{
    equip, generate_item, generate_random_item, Item, ItemType, StatBonus, MYTHIC_EFFECTS,
};
pub use rarity::{ItemRarityConfig, Rarity, RarityTable};
pub use rewards::{calculate_drops, repeat_clear_quantity, DropEntry, RewardItem};
