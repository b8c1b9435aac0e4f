use std::collections::HashSet;

use habitquest::combat::{CombatantStats, Rng, StatKey};
use habitquest::config::BattleConstants;
use habitquest::data::{DungeonProgress, DungeonRegistry};
use habitquest::error::ConfigError;
use habitquest::loot::{
    calculate_drops, equip, generate_item, generate_random_item, repeat_clear_quantity, DropEntry,
    Item, ItemType, Rarity, RarityTable, StatBonus,
};
use proptest::prelude::*;
use uuid::Uuid;

fn drop_entry(
    item_id: &str,
    drop_rate: f64,
    min: u32,
    max: u32,
    first_clear_only: bool,
) -> DropEntry {
    DropEntry {
        item_id: item_id.to_string(),
        drop_rate,
        min_quantity: min,
        max_quantity: max,
        first_clear_only,
    }
}

#[test]
fn default_rarity_table_is_valid() {
    let table = RarityTable::default();
    assert!(table.validate().is_ok());
    assert!((table.total_drop_rate() - 100.0).abs() < 1e-9);
    assert_eq!(table.tiers().len(), Rarity::ALL.len());
}

#[test]
fn rarity_rates_off_by_more_than_tolerance_are_rejected() {
    let mut tiers = RarityTable::default().tiers().to_vec();
    tiers[0].drop_rate = 49.0;
    match RarityTable::new(tiers).validate() {
        Err(ConfigError::RarityRatesSum { total }) => assert!((total - 99.0).abs() < 1e-9),
        other => panic!("expected rate sum error, got {other:?}"),
    }
}

#[test]
fn duplicate_rarity_tier_is_rejected() {
    let mut tiers = RarityTable::default().tiers().to_vec();
    tiers[1].rarity = Rarity::Common;
    assert!(matches!(RarityTable::new(tiers).validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn rarity_distribution_tracks_drop_rates() {
    let table = RarityTable::default();
    let mut rng = Rng::new(77);
    let trials = 20_000;
    let commons = (0..trials)
        .filter(|_| table.determine_rarity(&mut rng) == Rarity::Common)
        .count();
    let share = commons as f64 / trials as f64;
    assert!((0.46..0.54).contains(&share), "common share {share}");
}

#[test]
fn mythic_items_carry_a_special_effect() {
    let table = RarityTable::default();
    let mut rng = Rng::new(3);
    let item = generate_item(&table, ItemType::Accessory, Rarity::Mythic, 1, &mut rng);
    assert!(item.special_effect.is_some());
    assert_eq!(item.bonuses.len(), 3);
    assert!(item.name.starts_with("Mythic "));

    let plain = generate_item(&table, ItemType::Weapon, Rarity::Rare, 1, &mut rng);
    assert!(plain.special_effect.is_none());
}

#[test]
fn item_ids_are_unique_and_seeded() {
    let table = RarityTable::default();
    let mut rng = Rng::new(8);
    let ids: HashSet<Uuid> = (0..200)
        .map(|_| generate_random_item(&table, ItemType::Armor, 5, &mut rng).id)
        .collect();
    assert_eq!(ids.len(), 200);

    let a = generate_random_item(&table, ItemType::Weapon, 5, &mut Rng::new(21));
    let b = generate_random_item(&table, ItemType::Weapon, 5, &mut Rng::new(21));
    assert_eq!(a, b);
}

#[test]
fn level_raises_bonus_floor() {
    let table = RarityTable::default();
    let mut rng = Rng::new(4);
    for _ in 0..100 {
        let item = generate_item(&table, ItemType::Weapon, Rarity::Common, 35, &mut rng);
        for bonus in &item.bonuses {
            assert!((4..=8).contains(&bonus.value), "value {}", bonus.value);
        }
    }
}

#[test]
fn sale_value_scales_with_bonuses() {
    let table = RarityTable::default();
    let item = Item {
        id: Uuid::nil(),
        name: "Rare Sword".to_string(),
        item_type: ItemType::Weapon,
        rarity: Rarity::Rare,
        bonuses: vec![
            StatBonus { stat: StatKey::Attack, value: 10 },
            StatBonus { stat: StatKey::CriticalChance, value: 15 },
        ],
        special_effect: None,
    };
    assert_eq!(item.bonus_total(), 25);
    assert_eq!(item.sale_value(&table), 75);
}

#[test]
fn equip_folds_bonuses_into_stats() {
    let item = Item {
        id: Uuid::nil(),
        name: "Epic Chestplate".to_string(),
        item_type: ItemType::Armor,
        rarity: Rarity::Epic,
        bonuses: vec![
            StatBonus { stat: StatKey::MaxHealth, value: 20 },
            StatBonus { stat: StatKey::Defense, value: 5 },
        ],
        special_effect: None,
    };
    let stats = equip(CombatantStats::new(100, 10.0, 2.0), &[item], &BattleConstants::default());
    assert_eq!(stats.max_health, 120);
    assert_eq!(stats.current_health, 120);
    assert_eq!(stats.defense, 7.0);
    assert_eq!(stats.attack, 10.0);
}

#[test]
fn first_clear_only_drops_are_skipped_on_repeats() {
    let entries = vec![
        drop_entry("cave_map", 100.0, 1, 1, true),
        drop_entry("potion", 100.0, 1, 1, false),
    ];
    let first = calculate_drops(&entries, true, 1.0, &mut Rng::new(1));
    assert_eq!(first.len(), 2);
    let repeat = calculate_drops(&entries, false, 1.0, &mut Rng::new(1));
    assert_eq!(repeat.len(), 1);
    assert_eq!(repeat[0].item_id, "potion");
}

#[test]
fn zero_rate_never_drops_and_full_rate_always_drops() {
    let entries = vec![
        drop_entry("never", 0.0, 1, 1, false),
        drop_entry("always", 100.0, 1, 1, false),
    ];
    let mut rng = Rng::new(12);
    for _ in 0..500 {
        let drops = calculate_drops(&entries, true, 1.0, &mut rng);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].item_id, "always");
    }
}

#[test]
fn repeat_clears_keep_a_tenth_rounded_up() {
    assert_eq!(repeat_clear_quantity(1), 1);
    assert_eq!(repeat_clear_quantity(10), 1);
    assert_eq!(repeat_clear_quantity(11), 2);
    assert_eq!(repeat_clear_quantity(25), 3);
    assert_eq!(repeat_clear_quantity(0), 1);
}

#[test]
fn dungeon_rewards_for_unknown_dungeon_are_empty() {
    let registry = DungeonRegistry::builtin().unwrap();
    let mut rng = Rng::new(1);
    assert!(registry
        .calculate_dungeon_rewards("nowhere", true, Default::default(), &mut rng)
        .is_empty());
    let rewards =
        registry.calculate_dungeon_rewards("Goblin Cave", true, Default::default(), &mut rng);
    assert!(rewards.iter().any(|r| r.item_id == "cave_map"));
}

#[test]
fn milestones_unlock_on_their_clear_count() {
    let registry = DungeonRegistry::builtin().unwrap();
    let dungeon = registry.get("goblin_cave").unwrap();
    let mut progress = DungeonProgress::new("goblin_cave");
    assert!(progress.is_first_clear());

    let unlocked = progress.record_clear(dungeon);
    assert_eq!(unlocked.len(), 1);
    assert_eq!(unlocked[0].reward, "goblin_cave_badge");
    assert!(!progress.is_first_clear());

    for _ in 2..10 {
        assert!(progress.record_clear(dungeon).is_empty());
    }
    let unlocked = progress.record_clear(dungeon);
    assert_eq!(unlocked[0].reward, "goblin_slayer_title");
    assert_eq!(progress.unlocked_milestones(dungeon).len(), 2);
}

fn item_type() -> impl Strategy<Value = ItemType> {
    prop_oneof![Just(ItemType::Weapon), Just(ItemType::Armor), Just(ItemType::Accessory)]
}

fn rarity() -> impl Strategy<Value = Rarity> {
    proptest::sample::select(Rarity::ALL.to_vec())
}

proptest! {
    #[test]
    fn generated_items_respect_their_tier(
        seed in any::<u64>(),
        kind in item_type(),
        tier in rarity(),
        level in 1u32..100,
    ) {
        let table = RarityTable::default();
        let config = table.get(tier).unwrap().clone();
        let item = generate_item(&table, kind, tier, level, &mut Rng::new(seed));
        let count = item.bonuses.len() as u32;
        prop_assert!(count >= config.min_bonuses.min(kind.stat_pool().len() as u32));
        prop_assert!(count <= config.max_bonuses);

        let stats: HashSet<StatKey> = item.bonuses.iter().map(|b| b.stat).collect();
        prop_assert_eq!(stats.len(), item.bonuses.len());
        let level_bonus = i64::from(level / 10);
        for bonus in &item.bonuses {
            prop_assert!(kind.stat_pool().contains(&bonus.stat));
            prop_assert!(bonus.value >= config.min_bonus_value + level_bonus);
            prop_assert!(bonus.value <= config.max_bonus_value + level_bonus);
        }
    }

    #[test]
    fn drop_quantities_stay_in_range(seed in any::<u64>(), min in 1u32..5, extra in 0u32..5) {
        let entries = vec![drop_entry("loot", 100.0, min, min + extra, false)];
        let drops = calculate_drops(&entries, true, 1.0, &mut Rng::new(seed));
        prop_assert_eq!(drops.len(), 1);
        prop_assert!(drops[0].quantity >= min && drops[0].quantity <= min + extra);
    }
}
