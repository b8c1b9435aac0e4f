use std::fs;
use std::path::PathBuf;

use habitquest::config::EngineConfig;
use habitquest::data::DungeonRegistry;
use habitquest::error::ConfigError;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("habitquest-config-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_are_valid() {
    let config = EngineConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.energy.max, 100);
    assert_eq!(config.tickets.reset_hour, 5);
    assert!(!config.skills.is_empty());
}

#[test]
fn yaml_overrides_only_what_it_names() {
    let path = temp_file(
        "override.yaml",
        "battle:\n  criticalChance: 25\n  maxRounds: 50\nenergy:\n  max: 150\n",
    );
    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.battle.critical_chance, 25.0);
    assert_eq!(config.battle.max_rounds, 50);
    assert_eq!(config.battle.strong_attack_multiplier, 1.3);
    assert_eq!(config.energy.max, 150);
    assert_eq!(config.energy.regen_amount, 10);
    assert_eq!(config.combos.len(), 3);
}

#[test]
fn json_config_loads() {
    let path = temp_file("override.json", r#"{"tickets": {"max": 3, "utcOffsetMinutes": -300}}"#);
    let config = EngineConfig::load(&path).unwrap();
    assert_eq!(config.tickets.max, 3);
    assert_eq!(config.tickets.utc_offset_minutes, -300);
}

#[test]
fn rarity_rates_must_sum_to_one_hundred() {
    let mut config = EngineConfig::default();
    let mut raw = serde_json::to_value(&config).unwrap();
    raw["rarities"][0]["dropRate"] = serde_json::json!(60.0);
    let path = temp_file("bad_rarity.json", &raw.to_string());
    match EngineConfig::load(&path) {
        Err(ConfigError::RarityRatesSum { total }) => assert!((total - 110.0).abs() < 1e-9),
        other => panic!("expected rarity sum error, got {other:?}"),
    }

    config.tickets.reset_hour = 24;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn unsupported_extension_is_rejected() {
    let path = temp_file("config.toml", "battle = 1");
    assert!(matches!(
        EngineConfig::load(&path),
        Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let path = std::env::temp_dir().join("habitquest-does-not-exist.yaml");
    assert!(matches!(EngineConfig::load(path), Err(ConfigError::Io(_))));
}

#[test]
fn custom_dungeon_file_loads_and_resolves_by_name() {
    let path = temp_file(
        "dungeons.yaml",
        r#"
abilities:
  - id: bite
    name: Bite
    trigger: onAttack
    chance: 50
    effects:
      - kind: damage
        flat: 2
dungeons:
  - id: rat_cellar
    name: Rat Cellar
    stages:
      - monsters:
          - id: rat
            name: Rat
            experience: 3
            gold: 1
            abilities: [bite]
            stats: { maxHealth: 12, attack: 3, defense: 0 }
"#,
    );
    let registry = DungeonRegistry::load(&path).unwrap();
    assert_eq!(registry.ids(), vec!["rat_cellar"]);
    let dungeon = registry.resolve("Rat  Cellar").unwrap();
    assert_eq!(dungeon.stage_count(), 1);
    assert!(registry.abilities().get("bite").is_some());
}
