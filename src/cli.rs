use crate::combat::engine::{Battle, BattleContext};
use crate::combat::export_csv::battle_log_to_csv;
use crate::combat::{Combatant, CombatantStats, Rng};
use crate::config::EngineConfig;
use crate::data::dungeon::Difficulty;
use crate::data::loader::DungeonRegistry;
use crate::loot::item::{generate_random_item, ItemType};
use crate::parallel::{run_simulation_batches, WorkerPool};
use crate::regen::{EnergyState, TicketState};
use crate::sim::monte_carlo::{estimate_win_rate, Scenario, Strategy, SIM_TICK_MS};

const USAGE: &str = "usage: habitquest <battle|loot|energy|simulate|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Battle,
    Loot,
    Energy,
    Simulate,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("battle") => Some(Command::Battle),
        Some("loot") => Some(Command::Loot),
        Some("energy") => Some(Command::Energy),
        Some("simulate") => Some(Command::Simulate),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Battle) => with_config(|config| handle_battle(args, config)),
        Some(Command::Loot) => with_config(|config| handle_loot(args, config)),
        Some(Command::Energy) => with_config(|config| handle_energy(args, config)),
        Some(Command::Simulate) => with_config(|config| handle_simulate(args, config)),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

fn with_config(run: impl FnOnce(&EngineConfig) -> i32) -> i32 {
    match EngineConfig::from_env() {
        Ok(config) => run(&config),
        Err(err) => {
            eprintln!("config error: {err}");
            1
        }
    }
}

/// A reference hero whose stats grow linearly with level.
pub fn default_hero(level: u32) -> Combatant {
    let level = level.max(1);
    let level_f = f64::from(level);
    let stats = CombatantStats {
        critical_chance: 5.0,
        ..CombatantStats::new(
            100 + 10 * i64::from(level),
            10.0 + 1.5 * level_f,
            3.0 + 0.5 * level_f,
        )
    };
    Combatant::player("Hero", stats)
}

fn default_rotation() -> Strategy {
    Strategy::Rotation(
        ["slash", "slash", "slash", "fireball", "power_strike", "guard", "heal"]
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

fn load_registry() -> Result<DungeonRegistry, i32> {
    DungeonRegistry::builtin().map_err(|err| {
        eprintln!("failed to load built-in dungeons: {err}");
        1
    })
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_battle(args: &[String], config: &EngineConfig) -> i32 {
    let as_csv = args.iter().any(|arg| arg == "--csv");
    let args: Vec<String> = args.iter().filter(|arg| *arg != "--csv").cloned().collect();
    let Some(name) = args.get(2) else {
        eprintln!("usage: habitquest battle <dungeon> [difficulty] [seed] [level] [--csv]");
        return 2;
    };
    let difficulty = parse_difficulty(args.get(3));
    let seed = parse_u64_arg(args.get(4), "seed", 7);
    let level = parse_u32_arg(args.get(5), "level", 10);

    let registry = match load_registry() {
        Ok(registry) => registry,
        Err(code) => return code,
    };
    let Some(dungeon) = registry.resolve(name) else {
        eprintln!("unknown dungeon '{name}', available: {}", registry.ids().join(", "));
        return 1;
    };

    let ctx = BattleContext::from_config(config, registry.abilities().clone());
    let strategy = default_rotation();
    let mut battle = Battle::for_dungeon(
        ctx,
        default_hero(level),
        dungeon,
        difficulty,
        true,
        level,
        config.rarities.clone(),
        seed,
    );
    let report = battle.run(0, SIM_TICK_MS, |b| strategy.choose(b));

    if as_csv {
        return match battle_log_to_csv(&report.messages) {
            Ok(csv) => {
                print!("{csv}");
                0
            }
            Err(err) => {
                eprintln!("failed to export battle log: {err}");
                1
            }
        };
    }
    print_json(&report, "battle report")
}

fn handle_loot(args: &[String], config: &EngineConfig) -> i32 {
    let item_type = match args.get(2).map(String::as_str) {
        None | Some("random") => None,
        Some("weapon") => Some(ItemType::Weapon),
        Some("armor") => Some(ItemType::Armor),
        Some("accessory") => Some(ItemType::Accessory),
        Some(other) => {
            eprintln!("unknown item type '{other}', expected weapon|armor|accessory|random");
            return 2;
        }
    };
    let level = parse_u32_arg(args.get(3), "level", 1);
    let seed = parse_u64_arg(args.get(4), "seed", 7);
    let count = parse_u32_arg(args.get(5), "count", 1);

    let mut rng = Rng::new(seed);
    let items: Vec<_> = (0..count)
        .map(|_| {
            let kind = item_type.unwrap_or_else(|| {
                ItemType::ALL[rng.range_inclusive(0, ItemType::ALL.len() as i64 - 1) as usize]
            });
            generate_random_item(&config.rarities, kind, level, &mut rng)
        })
        .collect();
    print_json(&items, "items")
}

#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct EnergyReport {
    energy: EnergyState,
    next_regen_secs: i64,
    full_in_secs: i64,
    tickets: TicketState,
    ticket_reset_secs: i64,
}

fn handle_energy(args: &[String], config: &EngineConfig) -> i32 {
    let (Some(current), Some(last_update)) = (args.get(2), args.get(3)) else {
        eprintln!("usage: habitquest energy <current> <last-update-ms> [now-ms]");
        return 2;
    };
    let current = parse_u32_arg(Some(current), "current", 0);
    let last_update = parse_i64_arg(Some(last_update), "last_update", 0);
    let now = parse_i64_arg(args.get(4), "now", chrono::Utc::now().timestamp_millis());

    let stored = EnergyState {
        current,
        max: config.energy.max,
        last_update,
        last_daily_bonus_claim: None,
        daily_streak: 0,
    };
    let energy = stored.sync(&config.energy, now);
    let report = EnergyReport {
        next_regen_secs: energy.time_to_next_regen(&config.energy, now),
        full_in_secs: energy.time_to_full(&config.energy, now),
        energy,
        tickets: TicketState::new(&config.tickets, now),
        ticket_reset_secs: TicketState::time_to_reset(&config.tickets, now),
    };
    print_json(&report, "energy report")
}

fn handle_simulate(args: &[String], config: &EngineConfig) -> i32 {
    let Some(name) = args.get(2) else {
        eprintln!(
            "usage: habitquest simulate <dungeon> [iterations] [seed] [difficulty] [--workers N]"
        );
        return 2;
    };
    let iterations = parse_u32_arg(args.get(3), "iterations", 200) as usize;
    let seed = parse_u64_arg(args.get(4), "seed", 7);
    let difficulty = parse_difficulty(args.get(5));
    let workers = args
        .iter()
        .position(|arg| arg == "--workers")
        .map(|i| parse_u32_arg(args.get(i + 1), "workers", 0) as usize);

    let registry = match load_registry() {
        Ok(registry) => registry,
        Err(code) => return code,
    };
    let Some(dungeon) = registry.resolve(name) else {
        eprintln!("unknown dungeon '{name}', available: {}", registry.ids().join(", "));
        return 1;
    };
    let ctx = BattleContext::from_config(config, registry.abilities().clone());
    let level = dungeon.recommended_level.max(1);
    let strategies = [("basic", Strategy::BasicAttack), ("rotation", default_rotation())];
    let scenarios: Vec<Scenario> = strategies
        .into_iter()
        .map(|(label, strategy)| Scenario {
            label: label.to_string(),
            player: default_hero(level),
            player_level: level,
            difficulty,
            strategy,
        })
        .collect();

    let results = match workers {
        Some(workers) => run_simulation_batches(
            &ctx,
            dungeon,
            &scenarios,
            &config.rarities,
            iterations,
            seed,
            &WorkerPool::with_workers(workers),
        ),
        None => scenarios
            .iter()
            .map(|s| estimate_win_rate(&ctx, dungeon, s, &config.rarities, iterations, seed))
            .collect(),
    };
    print_json(&results, "simulation results")
}

fn handle_validate(args: &[String]) -> i32 {
    let mut issues = Vec::new();

    let config = match args.get(2) {
        Some(path) => EngineConfig::load(path),
        None => EngineConfig::from_env(),
    };
    if let Err(err) = &config {
        issues.push(format!("config: {err}"));
    }

    let registry = match args.get(3) {
        Some(path) => DungeonRegistry::load(path),
        None => DungeonRegistry::builtin(),
    };
    match &registry {
        Ok(registry) if registry.ids().is_empty() => {
            issues.push("dungeons: no dungeons defined".to_string())
        }
        Ok(registry) => {
            for id in registry.ids() {
                if let Some(dungeon) = registry.get(id) {
                    let empty_stage = dungeon.stages.iter().any(|s| s.monsters.is_empty());
                    if empty_stage || dungeon.stages.is_empty() {
                        issues.push(format!(
                            "dungeon '{id}': every stage needs at least one monster"
                        ));
                    }
                }
            }
        }
        Err(err) => issues.push(format!("dungeons: {err}")),
    }

    if issues.is_empty() {
        println!("validation passed");
        0
    } else {
        eprintln!("validation failed: {} issue(s)", issues.len());
        for issue in issues {
            eprintln!("- {issue}");
        }
        1
    }
}

fn parse_difficulty(raw: Option<&String>) -> Difficulty {
    raw.and_then(|value| Difficulty::parse(value)).unwrap_or_else(|| {
        if let Some(value) = raw {
            eprintln!("invalid difficulty '{value}', defaulting to normal");
        }
        Difficulty::Normal
    })
}

fn parse_u32_arg(raw: Option<&String>, name: &str, default: u32) -> u32 {
    raw.and_then(|value| value.parse::<u32>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_u64_arg(raw: Option<&String>, name: &str, default: u64) -> u64 {
    raw.and_then(|value| value.parse::<u64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

fn parse_i64_arg(raw: Option<&String>, name: &str, default: i64) -> i64 {
    raw.and_then(|value| value.parse::<i64>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}
