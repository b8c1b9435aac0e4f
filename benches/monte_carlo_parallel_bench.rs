//! Compare sequential vs parallel win-rate estimation.
//!
//! Run with: `cargo bench --bench monte_carlo_parallel`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use habitquest::cli::default_hero;
use habitquest::config::EngineConfig;
use habitquest::data::{Difficulty, DungeonRegistry};
use habitquest::sim::{estimate_win_rate, estimate_win_rate_parallel, Scenario, Strategy};
use habitquest::BattleContext;

fn bench_monte_carlo_sequential_vs_parallel(c: &mut Criterion) {
    let config = EngineConfig::default();
    let registry = DungeonRegistry::builtin().expect("builtin dungeons should parse");
    let dungeon = registry.get("frozen_crypt").expect("builtin dungeon should exist");
    let ctx = BattleContext::from_config(&config, registry.abilities().clone());
    let scenario = Scenario {
        label: "hero".to_string(),
        player: default_hero(12),
        player_level: 12,
        difficulty: Difficulty::Normal,
        strategy: Strategy::BasicAttack,
    };
    let seed = 42u64;
    let iterations = 500;

    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("sequential", |b| {
        b.iter(|| {
            black_box(estimate_win_rate(
                &ctx,
                dungeon,
                &scenario,
                &config.rarities,
                iterations,
                seed,
            ))
        });
    });

    group.bench_function("parallel", |b| {
        b.iter(|| {
            black_box(estimate_win_rate_parallel(
                &ctx,
                dungeon,
                &scenario,
                &config.rarities,
                iterations,
                seed,
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_monte_carlo_sequential_vs_parallel);
criterion_main!(benches);
