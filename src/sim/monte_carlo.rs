//! Seeded batch simulation of a player against a dungeon.
//!
//! Every iteration is an independent battle with its own seed, so sequential and parallel
//! runs of the same inputs produce identical results.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::combat::engine::{Battle, BattleContext, BattleState, PlayerAction};
use crate::data::dungeon::{Difficulty, DungeonConfig};
use crate::loot::rarity::RarityTable;
use crate::parallel::batch::batch_ranges;

/// Simulated clock step between half-turns.
pub const SIM_TICK_MS: i64 = 1_000;

/// How the simulated player picks actions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    #[default]
    BasicAttack,
    /// Casts these skills in order, cycling, one per player turn.
    Rotation(Vec<String>),
}

impl Strategy {
    pub fn choose(&self, battle: &Battle) -> PlayerAction {
        match self {
            Self::BasicAttack => PlayerAction::Attack,
            Self::Rotation(skills) if skills.is_empty() => PlayerAction::Attack,
            Self::Rotation(skills) => {
                let index = (battle.turn().saturating_sub(1) as usize) % skills.len();
                PlayerAction::Skill(skills[index].clone())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub label: String,
    pub player: Combatant,
    pub player_level: u32,
    pub difficulty: Difficulty,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub label: String,
    pub iterations: usize,
    pub win_rate: f64,
    /// Mean health ratio left on winning runs, averaged over all iterations.
    pub avg_surviving_health: f64,
    pub avg_turns: f64,
}

#[derive(Debug, Clone, Copy)]
struct IterationOutcome {
    won: bool,
    surviving_health: f64,
    turns: u32,
}

fn stable_seed(label: &str, dungeon_id: &str, seed: u64) -> u64 {
    let mut acc = seed;
    for b in label.bytes().chain(dungeon_id.bytes()) {
        acc = acc.wrapping_mul(37).wrapping_add(u64::from(b));
    }
    acc
}

fn run_iteration(
    ctx: &BattleContext,
    dungeon: &DungeonConfig,
    scenario: &Scenario,
    rarities: &RarityTable,
    seed: u64,
) -> IterationOutcome {
    let mut battle = Battle::for_dungeon(
        ctx.clone(),
        scenario.player.clone(),
        dungeon,
        scenario.difficulty,
        false,
        scenario.player_level,
        rarities.clone(),
        seed,
    );
    let report = battle.run(0, SIM_TICK_MS, |b| scenario.strategy.choose(b));
    let won = report.outcome == BattleState::Victory;
    IterationOutcome {
        won,
        surviving_health: if won { report.surviving_health_ratio } else { 0.0 },
        turns: report.turns,
    }
}

fn summarize(label: &str, outcomes: &[IterationOutcome]) -> SimulationResult {
    let iterations = outcomes.len();
    if iterations == 0 {
        return SimulationResult {
            label: label.to_string(),
            iterations,
            win_rate: 0.0,
            avg_surviving_health: 0.0,
            avg_turns: 0.0,
        };
    }
    let n = iterations as f64;
    let wins = outcomes.iter().filter(|o| o.won).count();
    let health: f64 = outcomes.iter().map(|o| o.surviving_health).sum();
    let turns: f64 = outcomes.iter().map(|o| f64::from(o.turns)).sum();
    SimulationResult {
        label: label.to_string(),
        iterations,
        win_rate: wins as f64 / n,
        avg_surviving_health: health / n,
        avg_turns: turns / n,
    }
}

pub fn estimate_win_rate(
    ctx: &BattleContext,
    dungeon: &DungeonConfig,
    scenario: &Scenario,
    rarities: &RarityTable,
    iterations: usize,
    seed: u64,
) -> SimulationResult {
    let base = stable_seed(&scenario.label, &dungeon.id, seed);
    let outcomes: Vec<IterationOutcome> = (0..iterations)
        .map(|i| run_iteration(ctx, dungeon, scenario, rarities, base.wrapping_add(i as u64)))
        .collect();
    summarize(&scenario.label, &outcomes)
}

/// Like [estimate_win_rate] but spreads iterations across the current Rayon pool.
pub fn estimate_win_rate_parallel(
    ctx: &BattleContext,
    dungeon: &DungeonConfig,
    scenario: &Scenario,
    rarities: &RarityTable,
    iterations: usize,
    seed: u64,
) -> SimulationResult {
    let base = stable_seed(&scenario.label, &dungeon.id, seed);
    let ranges = batch_ranges(iterations, rayon::current_num_threads().max(1) * 4);
    let outcomes: Vec<IterationOutcome> = ranges
        .par_iter()
        .flat_map_iter(|&(start, end)| {
            (start..end).map(move |i| {
                run_iteration(ctx, dungeon, scenario, rarities, base.wrapping_add(i as u64))
            })
        })
        .collect();
    summarize(&scenario.label, &outcomes)
}

/// One result per scenario, in input order.
pub fn run_scenarios(
    ctx: &BattleContext,
    dungeon: &DungeonConfig,
    scenarios: &[Scenario],
    rarities: &RarityTable,
    iterations: usize,
    seed: u64,
    parallel: bool,
) -> Vec<SimulationResult> {
    let run_one = |scenario: &Scenario| {
        estimate_win_rate(ctx, dungeon, scenario, rarities, iterations, seed)
    };
    if parallel {
        scenarios.par_iter().map(run_one).collect()
    } else {
        scenarios.iter().map(run_one).collect()
    }
}
