//! Batch boundaries for splitting simulation iterations across workers.

use crate::combat::engine::BattleContext;
use crate::data::dungeon::DungeonConfig;
use crate::loot::rarity::RarityTable;
use crate::parallel::pool::WorkerPool;
use crate::sim::monte_carlo::{run_scenarios, Scenario, SimulationResult};

/// Split `total` items into up to `num_batches` contiguous ranges `[start, end)`, as equal
/// as possible with the larger ones first.
///
/// # Example
/// ```
/// # use habitquest::parallel::batch_ranges;
/// let ranges = batch_ranges(10, 3);
/// assert_eq!(ranges, vec![(0, 4), (4, 7), (7, 10)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let base = total / num_batches;
    let remainder = total % num_batches;
    let mut start = 0;
    (0..num_batches)
        .map(|i| {
            let end = start + base + usize::from(i < remainder);
            let range = (start, end);
            start = end;
            range
        })
        .collect()
}

/// Runs every scenario in parallel inside `pool`.
pub fn run_simulation_batches(
    ctx: &BattleContext,
    dungeon: &DungeonConfig,
    scenarios: &[Scenario],
    rarities: &RarityTable,
    iterations: usize,
    seed: u64,
    pool: &WorkerPool,
) -> Vec<SimulationResult> {
    pool.install(|| run_scenarios(ctx, dungeon, scenarios, rarities, iterations, seed, true))
}
