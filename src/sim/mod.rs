pub mod monte_carlo;

pub use monte_carlo::{
    estimate_win_rate, estimate_win_rate_parallel, run_scenarios, Scenario, SimulationResult,
    Strategy, SIM_TICK_MS,
};
