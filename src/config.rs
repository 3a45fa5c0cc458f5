use std::env;

use crate::rate::DEFAULT_LEAGUE_AVG_GOALS;
use crate::simulation::{DEFAULT_SIMULATIONS, SimulationRun};

pub const MAX_SIMULATIONS: u64 = 5_000_000;
pub const MAX_SIM_THREADS: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineConfig {
    pub run: SimulationRun,
    /// Dedicated pool size; `None` runs on rayon's global pool.
    pub sim_threads: Option<usize>,
}

impl EngineConfig {
    /// Reads `G2G_*` variables. Call `dotenvy` first if `.env` files should
    /// be honoured.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let league_average_goals = lookup("G2G_LEAGUE_AVG_GOALS")
            .and_then(|val| val.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_LEAGUE_AVG_GOALS);
        let simulation_count = lookup("G2G_SIMULATIONS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_SIMULATIONS)
            .clamp(1, MAX_SIMULATIONS);
        let random_seed = lookup("G2G_SEED").and_then(|val| val.trim().parse::<u64>().ok());
        let sim_threads = lookup("G2G_SIM_THREADS")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .map(clamp_sim_threads);

        Self {
            run: SimulationRun {
                league_average_goals,
                simulation_count,
                random_seed,
            },
            sim_threads,
        }
    }

    pub fn sim_pool(&self) -> Option<rayon::ThreadPool> {
        self.sim_threads.and_then(crate::simulation::build_sim_pool)
    }
}

/// Bounds a requested pool size to `1..=MAX_SIM_THREADS`.
pub fn clamp_sim_threads(threads: usize) -> usize {
    threads.clamp(1, MAX_SIM_THREADS)
}
