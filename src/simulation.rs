use std::collections::{BTreeMap, HashMap};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::poisson;
use crate::rate::{DEFAULT_LEAGUE_AVG_GOALS, check_rate};
use crate::report::{
    BttsSummary, ConfidenceInterval, GoalStats, GoalsBucket, OutcomeSplit, OverUnder, Scoreline,
    ScorelineFreq, SimulationReport, Volatility, VolatilityReport, confidence_interval, pct,
    round2,
};
use crate::stats::Side;

pub const DEFAULT_SIMULATIONS: u64 = 10_000;
pub const OVER_UNDER_LINE: f64 = 2.5;
pub const TOP_SCORELINES: usize = 10;

// Chunk boundaries fix which ChaCha stream a trial draws from, so this must
// not depend on the thread count.
const TRIALS_PER_CHUNK: u64 = 8_192;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    pub league_average_goals: f64,
    pub simulation_count: u64,
    pub random_seed: Option<u64>,
}

impl Default for SimulationRun {
    fn default() -> Self {
        Self {
            league_average_goals: DEFAULT_LEAGUE_AVG_GOALS,
            simulation_count: DEFAULT_SIMULATIONS,
            random_seed: None,
        }
    }
}

impl SimulationRun {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_simulations(mut self, simulations: u64) -> Self {
        self.simulation_count = simulations;
        self
    }

    /// The configured seed, or a fresh one from the thread-local entropy
    /// source. The resolved value ends up in the report.
    pub fn resolve_seed(&self) -> u64 {
        self.random_seed.unwrap_or_else(rand::random)
    }
}

#[derive(Debug, Clone, Copy)]
struct FirstSeen {
    count: u64,
    first_trial: u64,
}

#[derive(Debug, Default)]
struct Tally {
    trials: u64,
    btts: u64,
    a_wins: u64,
    draws: u64,
    b_wins: u64,
    over: u64,
    goals_a: Moments,
    goals_b: Moments,
    total: Moments,
    scorelines: HashMap<Scoreline, FirstSeen>,
    totals: BTreeMap<u32, u64>,
}

/// Integer sums, so merging partitions is exact and order-free.
#[derive(Debug, Default, Clone, Copy)]
struct Moments {
    sum: u64,
    sum_sq: u64,
}

impl Moments {
    fn push(&mut self, x: u32) {
        let x = x as u64;
        self.sum += x;
        self.sum_sq += x * x;
    }

    fn merge(&mut self, other: Moments) {
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    /// Population mean and standard deviation.
    fn mean_std(&self, n: u64) -> (f64, f64) {
        let n = n as f64;
        let mean = self.sum as f64 / n;
        let var = (self.sum_sq as f64 / n - mean * mean).max(0.0);
        (mean, var.sqrt())
    }
}

impl Tally {
    fn record(&mut self, trial: u64, goals_a: u32, goals_b: u32) {
        self.trials += 1;
        if goals_a > 0 && goals_b > 0 {
            self.btts += 1;
        }
        if goals_a > goals_b {
            self.a_wins += 1;
        } else if goals_a < goals_b {
            self.b_wins += 1;
        } else {
            self.draws += 1;
        }

        let total = goals_a + goals_b;
        if f64::from(total) > OVER_UNDER_LINE {
            self.over += 1;
        }
        self.goals_a.push(goals_a);
        self.goals_b.push(goals_b);
        self.total.push(total);

        self.scorelines
            .entry(Scoreline { goals_a, goals_b })
            .and_modify(|s| s.count += 1)
            .or_insert(FirstSeen {
                count: 1,
                first_trial: trial,
            });
        *self.totals.entry(total).or_insert(0) += 1;
    }

    fn merge(&mut self, other: Tally) {
        self.trials += other.trials;
        self.btts += other.btts;
        self.a_wins += other.a_wins;
        self.draws += other.draws;
        self.b_wins += other.b_wins;
        self.over += other.over;
        self.goals_a.merge(other.goals_a);
        self.goals_b.merge(other.goals_b);
        self.total.merge(other.total);

        for (score, seen) in other.scorelines {
            self.scorelines
                .entry(score)
                .and_modify(|s| {
                    s.count += seen.count;
                    s.first_trial = s.first_trial.min(seen.first_trial);
                })
                .or_insert(seen);
        }
        for (goals, count) in other.totals {
            *self.totals.entry(goals).or_insert(0) += count;
        }
    }
}

/// Runs `simulations` independent matches with goals drawn from
/// Poisson(`lambda_a`) and Poisson(`lambda_b`).
///
/// Trials are split into fixed-size chunks, each drawing from its own
/// ChaCha stream of `seed`, and run on the current rayon pool. The same
/// `(lambda_a, lambda_b, simulations, seed)` always yields the same report.
/// Rates outside `(0, LAMBDA_MAX]` are rejected.
pub fn simulate(
    lambda_a: f64,
    lambda_b: f64,
    simulations: u64,
    seed: u64,
) -> Result<SimulationReport, SimError> {
    check_rate(Side::TeamA, lambda_a)?;
    check_rate(Side::TeamB, lambda_b)?;
    if simulations == 0 {
        return Err(SimError::InvalidSimulationCount(simulations));
    }

    let chunks = simulations.div_ceil(TRIALS_PER_CHUNK);
    tracing::debug!(lambda_a, lambda_b, simulations, seed, chunks, "starting simulation");

    let partials: Vec<Tally> = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * TRIALS_PER_CHUNK;
            let len = TRIALS_PER_CHUNK.min(simulations - start);
            run_chunk(lambda_a, lambda_b, seed, chunk, start, len)
        })
        .collect();

    let mut tally = Tally::default();
    for partial in partials {
        tally.merge(partial);
    }
    debug_assert_eq!(tally.trials, simulations);

    let report = build_report(lambda_a, lambda_b, seed, tally);
    tracing::debug!(
        btts = report.btts.probability,
        volatility = report.volatility.level.label(),
        "simulation finished"
    );
    Ok(report)
}

fn run_chunk(lambda_a: f64, lambda_b: f64, seed: u64, chunk: u64, start: u64, len: u64) -> Tally {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(chunk);

    let mut tally = Tally::default();
    for trial in start..start + len {
        let goals_a = poisson::sample(&mut rng, lambda_a);
        let goals_b = poisson::sample(&mut rng, lambda_b);
        tally.record(trial, goals_a, goals_b);
    }
    tally
}

fn build_report(lambda_a: f64, lambda_b: f64, seed: u64, tally: Tally) -> SimulationReport {
    let n = tally.trials;

    let btts = pct(tally.btts, n);
    let ci = confidence_interval(btts, n);

    let (mean_a, std_a) = tally.goals_a.mean_std(n);
    let (mean_b, std_b) = tally.goals_b.mean_std(n);
    let (mean_total, std_total) = tally.total.mean_std(n);
    let cv = if mean_total > 0.0 {
        std_total / mean_total
    } else {
        0.0
    };

    let mut scorelines: Vec<(Scoreline, FirstSeen)> = tally.scorelines.into_iter().collect();
    scorelines.sort_by(|a, b| {
        b.1.count
            .cmp(&a.1.count)
            .then(a.1.first_trial.cmp(&b.1.first_trial))
    });
    let top_scorelines = scorelines
        .into_iter()
        .take(TOP_SCORELINES)
        .map(|(score, seen)| ScorelineFreq {
            score,
            count: seen.count,
            probability: round2(pct(seen.count, n)),
        })
        .collect();

    let total_goals_distribution = tally
        .totals
        .into_iter()
        .map(|(goals, count)| GoalsBucket {
            goals,
            count,
            probability: round2(pct(count, n)),
        })
        .collect();

    SimulationReport {
        lambda_a,
        lambda_b,
        simulations: n,
        seed,
        btts: BttsSummary {
            probability: round2(btts),
            no_btts: round2(100.0 - btts),
            confidence_interval: ConfidenceInterval {
                lower: round2(ci.lower),
                upper: round2(ci.upper),
            },
        },
        results: OutcomeSplit {
            team_a_win: round2(pct(tally.a_wins, n)),
            draw: round2(pct(tally.draws, n)),
            team_b_win: round2(pct(tally.b_wins, n)),
        },
        goals: GoalStats {
            team_a_avg: round2(mean_a),
            team_a_std: round2(std_a),
            team_b_avg: round2(mean_b),
            team_b_std: round2(std_b),
            total_avg: round2(mean_total),
        },
        over_under: OverUnder {
            line: OVER_UNDER_LINE,
            over: round2(pct(tally.over, n)),
            under: round2(pct(n - tally.over, n)),
        },
        top_scorelines,
        total_goals_distribution,
        volatility: VolatilityReport {
            level: Volatility::from_cv(cv),
            std: round2(std_total),
            coefficient: round2(cv),
        },
    }
}

pub fn build_sim_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("g2g-sim-{idx}"))
        .build()
        .ok()
}

pub fn with_sim_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}
