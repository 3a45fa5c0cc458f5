use serde::{Deserialize, Serialize};

use crate::analytic::{self, BttsConsensus, ExactOutcomes};
use crate::error::SimError;
use crate::rate::{self, RateBreakdown};
use crate::report::SimulationReport;
use crate::simulation::{self, SimulationRun};
use crate::stats::TeamMatchStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub team_a: RateBreakdown,
    pub team_b: RateBreakdown,
    pub exact: ExactOutcomes,
    pub models: BttsConsensus,
    pub simulation: SimulationReport,
}

/// Full evaluation of one fixture: rates, closed-form models and a Monte
/// Carlo run. Input is validated up front; nothing is simulated on error.
pub fn predict(
    team_a: &TeamMatchStats,
    team_b: &TeamMatchStats,
    run: &SimulationRun,
) -> Result<MatchPrediction, SimError> {
    if run.simulation_count == 0 {
        return Err(SimError::InvalidSimulationCount(run.simulation_count));
    }
    let (rate_a, rate_b) = rate::estimate_rates(team_a, team_b, run.league_average_goals)?;

    let exact = analytic::exact_outcomes(rate_a.lambda, rate_b.lambda);
    let logistic = analytic::logistic_btts(team_a, team_b);
    let models = analytic::consensus(exact.btts, logistic);

    let seed = run.resolve_seed();
    let simulation = simulation::simulate(rate_a.lambda, rate_b.lambda, run.simulation_count, seed)?;

    tracing::info!(
        lambda_a = rate_a.lambda,
        lambda_b = rate_b.lambda,
        btts_sim = simulation.btts.probability,
        btts_model = models.final_probability,
        seed,
        "match evaluated"
    );

    Ok(MatchPrediction {
        team_a: rate_a,
        team_b: rate_b,
        exact,
        models,
        simulation,
    })
}
