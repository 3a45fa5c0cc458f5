use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::stats::{Side, TeamMatchStats};

pub const DEFAULT_LEAGUE_AVG_GOALS: f64 = 1.5;

pub const LAMBDA_MIN: f64 = 0.5;
pub const LAMBDA_MAX: f64 = 4.0;

const NEUTRAL_POSSESSION: f64 = 50.0;
const NEUTRAL_SHOTS_ON_TARGET: f64 = 5.0;
const POSSESSION_WEIGHT: f64 = 0.3;
const SHOTS_WEIGHT: f64 = 0.7;

/// How one side's expected-goals rate was put together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateBreakdown {
    pub base: f64,
    pub possession_factor: f64,
    pub shots_factor: f64,
    pub multiplier: f64,
    pub unclamped: f64,
    pub lambda: f64,
    pub clamped: bool,
}

/// Expected goals for `attack` against `defence`.
///
/// Attack strength times defensive weakness over the league baseline, scaled
/// by possession and shot volume, then clamped to `[LAMBDA_MIN, LAMBDA_MAX]`.
/// Inputs are not validated here; NaN in gives NaN out.
pub fn expected_goals(attack: &TeamMatchStats, defence: &TeamMatchStats, league_avg_goals: f64) -> f64 {
    rate_breakdown(attack, defence, league_avg_goals).lambda
}

pub fn rate_breakdown(
    attack: &TeamMatchStats,
    defence: &TeamMatchStats,
    league_avg_goals: f64,
) -> RateBreakdown {
    let base = (attack.goals_scored * defence.goals_conceded) / league_avg_goals;
    let possession_factor = attack.possession / NEUTRAL_POSSESSION;
    let shots_factor = attack.shots_on_target / NEUTRAL_SHOTS_ON_TARGET;
    let multiplier = possession_factor * POSSESSION_WEIGHT + shots_factor * SHOTS_WEIGHT;
    let unclamped = base * multiplier;
    let lambda = clamp(unclamped, LAMBDA_MIN, LAMBDA_MAX);

    RateBreakdown {
        base,
        possession_factor,
        shots_factor,
        multiplier,
        unclamped,
        lambda,
        clamped: lambda != unclamped,
    }
}

/// Validated rate pair: both stat lines and the league average are checked
/// before either rate is computed.
pub fn estimate_rates(
    team_a: &TeamMatchStats,
    team_b: &TeamMatchStats,
    league_avg_goals: f64,
) -> Result<(RateBreakdown, RateBreakdown), SimError> {
    validate_league_avg(league_avg_goals)?;
    team_a.validate(Side::TeamA)?;
    team_b.validate(Side::TeamB)?;

    let a = rate_breakdown(team_a, team_b, league_avg_goals);
    let b = rate_breakdown(team_b, team_a, league_avg_goals);
    check_rate(Side::TeamA, a.lambda)?;
    check_rate(Side::TeamB, b.lambda)?;

    tracing::debug!(
        lambda_a = a.lambda,
        lambda_b = b.lambda,
        clamped_a = a.clamped,
        clamped_b = b.clamped,
        "estimated expected-goals rates"
    );
    Ok((a, b))
}

pub fn validate_league_avg(league_avg_goals: f64) -> Result<(), SimError> {
    if league_avg_goals.is_finite() && league_avg_goals > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidLeagueAverage(league_avg_goals))
    }
}

/// A simulated rate must lie in `(0, LAMBDA_MAX]`.
pub(crate) fn check_rate(side: Side, lambda: f64) -> Result<(), SimError> {
    if lambda.is_finite() && lambda > 0.0 && lambda <= LAMBDA_MAX {
        Ok(())
    } else {
        Err(SimError::InvalidRate { side, value: lambda })
    }
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}
