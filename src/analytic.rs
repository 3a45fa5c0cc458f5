use serde::{Deserialize, Serialize};

use crate::poisson;
use crate::simulation::OVER_UNDER_LINE;
use crate::stats::TeamMatchStats;

const MAX_GOALS: u32 = 10;

const LOGIT_INTERCEPT: f64 = -0.8;
const W_GOALS_SCORED: f64 = 0.45;
const W_GOALS_CONCEDED: f64 = 0.35;
const W_SHOTS_ON_TARGET: f64 = 0.08;
const W_AVG_GOALS: f64 = 0.25;
const W_OFFENSIVE_STRENGTH: f64 = 0.15;
const FEATURE_CAP: f64 = 1.5;

const CONSENSUS_BELOW: f64 = 10.0;
const STRONG_AGREEMENT_BELOW: f64 = 5.0;
const MODERATE_AGREEMENT_BELOW: f64 = 15.0;

/// Closed-form outcome percentages for a λ pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExactOutcomes {
    pub btts: f64,
    pub team_a_win: f64,
    pub draw: f64,
    pub team_b_win: f64,
    pub over_2_5: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedModel {
    Consensus,
    Poisson,
    Logistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Agreement {
    Strong,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BttsConsensus {
    pub poisson: f64,
    pub logistic: f64,
    pub difference: f64,
    pub final_probability: f64,
    pub recommended: RecommendedModel,
    pub confidence: ConfidenceLevel,
    pub agreement: Agreement,
}

/// Outcome grid over independent Poisson PMFs, each truncated at
/// `MAX_GOALS` with the tail folded into the last bucket.
pub fn exact_outcomes(lambda_a: f64, lambda_b: f64) -> ExactOutcomes {
    let pmf_a = poisson::pmf(lambda_a, MAX_GOALS);
    let pmf_b = poisson::pmf(lambda_b, MAX_GOALS);

    let mut a_win = 0.0;
    let mut draw = 0.0;
    let mut b_win = 0.0;
    let mut over = 0.0;

    for (i, p_i) in pmf_a.iter().enumerate() {
        for (j, p_j) in pmf_b.iter().enumerate() {
            let p = p_i * p_j;
            if i > j {
                a_win += p;
            } else if i < j {
                b_win += p;
            } else {
                draw += p;
            }
            if (i + j) as f64 > OVER_UNDER_LINE {
                over += p;
            }
        }
    }

    ExactOutcomes {
        btts: poisson_btts(lambda_a, lambda_b),
        team_a_win: a_win * 100.0,
        draw: draw * 100.0,
        team_b_win: b_win * 100.0,
        over_2_5: over * 100.0,
    }
}

/// P(both score) under independence, as a percentage.
pub fn poisson_btts(lambda_a: f64, lambda_b: f64) -> f64 {
    poisson::p_scores(lambda_a) * poisson::p_scores(lambda_b) * 100.0
}

/// Logistic-regression BTTS estimate straight from the stat lines, as a
/// percentage. Every normalized feature is capped at `FEATURE_CAP`.
pub fn logistic_btts(a: &TeamMatchStats, b: &TeamMatchStats) -> f64 {
    let gs_a = capped(a.goals_scored / 3.0);
    let gs_b = capped(b.goals_scored / 3.0);
    // Each side's scoring chance leans on the other side's leakiness.
    let gc_a = capped(b.goals_conceded / 2.5);
    let gc_b = capped(a.goals_conceded / 2.5);
    let sot_a = capped(a.shots_on_target / 8.0);
    let sot_b = capped(b.shots_on_target / 8.0);

    let avg_goals = (a.goals_scored + b.goals_scored) / 2.0;
    let avg_goals_norm = capped(avg_goals / 2.5);

    let offensive_strength =
        (a.goals_scored + b.goals_scored) / (a.goals_conceded + b.goals_conceded + 0.5);
    let offensive_norm = capped(offensive_strength / 2.0);

    let z = LOGIT_INTERCEPT
        + W_GOALS_SCORED * (gs_a + gs_b)
        + W_GOALS_CONCEDED * (gc_a + gc_b)
        + W_SHOTS_ON_TARGET * (sot_a + sot_b)
        + W_AVG_GOALS * avg_goals_norm
        + W_OFFENSIVE_STRENGTH * offensive_norm;

    sigmoid(z) * 100.0
}

/// Reconciles the two BTTS estimates. Close estimates are averaged;
/// otherwise the higher one is taken at reduced confidence.
///
/// The Poisson leg is the independent form `poisson_btts` with no
/// correlation term between the two sides' goals.
pub fn consensus(poisson: f64, logistic: f64) -> BttsConsensus {
    let difference = (poisson - logistic).abs();

    let (recommended, confidence, final_probability) = if difference < CONSENSUS_BELOW {
        (
            RecommendedModel::Consensus,
            ConfidenceLevel::High,
            (poisson + logistic) / 2.0,
        )
    } else if poisson > logistic {
        (RecommendedModel::Poisson, ConfidenceLevel::Medium, poisson)
    } else {
        (RecommendedModel::Logistic, ConfidenceLevel::Medium, logistic)
    };

    let agreement = if difference < STRONG_AGREEMENT_BELOW {
        Agreement::Strong
    } else if difference < MODERATE_AGREEMENT_BELOW {
        Agreement::Moderate
    } else {
        Agreement::Weak
    };

    BttsConsensus {
        poisson,
        logistic,
        difference,
        final_probability,
        recommended,
        confidence,
        agreement,
    }
}

fn capped(v: f64) -> f64 {
    v.min(FEATURE_CAP)
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
