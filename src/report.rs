use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

const Z_95: f64 = 1.96;

const CV_PREDICTABLE_BELOW: f64 = 0.5;
const CV_MODERATE_BELOW: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Predictable,
    Moderate,
    Unpredictable,
}

impl Volatility {
    pub fn from_cv(cv: f64) -> Self {
        if cv < CV_PREDICTABLE_BELOW {
            Volatility::Predictable
        } else if cv < CV_MODERATE_BELOW {
            Volatility::Moderate
        } else {
            Volatility::Unpredictable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Volatility::Predictable => "predictable",
            Volatility::Moderate => "moderate",
            Volatility::Unpredictable => "unpredictable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BttsSummary {
    pub probability: f64,
    pub no_btts: f64,
    pub confidence_interval: ConfidenceInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSplit {
    pub team_a_win: f64,
    pub draw: f64,
    pub team_b_win: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalStats {
    pub team_a_avg: f64,
    pub team_a_std: f64,
    pub team_b_avg: f64,
    pub team_b_std: f64,
    pub total_avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverUnder {
    pub line: f64,
    pub over: f64,
    pub under: f64,
}

/// Serialized as its `"A-B"` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Scoreline {
    pub goals_a: u32,
    pub goals_b: u32,
}

impl Scoreline {
    pub fn label(&self) -> String {
        format!("{}-{}", self.goals_a, self.goals_b)
    }
}

impl From<Scoreline> for String {
    fn from(score: Scoreline) -> Self {
        score.label()
    }
}

impl TryFrom<String> for Scoreline {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let (a, b) = raw
            .split_once('-')
            .ok_or_else(|| format!("scoreline {raw:?} is not A-B"))?;
        let goals = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("scoreline {raw:?} has a bad goal count"))
        };
        Ok(Self {
            goals_a: goals(a)?,
            goals_b: goals(b)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorelineFreq {
    pub score: Scoreline,
    pub count: u64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalsBucket {
    pub goals: u32,
    pub count: u64,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    pub level: Volatility,
    pub std: f64,
    pub coefficient: f64,
}

/// Everything one simulation run produced. Probabilities are percentages
/// rounded to 2 decimals; counts are exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub lambda_a: f64,
    pub lambda_b: f64,
    pub simulations: u64,
    pub seed: u64,
    pub btts: BttsSummary,
    pub results: OutcomeSplit,
    pub goals: GoalStats,
    pub over_under: OverUnder,
    pub top_scorelines: Vec<ScorelineFreq>,
    pub total_goals_distribution: Vec<GoalsBucket>,
    pub volatility: VolatilityReport,
}

impl SimulationReport {
    pub fn most_likely_scoreline(&self) -> Option<&ScorelineFreq> {
        self.top_scorelines.first()
    }

    /// Single-level key/value view of the report for consumers that cannot
    /// walk the nested shape.
    pub fn flatten(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("lambda_a".into(), json!(self.lambda_a));
        out.insert("lambda_b".into(), json!(self.lambda_b));
        out.insert("simulations".into(), json!(self.simulations));
        out.insert("seed".into(), json!(self.seed));
        out.insert("btts_probability".into(), json!(self.btts.probability));
        out.insert("no_btts_probability".into(), json!(self.btts.no_btts));
        out.insert(
            "btts_ci_lower".into(),
            json!(self.btts.confidence_interval.lower),
        );
        out.insert(
            "btts_ci_upper".into(),
            json!(self.btts.confidence_interval.upper),
        );
        out.insert("team_a_win".into(), json!(self.results.team_a_win));
        out.insert("draw".into(), json!(self.results.draw));
        out.insert("team_b_win".into(), json!(self.results.team_b_win));
        out.insert("team_a_avg_goals".into(), json!(self.goals.team_a_avg));
        out.insert("team_a_std_goals".into(), json!(self.goals.team_a_std));
        out.insert("team_b_avg_goals".into(), json!(self.goals.team_b_avg));
        out.insert("team_b_std_goals".into(), json!(self.goals.team_b_std));
        out.insert("total_avg_goals".into(), json!(self.goals.total_avg));
        out.insert("over_2_5".into(), json!(self.over_under.over));
        out.insert("under_2_5".into(), json!(self.over_under.under));
        if let Some(top) = self.most_likely_scoreline() {
            out.insert("most_likely_score".into(), json!(top.score.label()));
            out.insert(
                "most_likely_score_probability".into(),
                json!(top.probability),
            );
        }
        for (rank, s) in self.top_scorelines.iter().enumerate() {
            out.insert(format!("score_{}", rank + 1), json!(s.score.label()));
            out.insert(
                format!("score_{}_probability", rank + 1),
                json!(s.probability),
            );
        }
        for bucket in &self.total_goals_distribution {
            out.insert(
                format!("total_goals_{}", bucket.goals),
                json!(bucket.probability),
            );
        }
        out.insert("volatility".into(), json!(self.volatility.level.label()));
        out.insert("volatility_std".into(), json!(self.volatility.std));
        out.insert("volatility_cv".into(), json!(self.volatility.coefficient));
        out
    }
}

/// Normal-approximation interval for a binomial proportion given as a
/// percentage, clipped to [0, 100].
pub fn confidence_interval(p_pct: f64, n: u64) -> ConfidenceInterval {
    if n == 0 {
        return ConfidenceInterval {
            lower: 0.0,
            upper: 100.0,
        };
    }
    let se = (p_pct * (100.0 - p_pct) / n as f64).max(0.0).sqrt();
    ConfidenceInterval {
        lower: (p_pct - Z_95 * se).max(0.0),
        upper: (p_pct + Z_95 * se).min(100.0),
    }
}

pub(crate) fn pct(count: u64, n: u64) -> f64 {
    count as f64 / n as f64 * 100.0
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
