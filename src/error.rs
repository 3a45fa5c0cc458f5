use thiserror::Error;

use crate::stats::Side;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("invalid {field} for {side}: {value} (must be finite and non-negative)")]
    InvalidStat {
        side: Side,
        field: &'static str,
        value: f64,
    },

    #[error("invalid league average goals: {0} (must be finite and positive)")]
    InvalidLeagueAverage(f64),

    #[error("invalid simulation count: {0} (must be at least 1)")]
    InvalidSimulationCount(u64),

    #[error("invalid expected-goals rate for {side}: {value}")]
    InvalidRate { side: Side, value: f64 },
}

impl SimError {
    /// Short machine-readable kind, for structured error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            SimError::InvalidStat { .. } => "invalid_stat",
            SimError::InvalidLeagueAverage(_) => "invalid_league_average",
            SimError::InvalidSimulationCount(_) => "invalid_simulation_count",
            SimError::InvalidRate { .. } => "invalid_rate",
        }
    }
}
