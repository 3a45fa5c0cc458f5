use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    TeamA,
    TeamB,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::TeamA => f.write_str("team A"),
            Side::TeamB => f.write_str("team B"),
        }
    }
}

/// Per-match averages for one side, as entered by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamMatchStats {
    pub goals_scored: f64,
    pub goals_conceded: f64,
    pub possession: f64,
    pub shots_on_target: f64,
}

impl TeamMatchStats {
    pub fn new(goals_scored: f64, goals_conceded: f64, possession: f64, shots_on_target: f64) -> Self {
        Self {
            goals_scored,
            goals_conceded,
            possession,
            shots_on_target,
        }
    }

    /// Rejects negative or non-finite fields. Possession above 100 is let
    /// through with a warning; the rate model only scales by it.
    pub fn validate(&self, side: Side) -> Result<(), SimError> {
        let fields = [
            ("goals_scored", self.goals_scored),
            ("goals_conceded", self.goals_conceded),
            ("possession", self.possession),
            ("shots_on_target", self.shots_on_target),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidStat { side, field, value });
            }
        }
        if self.possession > 100.0 {
            tracing::warn!(%side, possession = self.possession, "possession above 100%");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_goals_are_rejected_with_field_name() {
        let stats = TeamMatchStats::new(-0.5, 1.0, 50.0, 4.0);
        let err = stats.validate(Side::TeamB).unwrap_err();
        assert_eq!(
            err,
            SimError::InvalidStat {
                side: Side::TeamB,
                field: "goals_scored",
                value: -0.5,
            }
        );
        assert_eq!(err.kind(), "invalid_stat");
    }

    #[test]
    fn non_finite_shots_are_rejected() {
        let stats = TeamMatchStats::new(1.0, 1.0, 50.0, f64::INFINITY);
        assert!(matches!(
            stats.validate(Side::TeamA),
            Err(SimError::InvalidStat {
                field: "shots_on_target",
                ..
            })
        ));
        let stats = TeamMatchStats::new(1.0, f64::NAN, 50.0, 4.0);
        assert!(stats.validate(Side::TeamA).is_err());
    }

    #[test]
    fn possession_over_100_is_accepted() {
        let stats = TeamMatchStats::new(1.0, 1.0, 120.0, 4.0);
        assert!(stats.validate(Side::TeamA).is_ok());
    }

    #[test]
    fn zero_stats_are_valid() {
        let stats = TeamMatchStats::new(0.0, 0.0, 0.0, 0.0);
        assert!(stats.validate(Side::TeamA).is_ok());
    }
}
