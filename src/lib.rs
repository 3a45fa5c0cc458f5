pub mod analytic;
pub mod config;
pub mod error;
pub mod poisson;
pub mod predict;
pub mod rate;
pub mod report;
pub mod simulation;
pub mod stats;

pub use error::SimError;
pub use predict::{MatchPrediction, predict};
pub use report::SimulationReport;
pub use simulation::{SimulationRun, simulate};
pub use stats::{Side, TeamMatchStats};
