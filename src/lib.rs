//! Retirement Monte Carlo simulation engine
//!
//! This library provides:
//! - Four interchangeable return models (correlated multivariate normal,
//!   fat-tailed Student-t, mean-reverting AR(1), historical bootstrap)
//! - A single-path retirement simulator (inflation-adjusted withdrawals,
//!   Social Security, conditional part-time income, yearly rebalancing)
//! - A parallel Monte Carlo orchestrator with percentile and success
//!   statistics across trials
//! - A CSV-backed historical return series with range and summary queries

pub mod error;
pub mod historical;
pub mod montecarlo;
pub mod params;
pub mod returns;
pub mod simulation;

// Re-export commonly used types
pub use error::{HistoricalError, ModelError, ParamsError};
pub use historical::HistoricalSeries;
pub use montecarlo::{AggregateStatistics, MonteCarlo};
pub use params::{
    SimulationParameters, SocialSecurityRule, SupplementalIncomeRule, SupplementalTrigger,
    TargetAllocation,
};
pub use returns::{AssetReturnSample, ModelKind, ReturnModel};
pub use simulation::{PathSimulator, PortfolioState, SimulationOutcome, SimulationRecord};
