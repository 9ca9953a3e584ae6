//! Error taxonomy: configuration errors fail fast at construction or query
//! time; numerical edge cases during a simulation (depletion, oversized
//! withdrawals) are policy handled by the engine, never errors.

use thiserror::Error;

/// Invalid simulation parameters, rejected at construction.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("allocation weights sum to {sum}, expected 1.0")]
    AllocationSum { sum: f64 },

    #[error("allocation weight for {class} is negative ({weight})")]
    NegativeWeight { class: &'static str, weight: f64 },

    #[error("starting portfolio must be positive, got {value}")]
    NonPositivePortfolio { value: f64 },

    #[error("annual spending must be non-negative, got {value}")]
    NegativeSpending { value: f64 },

    #[error("simulation horizon must be at least one period")]
    ZeroHorizon,

    #[error("trial count must be at least one")]
    ZeroTrials,
}

/// Invalid return-model configuration, rejected at construction.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("return model horizon must be at least one period")]
    ZeroHorizon,

    #[error("correlation matrix is not positive definite")]
    NotPositiveDefinite,

    #[error("volatility must be non-negative, got {value}")]
    NegativeVolatility { value: f64 },

    #[error("degrees of freedom must exceed 2 for finite variance, got {df}")]
    DegreesOfFreedom { df: f64 },

    #[error("autoregression coefficient must satisfy |phi| < 1, got {phi}")]
    Autoregression { phi: f64 },

    #[error("historical return series is unavailable or empty")]
    EmptyHistory,

    #[error(transparent)]
    Historical(#[from] HistoricalError),
}

/// Failures loading or querying the historical return series.
#[derive(Debug, Error)]
pub enum HistoricalError {
    #[error("failed to read historical data: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse historical data: {0}")]
    Csv(#[from] csv::Error),

    #[error("need at least 2 price-index rows to derive inflation, got {rows}")]
    TooFewRows { rows: usize },

    #[error("historical series contains no rows")]
    Empty,

    #[error("no historical data between {start} and {end}")]
    EmptyRange { start: i32, end: i32 },
}
