//! Per-period output rows and the per-path outcome

use serde::{Deserialize, Serialize};

/// One period of simulation output, appended in period order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub period: usize,
    pub age: u32,

    /// Total value at period start, before the withdrawal.
    pub start_value: f64,
    /// Total value at period end, after returns and rebalancing
    /// (clamped to 0 once the path is depleted).
    pub end_value: f64,

    pub stocks_value: f64,
    pub bonds_value: f64,
    pub cash_value: f64,

    /// Inflation-adjusted spending need for the period.
    pub spending_need: f64,
    pub social_security_income: f64,
    pub supplemental_income: f64,

    /// Dollars actually taken from the portfolio.
    pub net_withdrawal: f64,
    /// Net withdrawal over start-of-period value; 0 when the value is 0.
    pub withdrawal_rate: f64,

    pub inflation_rate: f64,
}

/// Complete result of one simulated path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Exactly one record per period of the horizon, in order.
    pub records: Vec<SimulationRecord>,
    /// False iff the portfolio was depleted at any period.
    pub success: bool,
    /// Period index at which the value first reached zero or below.
    pub depletion_period: Option<usize>,
}

impl SimulationOutcome {
    /// Portfolio value at the end of the final period.
    pub fn final_value(&self) -> f64 {
        self.records.last().map(|r| r.end_value).unwrap_or(0.0)
    }

    /// Number of periods in which supplemental income was earned.
    pub fn supplemental_income_years(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.supplemental_income > 0.0)
            .count()
    }

    /// Age at the depletion period, if the path failed.
    pub fn depletion_age(&self) -> Option<u32> {
        self.depletion_period.map(|p| self.records[p].age)
    }
}
