//! Simulation parameters with construction-time validation
//!
//! A `SimulationParameters` value is built once per experiment and is
//! read-only afterwards; every trial of a Monte Carlo run shares the same
//! instance by reference.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;

/// Tolerance for the allocation-weights-sum-to-one check.
pub const ALLOCATION_TOLERANCE: f64 = 1e-6;

/// Target portfolio weights per asset class.
///
/// Weights are plain fractions (0.6 = 60%), non-negative, and must sum to
/// 1.0 within [`ALLOCATION_TOLERANCE`]. Construction rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetAllocation {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
}

impl TargetAllocation {
    /// Build an allocation from fractional weights.
    pub fn new(stocks: f64, bonds: f64, cash: f64) -> Result<Self, ParamsError> {
        for (class, weight) in [("stocks", stocks), ("bonds", bonds), ("cash", cash)] {
            if weight < 0.0 {
                return Err(ParamsError::NegativeWeight { class, weight });
            }
        }

        let sum = stocks + bonds + cash;
        if (sum - 1.0).abs() > ALLOCATION_TOLERANCE {
            return Err(ParamsError::AllocationSum { sum });
        }

        Ok(Self { stocks, bonds, cash })
    }

    /// Build an allocation from percentages summing to 100.
    pub fn from_percentages(stocks: f64, bonds: f64, cash: f64) -> Result<Self, ParamsError> {
        Self::new(stocks / 100.0, bonds / 100.0, cash / 100.0)
    }
}

/// Social Security benefit rule: nothing before `start_age`, then
/// `annual_benefit` (today's dollars, inflation-adjusted at payout).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SocialSecurityRule {
    pub start_age: u32,
    pub annual_benefit: f64,
}

/// How the supplemental (part-time) income trigger is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupplementalTrigger {
    /// Trips when the pre-income withdrawal rate exceeds the threshold.
    WithdrawalRate,
    /// Trips when the portfolio falls below `threshold` of its
    /// inflation-adjusted peak value.
    PercentOfPeak,
    /// Trips when the portfolio falls below `threshold` of its
    /// inflation-adjusted starting value.
    PercentOfStarting,
}

impl std::str::FromStr for SupplementalTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "withdrawal-rate" => Ok(Self::WithdrawalRate),
            "percent-of-peak" => Ok(Self::PercentOfPeak),
            "percent-of-starting" => Ok(Self::PercentOfStarting),
            other => Err(format!(
                "unknown trigger '{other}' (expected withdrawal-rate, percent-of-peak \
                 or percent-of-starting)"
            )),
        }
    }
}

/// Conditional part-time income. Present on the parameters only when the
/// feature is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupplementalIncomeRule {
    pub trigger: SupplementalTrigger,
    pub threshold: f64,
    /// Annual income in today's dollars, inflation-adjusted when earned.
    pub annual_income: f64,
    /// Last age at which part-time work is available. Only consulted for the
    /// withdrawal-rate trigger; `None` means no age cap.
    pub max_age: Option<u32>,
}

/// Immutable inputs for one simulation experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Portfolio value at retirement (> 0).
    pub starting_portfolio: f64,
    /// Annual spending in today's dollars (>= 0).
    pub annual_spending: f64,
    pub allocation: TargetAllocation,
    /// Number of yearly periods to simulate (> 0).
    pub horizon_years: usize,
    pub retirement_age: u32,
    pub social_security: Option<SocialSecurityRule>,
    pub supplemental_income: Option<SupplementalIncomeRule>,
}

impl SimulationParameters {
    pub fn new(
        starting_portfolio: f64,
        annual_spending: f64,
        allocation: TargetAllocation,
        horizon_years: usize,
        retirement_age: u32,
    ) -> Result<Self, ParamsError> {
        if !(starting_portfolio > 0.0) {
            return Err(ParamsError::NonPositivePortfolio {
                value: starting_portfolio,
            });
        }
        if !(annual_spending >= 0.0) {
            return Err(ParamsError::NegativeSpending {
                value: annual_spending,
            });
        }
        if horizon_years == 0 {
            return Err(ParamsError::ZeroHorizon);
        }

        Ok(Self {
            starting_portfolio,
            annual_spending,
            allocation,
            horizon_years,
            retirement_age,
            social_security: None,
            supplemental_income: None,
        })
    }

    pub fn with_social_security(mut self, rule: SocialSecurityRule) -> Self {
        self.social_security = Some(rule);
        self
    }

    pub fn with_supplemental_income(mut self, rule: SupplementalIncomeRule) -> Self {
        self.supplemental_income = Some(rule);
        self
    }

    /// Age attained at the start of the given period.
    pub fn age_at(&self, period: usize) -> u32 {
        self.retirement_age + period as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_weights_summing_to_one() {
        let alloc = TargetAllocation::new(0.6, 0.3, 0.1).unwrap();
        assert_eq!(alloc.stocks, 0.6);
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let err = TargetAllocation::new(0.6, 0.3, 0.2).unwrap_err();
        assert!(matches!(err, ParamsError::AllocationSum { .. }));
    }

    #[test]
    fn rejects_negative_weight() {
        let err = TargetAllocation::new(1.2, -0.1, -0.1).unwrap_err();
        assert!(matches!(err, ParamsError::NegativeWeight { .. }));
    }

    #[test]
    fn percentages_convert_to_fractions() {
        let alloc = TargetAllocation::from_percentages(60.0, 30.0, 10.0).unwrap();
        assert!((alloc.bonds - 0.3).abs() < 1e-12);
    }

    #[test]
    fn rejects_non_positive_portfolio() {
        let alloc = TargetAllocation::new(0.6, 0.3, 0.1).unwrap();
        let err = SimulationParameters::new(0.0, 50_000.0, alloc, 40, 50).unwrap_err();
        assert_eq!(err, ParamsError::NonPositivePortfolio { value: 0.0 });
    }

    #[test]
    fn rejects_zero_horizon() {
        let alloc = TargetAllocation::new(0.6, 0.3, 0.1).unwrap();
        let err = SimulationParameters::new(750_000.0, 50_000.0, alloc, 0, 50).unwrap_err();
        assert_eq!(err, ParamsError::ZeroHorizon);
    }

    #[test]
    fn trigger_parses_from_kebab_case() {
        assert_eq!(
            "percent-of-peak".parse::<SupplementalTrigger>().unwrap(),
            SupplementalTrigger::PercentOfPeak
        );
        assert!("weekends-only".parse::<SupplementalTrigger>().is_err());
    }

    proptest! {
        #[test]
        fn accepted_allocations_always_sum_to_one(
            stocks in 0.0..1.0f64,
            bonds in 0.0..1.0f64,
        ) {
            let cash = 1.0 - stocks - bonds;
            if let Ok(alloc) = TargetAllocation::new(stocks, bonds, cash) {
                prop_assert!((alloc.stocks + alloc.bonds + alloc.cash - 1.0).abs()
                    <= ALLOCATION_TOLERANCE);
            }
        }

        #[test]
        fn never_accepts_sums_off_by_more_than_tolerance(
            stocks in 0.0..1.0f64,
            bonds in 0.0..1.0f64,
            excess in 0.01..1.0f64,
        ) {
            let cash = 1.0 - stocks - bonds + excess;
            prop_assume!(cash >= 0.0);
            prop_assert!(TargetAllocation::new(stocks, bonds, cash).is_err());
        }
    }
}
