//! Single-path retirement simulator
//!
//! Steps one portfolio through the full horizon, one period at a time:
//! withdrawal sizing (spending, Social Security, the part-time income
//! trigger), proportional withdrawal, return application, inflation
//! compounding, and an unconditional rebalance back to the target weights.
//!
//! A depleted path keeps running with zero balances to the end of the
//! horizon rather than exiting early, so every path yields a fixed-length
//! trajectory that aggregates cleanly across trials.

use rand::Rng;

use super::records::{SimulationOutcome, SimulationRecord};
use super::state::PortfolioState;
use crate::params::{SimulationParameters, SupplementalTrigger};
use crate::returns::{AssetReturnSample, ReturnModel};

/// Per-period state machine over one return path.
pub struct PathSimulator<'a> {
    params: &'a SimulationParameters,
    model: &'a ReturnModel,
}

impl<'a> PathSimulator<'a> {
    pub fn new(params: &'a SimulationParameters, model: &'a ReturnModel) -> Self {
        debug_assert_eq!(params.horizon_years, model.horizon());
        Self { params, model }
    }

    /// Draw one return path from the model and run it.
    pub fn run<R: Rng>(&self, rng: &mut R) -> SimulationOutcome {
        let path = self.model.sample_path(rng);
        self.run_with_returns(&path)
    }

    /// Run against an externally supplied return path (one sample per
    /// period). Used directly by tests with degenerate paths.
    pub fn run_with_returns(&self, path: &[AssetReturnSample]) -> SimulationOutcome {
        debug_assert!(path.len() >= self.params.horizon_years);
        let params = self.params;
        let mut state = PortfolioState::from_params(params);
        let mut records = Vec::with_capacity(params.horizon_years);
        let mut success = true;
        let mut depletion_period = None;

        for (period, sample) in path.iter().enumerate().take(params.horizon_years) {
            let age = params.age_at(period);
            let start_value = state.total();

            let spending_need = params.annual_spending * state.cumulative_inflation;

            let social_security_income = match &params.social_security {
                Some(rule) if age >= rule.start_age => {
                    rule.annual_benefit * state.cumulative_inflation
                }
                _ => 0.0,
            };

            let preliminary_withdrawal = (spending_need - social_security_income).max(0.0);

            let supplemental_income =
                self.supplemental_income(age, start_value, preliminary_withdrawal, &state);

            let net_withdrawal =
                (spending_need - social_security_income - supplemental_income).max(0.0);
            let withdrawal_rate = if start_value > 0.0 {
                net_withdrawal / start_value
            } else {
                0.0
            };

            state.withdraw_proportional(net_withdrawal);

            state.cumulative_inflation *= 1.0 + sample.inflation;
            state.apply_returns(sample);

            state.rebalance(&params.allocation);
            state.update_peak();

            if state.total() <= 0.0 {
                if success {
                    success = false;
                    depletion_period = Some(period);
                }
                state.deplete();
            }

            records.push(SimulationRecord {
                period,
                age,
                start_value,
                end_value: state.total(),
                stocks_value: state.stocks,
                bonds_value: state.bonds,
                cash_value: state.cash,
                spending_need,
                social_security_income,
                supplemental_income,
                net_withdrawal,
                withdrawal_rate,
                inflation_rate: sample.inflation,
            });
        }

        SimulationOutcome {
            records,
            success,
            depletion_period,
        }
    }

    /// Evaluate the part-time income trigger for one period. Returns the
    /// inflation-adjusted income when the trigger trips, 0 otherwise.
    fn supplemental_income(
        &self,
        age: u32,
        current_value: f64,
        preliminary_withdrawal: f64,
        state: &PortfolioState,
    ) -> f64 {
        let Some(rule) = &self.params.supplemental_income else {
            return 0.0;
        };
        if current_value <= 0.0 {
            return 0.0;
        }

        let cumulative_inflation = state.cumulative_inflation;
        let tripped = match rule.trigger {
            SupplementalTrigger::WithdrawalRate => {
                if rule.max_age.is_some_and(|max_age| age > max_age) {
                    return 0.0;
                }
                preliminary_withdrawal / current_value > rule.threshold
            }
            SupplementalTrigger::PercentOfPeak => {
                current_value / (state.peak_real_value * cumulative_inflation) < rule.threshold
            }
            SupplementalTrigger::PercentOfStarting => {
                current_value / (self.params.starting_portfolio * cumulative_inflation)
                    < rule.threshold
            }
        };

        if tripped {
            rule.annual_income * cumulative_inflation
        } else {
            0.0
        }
    }
}
