//! Portfolio state for a single simulation path

use crate::params::{SimulationParameters, TargetAllocation};
use crate::returns::AssetReturnSample;

/// Mutable state of one path, owned exclusively by that path's run.
#[derive(Debug, Clone)]
pub struct PortfolioState {
    /// Dollar balance per asset class.
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,

    /// Compounded price level relative to period 0 (starts at 1.0).
    pub cumulative_inflation: f64,

    /// Highest real (inflation-deflated) total value observed so far.
    /// Monotone non-decreasing; consulted by the percent-of-peak trigger.
    pub peak_real_value: f64,

    /// Set once the total value first reaches zero or below.
    pub depleted: bool,
}

impl PortfolioState {
    /// Initialize balances at the target allocation.
    pub fn from_params(params: &SimulationParameters) -> Self {
        let total = params.starting_portfolio;
        Self {
            stocks: total * params.allocation.stocks,
            bonds: total * params.allocation.bonds,
            cash: total * params.allocation.cash,
            cumulative_inflation: 1.0,
            peak_real_value: total,
            depleted: false,
        }
    }

    pub fn total(&self) -> f64 {
        self.stocks + self.bonds + self.cash
    }

    /// Total value in today's purchasing power.
    pub fn real_value(&self) -> f64 {
        self.total() / self.cumulative_inflation
    }

    /// Take `amount` out proportionally so the allocation mix is preserved.
    /// An amount above the current value drives balances negative; the
    /// engine clamps at period end.
    pub fn withdraw_proportional(&mut self, amount: f64) {
        let current = self.total();
        if current <= 0.0 || amount <= 0.0 {
            return;
        }
        let keep = 1.0 - amount / current;
        self.stocks *= keep;
        self.bonds *= keep;
        self.cash *= keep;
    }

    /// Apply one period's returns to each class independently.
    pub fn apply_returns(&mut self, sample: &AssetReturnSample) {
        self.stocks *= 1.0 + sample.stocks;
        self.bonds *= 1.0 + sample.bonds;
        self.cash *= 1.0 + sample.cash;
    }

    /// Reset every balance to its target share of the current total.
    pub fn rebalance(&mut self, allocation: &TargetAllocation) {
        let total = self.total();
        self.stocks = total * allocation.stocks;
        self.bonds = total * allocation.bonds;
        self.cash = total * allocation.cash;
    }

    /// Raise the real-value peak if the current value exceeds it.
    pub fn update_peak(&mut self) {
        let real = self.real_value();
        if real > self.peak_real_value {
            self.peak_real_value = real;
        }
    }

    /// Zero out every balance and latch the depleted flag.
    pub fn deplete(&mut self) {
        self.stocks = 0.0;
        self.bonds = 0.0;
        self.cash = 0.0;
        self.depleted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TargetAllocation;
    use approx::assert_relative_eq;

    fn params() -> SimulationParameters {
        SimulationParameters::new(
            750_000.0,
            50_000.0,
            TargetAllocation::new(0.6, 0.3, 0.1).unwrap(),
            40,
            50,
        )
        .unwrap()
    }

    #[test]
    fn initializes_at_target_allocation() {
        let state = PortfolioState::from_params(&params());
        assert_relative_eq!(state.stocks, 450_000.0);
        assert_relative_eq!(state.bonds, 225_000.0);
        assert_relative_eq!(state.cash, 75_000.0);
        assert_relative_eq!(state.total(), 750_000.0);
        assert_relative_eq!(state.peak_real_value, 750_000.0);
    }

    #[test]
    fn proportional_withdrawal_preserves_the_mix() {
        let mut state = PortfolioState::from_params(&params());
        state.withdraw_proportional(75_000.0);

        assert_relative_eq!(state.total(), 675_000.0);
        assert_relative_eq!(state.stocks / state.total(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(state.bonds / state.total(), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn oversized_withdrawal_goes_negative_until_clamped() {
        let mut state = PortfolioState::from_params(&params());
        state.withdraw_proportional(1_500_000.0);
        assert!(state.total() < 0.0);
    }

    #[test]
    fn rebalance_restores_target_weights() {
        let mut state = PortfolioState::from_params(&params());
        state.apply_returns(&AssetReturnSample {
            stocks: 0.25,
            bonds: -0.05,
            cash: 0.0,
            inflation: 0.03,
        });
        state.rebalance(&TargetAllocation::new(0.6, 0.3, 0.1).unwrap());

        assert_relative_eq!(state.stocks / state.total(), 0.6, epsilon = 1e-12);
        assert_relative_eq!(state.cash / state.total(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn peak_tracks_real_not_nominal_value() {
        let mut state = PortfolioState::from_params(&params());
        // Nominal growth exactly matching inflation leaves the real peak.
        state.cumulative_inflation = 1.10;
        state.apply_returns(&AssetReturnSample {
            stocks: 0.10,
            bonds: 0.10,
            cash: 0.10,
            inflation: 0.10,
        });
        state.update_peak();
        assert_relative_eq!(state.peak_real_value, 750_000.0, epsilon = 1e-6);
    }
}
