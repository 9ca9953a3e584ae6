//! Monte Carlo orchestrator
//!
//! Runs K statistically independent path simulations and folds them into
//! cross-trial aggregate statistics. Trials are embarrassingly parallel:
//! every worker reads the same immutable parameters and return model and
//! owns its portfolio state and record sequence exclusively, so the fan-out
//! needs no locks. Each trial's RNG is derived from a base seed, which
//! makes a whole run reproducible from a single number.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::ParamsError;
use crate::params::SimulationParameters;
use crate::returns::ReturnModel;
use crate::simulation::{PathSimulator, SimulationOutcome};

const PROGRESS_INTERVAL: usize = 1_000;

/// End-of-period value percentiles across trials, one row per period.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PercentileBand {
    pub period: usize,
    pub age: u32,
    pub p10: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p90: f64,
}

/// Distribution of a scalar across trials.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DistributionSummary {
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
}

impl DistributionSummary {
    fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            median: percentile(sorted, 50.0),
            mean: mean(sorted),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            p10: percentile(sorted, 10.0),
            p25: percentile(sorted, 25.0),
            p75: percentile(sorted, 75.0),
            p90: percentile(sorted, 90.0),
        }
    }
}

/// Incidence of part-time work across trials.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SupplementalIncomeStats {
    /// Share of trials with at least one period of supplemental income.
    pub probability_any: f64,
    pub median_years: f64,
    pub mean_years: f64,
    pub p90_years: f64,
    pub max_years: usize,
}

/// Depletion ages over the failed subset of trials.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DepletionStats {
    pub count: usize,
    pub median_age: f64,
    pub mean_age: f64,
    pub earliest_age: u32,
    pub latest_age: u32,
}

/// Cross-trial aggregate results, recomputed from scratch each run.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStatistics {
    pub trials: usize,
    pub success_rate: f64,
    pub failure_rate: f64,
    pub final_value: DistributionSummary,
    /// One band per period of the horizon.
    pub value_over_time: Vec<PercentileBand>,
    pub supplemental_income: SupplementalIncomeStats,
    /// Absent when no trial failed — never coerced to zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depletion: Option<DepletionStats>,
}

/// Orchestrates K independent trials of one experiment.
#[derive(Debug)]
pub struct MonteCarlo {
    params: SimulationParameters,
    model: Arc<ReturnModel>,
    trials: usize,
    seed: u64,
}

impl MonteCarlo {
    /// Build an orchestrator with a fresh entropy-derived base seed.
    pub fn new(
        params: SimulationParameters,
        model: ReturnModel,
        trials: usize,
    ) -> Result<Self, ParamsError> {
        if trials == 0 {
            return Err(ParamsError::ZeroTrials);
        }

        Ok(Self {
            params,
            model: Arc::new(model),
            trials,
            seed: rand::rng().random(),
        })
    }

    /// Fix the base seed for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Run all trials and aggregate, discarding the raw trajectories.
    pub fn run(&self) -> AggregateStatistics {
        let outcomes = self.run_trials();
        self.aggregate(&outcomes)
    }

    /// Run all trials in parallel and keep the per-trial outcomes (needed
    /// when raw trajectories feed charting).
    pub fn run_trials(&self) -> Vec<SimulationOutcome> {
        log::info!(
            "running {} trials, {} model, {}y horizon",
            self.trials,
            self.model.kind(),
            self.params.horizon_years
        );

        let completed = AtomicUsize::new(0);
        (0..self.trials)
            .into_par_iter()
            .map(|trial| {
                let mut rng = StdRng::seed_from_u64(derive_seed(self.seed, trial as u64));
                let outcome = PathSimulator::new(&self.params, &self.model).run(&mut rng);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % PROGRESS_INTERVAL == 0 {
                    log::info!("completed {done}/{} trials", self.trials);
                }
                outcome
            })
            .collect()
    }

    /// Fold per-trial outcomes into aggregate statistics. Expects at least
    /// one outcome, each spanning the configured horizon.
    pub fn aggregate(&self, outcomes: &[SimulationOutcome]) -> AggregateStatistics {
        let trials = outcomes.len();
        debug_assert!(trials > 0);

        let failures = outcomes.iter().filter(|o| !o.success).count();
        let success_rate = (trials - failures) as f64 / trials as f64;

        let mut final_values: Vec<f64> = outcomes.iter().map(|o| o.final_value()).collect();
        final_values.sort_unstable_by(f64::total_cmp);

        // Percentiles are taken per period across trials, not per trial.
        let mut value_over_time = Vec::with_capacity(self.params.horizon_years);
        for period in 0..self.params.horizon_years {
            let mut values: Vec<f64> = outcomes
                .iter()
                .map(|o| o.records[period].end_value)
                .collect();
            values.sort_unstable_by(f64::total_cmp);

            value_over_time.push(PercentileBand {
                period,
                age: self.params.age_at(period),
                p10: percentile(&values, 10.0),
                p25: percentile(&values, 25.0),
                median: percentile(&values, 50.0),
                p75: percentile(&values, 75.0),
                p90: percentile(&values, 90.0),
            });
        }

        let mut years_working: Vec<f64> = outcomes
            .iter()
            .map(|o| o.supplemental_income_years() as f64)
            .collect();
        years_working.sort_unstable_by(f64::total_cmp);
        let any_work = years_working.iter().filter(|&&y| y > 0.0).count();

        let supplemental_income = SupplementalIncomeStats {
            probability_any: any_work as f64 / trials as f64,
            median_years: percentile(&years_working, 50.0),
            mean_years: mean(&years_working),
            p90_years: percentile(&years_working, 90.0),
            max_years: years_working[years_working.len() - 1] as usize,
        };

        let depletion_ages: Vec<u32> = outcomes
            .iter()
            .filter_map(|o| o.depletion_age())
            .collect();
        let depletion = if depletion_ages.is_empty() {
            None
        } else {
            let mut ages: Vec<f64> = depletion_ages.iter().map(|&a| a as f64).collect();
            ages.sort_unstable_by(f64::total_cmp);
            Some(DepletionStats {
                count: depletion_ages.len(),
                median_age: percentile(&ages, 50.0),
                mean_age: mean(&ages),
                earliest_age: *depletion_ages.iter().min().unwrap_or(&0),
                latest_age: *depletion_ages.iter().max().unwrap_or(&0),
            })
        };

        AggregateStatistics {
            trials,
            success_rate,
            failure_rate: 1.0 - success_rate,
            final_value: DistributionSummary::from_sorted(&final_values),
            value_over_time,
            supplemental_income,
            depletion,
        }
    }
}

/// Per-trial seed derivation: splitmix64 of the base seed offset by the
/// trial index, so trial streams are decorrelated but reproducible.
fn derive_seed(base_seed: u64, trial: u64) -> u64 {
    let mut z = base_seed.wrapping_add((trial + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Percentile with linear interpolation between closest ranks; expects a
/// sorted, non-empty slice. Matching interpolation keeps band edges
/// consistent across all statistics in this module.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TargetAllocation;
    use crate::returns::{CorrelatedReturnsConfig, NormalModel};
    use crate::simulation::SimulationRecord;
    use approx::assert_relative_eq;

    fn params(
        starting: f64,
        spending: f64,
        horizon: usize,
    ) -> SimulationParameters {
        SimulationParameters::new(
            starting,
            spending,
            TargetAllocation::new(0.6, 0.3, 0.1).unwrap(),
            horizon,
            50,
        )
        .unwrap()
    }

    fn normal_model(horizon: usize) -> ReturnModel {
        ReturnModel::Normal(
            NormalModel::new(&CorrelatedReturnsConfig::default(), horizon).unwrap(),
        )
    }

    fn synthetic_outcome(success: bool, horizon: usize, supplemental_years: usize) -> SimulationOutcome {
        let records = (0..horizon)
            .map(|period| SimulationRecord {
                period,
                age: 50 + period as u32,
                start_value: 100.0,
                end_value: if success { 100.0 } else { 0.0 },
                stocks_value: 60.0,
                bonds_value: 30.0,
                cash_value: 10.0,
                spending_need: 4.0,
                social_security_income: 0.0,
                supplemental_income: if period < supplemental_years { 1.0 } else { 0.0 },
                net_withdrawal: 4.0,
                withdrawal_rate: 0.04,
                inflation_rate: 0.02,
            })
            .collect();

        SimulationOutcome {
            records,
            success,
            depletion_period: if success { None } else { Some(0) },
        }
    }

    #[test]
    fn rejects_zero_trials() {
        let err = MonteCarlo::new(params(750_000.0, 50_000.0, 10), normal_model(10), 0)
            .unwrap_err();
        assert_eq!(err, ParamsError::ZeroTrials);
    }

    #[test]
    fn success_rate_is_an_exact_trial_fraction() {
        let mc = MonteCarlo::new(params(750_000.0, 50_000.0, 5), normal_model(5), 4).unwrap();
        let outcomes = vec![
            synthetic_outcome(true, 5, 0),
            synthetic_outcome(true, 5, 2),
            synthetic_outcome(true, 5, 0),
            synthetic_outcome(false, 5, 0),
        ];

        let stats = mc.aggregate(&outcomes);
        assert_eq!(stats.success_rate, 0.75);
        assert_eq!(stats.failure_rate, 0.25);
        assert_eq!(stats.trials, 4);
    }

    #[test]
    fn supplemental_income_incidence_counts_trials_with_any_work() {
        let mc = MonteCarlo::new(params(750_000.0, 50_000.0, 5), normal_model(5), 4).unwrap();
        let outcomes = vec![
            synthetic_outcome(true, 5, 0),
            synthetic_outcome(true, 5, 3),
            synthetic_outcome(true, 5, 1),
            synthetic_outcome(true, 5, 0),
        ];

        let stats = mc.aggregate(&outcomes);
        assert_eq!(stats.supplemental_income.probability_any, 0.5);
        assert_eq!(stats.supplemental_income.max_years, 3);
        assert_relative_eq!(stats.supplemental_income.mean_years, 1.0);
    }

    #[test]
    fn depletion_stats_absent_when_every_trial_succeeds() {
        let mc = MonteCarlo::new(params(750_000.0, 0.0, 10), normal_model(10), 50)
            .unwrap()
            .with_seed(1);
        let stats = mc.run();

        assert_eq!(stats.success_rate, 1.0);
        assert!(stats.depletion.is_none());
    }

    #[test]
    fn depletion_stats_cover_only_failed_trials() {
        // Spending dwarfs the portfolio: every trial fails in period 0.
        let mc = MonteCarlo::new(params(100.0, 1_000_000.0, 10), normal_model(10), 25)
            .unwrap()
            .with_seed(2);
        let stats = mc.run();

        assert_eq!(stats.success_rate, 0.0);
        let depletion = stats.depletion.unwrap();
        assert_eq!(depletion.count, 25);
        assert_eq!(depletion.earliest_age, 50);
        assert_eq!(depletion.latest_age, 50);
        assert_relative_eq!(depletion.median_age, 50.0);
    }

    #[test]
    fn percentile_bands_are_monotone_every_period() {
        let mc = MonteCarlo::new(params(750_000.0, 50_000.0, 15), normal_model(15), 300)
            .unwrap()
            .with_seed(3);
        let stats = mc.run();

        assert_eq!(stats.value_over_time.len(), 15);
        for band in &stats.value_over_time {
            assert!(band.p10 <= band.p25);
            assert!(band.p25 <= band.median);
            assert!(band.median <= band.p75);
            assert!(band.p75 <= band.p90);
        }
    }

    #[test]
    fn identical_seeds_reproduce_identical_results() {
        let build = || {
            MonteCarlo::new(params(750_000.0, 50_000.0, 10), normal_model(10), 100)
                .unwrap()
                .with_seed(99)
        };
        let a = build().run();
        let b = build().run();

        assert_eq!(a.success_rate, b.success_rate);
        assert_eq!(a.final_value.median, b.final_value.median);
        assert_eq!(a.value_over_time[9].p10, b.value_over_time[9].p10);
    }

    #[test]
    fn trial_seeds_differ_across_trials() {
        let a = derive_seed(42, 0);
        let b = derive_seed(42, 1);
        let c = derive_seed(43, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&values, 25.0), 1.75);
        assert_relative_eq!(percentile(&values, 50.0), 2.5);
        assert_relative_eq!(percentile(&values, 0.0), 1.0);
        assert_relative_eq!(percentile(&values, 100.0), 4.0);
        assert_relative_eq!(percentile(&[7.0], 90.0), 7.0);
    }
}
