//! Historical bootstrap returns
//!
//! Samples whole years from the historical table independently and with
//! replacement, keeping stock/bond/cash/inflation values of a year paired
//! so the empirical joint distribution — including any fat tails or skew —
//! survives without a parametric assumption. Inflation comes from the
//! sampled year's CPI-derived rate rather than a separate model. Because
//! sampling is with replacement, the horizon may exceed the table length.

use std::sync::Arc;

use rand::Rng;

use super::AssetReturnSample;
use crate::error::ModelError;
use crate::historical::HistoricalSeries;

/// Bootstrap return model over a shared, read-only historical snapshot.
#[derive(Debug, Clone)]
pub struct BootstrapModel {
    horizon: usize,
    history: Arc<HistoricalSeries>,
}

impl BootstrapModel {
    pub fn new(history: Arc<HistoricalSeries>, horizon: usize) -> Result<Self, ModelError> {
        if horizon == 0 {
            return Err(ModelError::ZeroHorizon);
        }
        if history.is_empty() {
            return Err(ModelError::EmptyHistory);
        }

        Ok(Self { horizon, history })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn sample_path<R: Rng>(&self, rng: &mut R) -> Vec<AssetReturnSample> {
        let rows = self.history.rows();

        (0..self.horizon)
            .map(|_| {
                let row = &rows[rng.random_range(0..rows.len())];
                AssetReturnSample {
                    stocks: row.stocks,
                    bonds: row.bonds,
                    cash: row.cash,
                    inflation: row.inflation,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::historical::YearlyReturns;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tiny_history() -> Arc<HistoricalSeries> {
        Arc::new(HistoricalSeries::from_rows(vec![
            YearlyReturns { year: 1950, stocks: 0.3081, bonds: 0.0043, cash: 0.0120, inflation: 0.0126 },
            YearlyReturns { year: 1951, stocks: 0.2368, bonds: -0.0030, cash: 0.0152, inflation: 0.0788 },
            YearlyReturns { year: 1952, stocks: 0.1815, bonds: 0.0227, cash: 0.0172, inflation: 0.0192 },
        ]))
    }

    #[test]
    fn rejects_empty_history() {
        let empty = Arc::new(HistoricalSeries::from_rows(Vec::new()));
        assert!(matches!(
            BootstrapModel::new(empty, 30),
            Err(ModelError::EmptyHistory)
        ));
    }

    #[test]
    fn rejects_zero_horizon() {
        assert!(matches!(
            BootstrapModel::new(tiny_history(), 0),
            Err(ModelError::ZeroHorizon)
        ));
    }

    #[test]
    fn horizon_may_exceed_table_length() {
        let history = tiny_history();
        let model = BootstrapModel::new(Arc::clone(&history), 30).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        let path = model.sample_path(&mut rng);
        assert_eq!(path.len(), 30);

        // Every sampled period is a whole historical row, values paired.
        for sample in &path {
            assert!(history.rows().iter().any(|row| {
                row.stocks == sample.stocks
                    && row.bonds == sample.bonds
                    && row.cash == sample.cash
                    && row.inflation == sample.inflation
            }));
        }
    }
}
