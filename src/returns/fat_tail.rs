//! Fat-tailed (multivariate Student-t) returns
//!
//! Each period draws a zero-mean multivariate-normal innovation with the
//! configured covariance, scales it by `sqrt(df / chi2)` with a fresh
//! chi-squared draw, and adds the mean vector. At equal covariance inputs
//! this produces heavier tails than the normal model; the degrees of
//! freedom stay small so the tails are heavy, but must exceed 2 so the
//! variance stays finite.

use rand::Rng;
use rand_distr::{ChiSquared, Distribution};

use super::correlated::{cholesky, correlated_draw, CorrelatedReturnsConfig, N_SERIES};
use super::AssetReturnSample;
use crate::error::ModelError;

pub const DEFAULT_DEGREES_OF_FREEDOM: f64 = 5.0;

/// Multivariate Student-t return model.
#[derive(Debug, Clone)]
pub struct FatTailModel {
    horizon: usize,
    means: [f64; N_SERIES],
    factor: [[f64; N_SERIES]; N_SERIES],
    degrees_of_freedom: f64,
    chi_squared: ChiSquared<f64>,
}

impl FatTailModel {
    pub fn new(
        config: &CorrelatedReturnsConfig,
        degrees_of_freedom: f64,
        horizon: usize,
    ) -> Result<Self, ModelError> {
        if horizon == 0 {
            return Err(ModelError::ZeroHorizon);
        }
        if degrees_of_freedom <= 2.0 {
            return Err(ModelError::DegreesOfFreedom {
                df: degrees_of_freedom,
            });
        }
        for &vol in &config.volatilities {
            if vol < 0.0 {
                return Err(ModelError::NegativeVolatility { value: vol });
            }
        }

        let chi_squared = ChiSquared::new(degrees_of_freedom)
            .map_err(|_| ModelError::DegreesOfFreedom { df: degrees_of_freedom })?;

        Ok(Self {
            horizon,
            means: config.means,
            factor: cholesky(&config.covariance())?,
            degrees_of_freedom,
            chi_squared,
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.degrees_of_freedom
    }

    pub fn sample_path<R: Rng>(&self, rng: &mut R) -> Vec<AssetReturnSample> {
        (0..self.horizon)
            .map(|_| {
                let innovation = correlated_draw(&self.factor, rng);
                let chi2: f64 = self.chi_squared.sample(rng);
                let scale = (self.degrees_of_freedom / chi2).sqrt();

                AssetReturnSample {
                    stocks: self.means[0] + innovation[0] * scale,
                    bonds: self.means[1] + innovation[1] * scale,
                    cash: self.means[2] + innovation[2] * scale,
                    inflation: self.means[3] + innovation[3] * scale,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rejects_small_degrees_of_freedom() {
        let config = CorrelatedReturnsConfig::default();
        assert!(matches!(
            FatTailModel::new(&config, 2.0, 30),
            Err(ModelError::DegreesOfFreedom { .. })
        ));
    }

    #[test]
    fn rejects_zero_horizon() {
        let config = CorrelatedReturnsConfig::default();
        assert!(matches!(
            FatTailModel::new(&config, DEFAULT_DEGREES_OF_FREEDOM, 0),
            Err(ModelError::ZeroHorizon)
        ));
    }

    #[test]
    fn sample_path_has_horizon_length() {
        let config = CorrelatedReturnsConfig::default();
        let model = FatTailModel::new(&config, DEFAULT_DEGREES_OF_FREEDOM, 25).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        assert_eq!(model.sample_path(&mut rng).len(), 25);
    }

    #[test]
    fn produces_heavier_left_tail_than_normal() {
        use super::super::NormalModel;

        let config = CorrelatedReturnsConfig::default();
        let t_model = FatTailModel::new(&config, 3.0, 1).unwrap();
        let normal = NormalModel::new(&config, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(19);

        let n = 50_000;
        let threshold = config.means[0] - 4.0 * config.volatilities[0];
        let mut t_exceedances = 0usize;
        let mut normal_exceedances = 0usize;
        for _ in 0..n {
            if t_model.sample_path(&mut rng)[0].stocks < threshold {
                t_exceedances += 1;
            }
            if normal.sample_path(&mut rng)[0].stocks < threshold {
                normal_exceedances += 1;
            }
        }

        // A 4-sigma left-tail event is ~3e-5 under the normal but two
        // orders of magnitude more likely under t with df=3.
        assert!(t_exceedances > normal_exceedances);
    }
}
