//! Correlated multivariate normal returns
//!
//! Stocks, bonds, cash and inflation are drawn jointly each period from a
//! fixed mean vector and a covariance matrix built as
//! `cov[i][j] = corr[i][j] * vol[i] * vol[j]`. Sampling goes through the
//! Cholesky factor of the covariance, computed once at construction.
//! Periods are i.i.d.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::AssetReturnSample;
use crate::error::ModelError;

/// Number of jointly modeled series: stocks, bonds, cash, inflation.
pub const N_SERIES: usize = 4;

/// Mean/volatility/correlation inputs shared by the normal and fat-tailed
/// models. Order everywhere is stocks, bonds, cash, inflation.
#[derive(Debug, Clone)]
pub struct CorrelatedReturnsConfig {
    /// Expected nominal return (or inflation rate) per series.
    pub means: [f64; N_SERIES],
    /// Standard deviation per series.
    pub volatilities: [f64; N_SERIES],
    pub correlations: [[f64; N_SERIES]; N_SERIES],
}

impl Default for CorrelatedReturnsConfig {
    fn default() -> Self {
        Self {
            means: [0.10, 0.04, 0.025, 0.025],
            volatilities: [0.18, 0.06, 0.005, 0.025],
            correlations: [
                [1.0, -0.1, 0.0, 0.2],
                [-0.1, 1.0, 0.0, -0.3],
                [0.0, 0.0, 1.0, 0.9],
                [0.2, -0.3, 0.9, 1.0],
            ],
        }
    }
}

impl CorrelatedReturnsConfig {
    /// Covariance matrix implied by the volatilities and correlations.
    pub fn covariance(&self) -> [[f64; N_SERIES]; N_SERIES] {
        let mut cov = [[0.0; N_SERIES]; N_SERIES];
        for i in 0..N_SERIES {
            for j in 0..N_SERIES {
                cov[i][j] = self.correlations[i][j] * self.volatilities[i] * self.volatilities[j];
            }
        }
        cov
    }

    fn validate(&self) -> Result<(), ModelError> {
        for &vol in &self.volatilities {
            if vol < 0.0 {
                return Err(ModelError::NegativeVolatility { value: vol });
            }
        }
        Ok(())
    }
}

/// Lower-triangular Cholesky factor of a covariance matrix. Rejects inputs
/// that are not positive definite.
pub(super) fn cholesky(
    cov: &[[f64; N_SERIES]; N_SERIES],
) -> Result<[[f64; N_SERIES]; N_SERIES], ModelError> {
    let mut l = [[0.0; N_SERIES]; N_SERIES];

    for i in 0..N_SERIES {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i][k] * l[j][k];
            }

            if i == j {
                let diag = cov[i][i] - sum;
                if diag <= 0.0 {
                    return Err(ModelError::NotPositiveDefinite);
                }
                l[i][j] = diag.sqrt();
            } else {
                l[i][j] = (cov[i][j] - sum) / l[j][j];
            }
        }
    }

    Ok(l)
}

/// One zero-mean draw with the covariance encoded in `factor`.
pub(super) fn correlated_draw<R: Rng>(factor: &[[f64; N_SERIES]; N_SERIES], rng: &mut R) -> [f64; N_SERIES] {
    let mut z = [0.0; N_SERIES];
    for slot in &mut z {
        *slot = StandardNormal.sample(rng);
    }

    let mut out = [0.0; N_SERIES];
    for i in 0..N_SERIES {
        for j in 0..=i {
            out[i] += factor[i][j] * z[j];
        }
    }
    out
}

/// Correlated multivariate normal return model.
#[derive(Debug, Clone)]
pub struct NormalModel {
    horizon: usize,
    means: [f64; N_SERIES],
    factor: [[f64; N_SERIES]; N_SERIES],
}

impl NormalModel {
    pub fn new(config: &CorrelatedReturnsConfig, horizon: usize) -> Result<Self, ModelError> {
        if horizon == 0 {
            return Err(ModelError::ZeroHorizon);
        }
        config.validate()?;

        Ok(Self {
            horizon,
            means: config.means,
            factor: cholesky(&config.covariance())?,
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn sample_path<R: Rng>(&self, rng: &mut R) -> Vec<AssetReturnSample> {
        (0..self.horizon)
            .map(|_| {
                let draw = correlated_draw(&self.factor, rng);
                AssetReturnSample {
                    stocks: self.means[0] + draw[0],
                    bonds: self.means[1] + draw[1],
                    cash: self.means[2] + draw[2],
                    inflation: self.means[3] + draw[3],
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_config_is_positive_definite() {
        assert!(NormalModel::new(&CorrelatedReturnsConfig::default(), 30).is_ok());
    }

    #[test]
    fn rejects_zero_horizon() {
        let err = NormalModel::new(&CorrelatedReturnsConfig::default(), 0).unwrap_err();
        assert!(matches!(err, ModelError::ZeroHorizon));
    }

    #[test]
    fn rejects_non_positive_definite_correlations() {
        let config = CorrelatedReturnsConfig {
            correlations: [
                [1.0, 1.5, 0.0, 0.0],
                [1.5, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
            ..Default::default()
        };
        assert!(matches!(
            NormalModel::new(&config, 30),
            Err(ModelError::NotPositiveDefinite)
        ));
    }

    #[test]
    fn rejects_negative_volatility() {
        let config = CorrelatedReturnsConfig {
            volatilities: [0.18, -0.06, 0.005, 0.025],
            ..Default::default()
        };
        assert!(matches!(
            NormalModel::new(&config, 30),
            Err(ModelError::NegativeVolatility { .. })
        ));
    }

    #[test]
    fn sample_path_has_horizon_length() {
        let model = NormalModel::new(&CorrelatedReturnsConfig::default(), 40).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(model.sample_path(&mut rng).len(), 40);
    }

    #[test]
    fn cholesky_factor_reproduces_covariance() {
        let config = CorrelatedReturnsConfig::default();
        let cov = config.covariance();
        let l = cholesky(&cov).unwrap();

        for i in 0..N_SERIES {
            for j in 0..N_SERIES {
                let mut rebuilt = 0.0;
                for k in 0..N_SERIES {
                    rebuilt += l[i][k] * l[j][k];
                }
                assert_relative_eq!(rebuilt, cov[i][j], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn sample_mean_approaches_configured_mean() {
        let config = CorrelatedReturnsConfig::default();
        let model = NormalModel::new(&config, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            sum += model.sample_path(&mut rng)[0].stocks;
        }

        // Standard error is 0.18 / sqrt(20_000) ~ 0.0013; 0.01 is a wide net.
        assert!((sum / n as f64 - config.means[0]).abs() < 0.01);
    }
}
