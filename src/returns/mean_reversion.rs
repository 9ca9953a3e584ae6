//! Mean-reverting AR(1) returns
//!
//! Each series follows `r[t] = mu + phi * (r[t-1] - mu) + eps`, with
//! `eps ~ Normal(0, sigma)` and the innovation deviation rescaled as
//! `sigma = historical_std * sqrt(1 - phi^2)` so the unconditional variance
//! matches the historical target. The first period is seeded at the
//! long-run mean. Series are generated independently; there is no
//! cross-asset correlation in this variant.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use super::AssetReturnSample;
use crate::error::ModelError;

/// AR(1) inputs for one series.
#[derive(Debug, Clone, Copy)]
pub struct Ar1Params {
    /// Long-run mean return.
    pub mean: f64,
    /// Autoregression coefficient; negative values mean-revert, positive
    /// values trend. Must satisfy |phi| < 1.
    pub phi: f64,
    /// Unconditional (historical) standard deviation to match.
    pub historical_std: f64,
}

/// Per-series AR(1) inputs for all four modeled series.
#[derive(Debug, Clone)]
pub struct MeanReversionConfig {
    pub stocks: Ar1Params,
    pub bonds: Ar1Params,
    pub cash: Ar1Params,
    pub inflation: Ar1Params,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            stocks: Ar1Params { mean: 0.10, phi: -0.3, historical_std: 0.20 },
            bonds: Ar1Params { mean: 0.05, phi: -0.3, historical_std: 0.06 },
            cash: Ar1Params { mean: 0.025, phi: -0.3, historical_std: 0.005 },
            inflation: Ar1Params { mean: 0.025, phi: -0.3, historical_std: 0.025 },
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Ar1Series {
    mean: f64,
    phi: f64,
    /// Innovation deviation, already rescaled for the unconditional target.
    sigma: f64,
}

impl Ar1Series {
    fn new(params: Ar1Params) -> Result<Self, ModelError> {
        if params.phi.abs() >= 1.0 {
            return Err(ModelError::Autoregression { phi: params.phi });
        }
        if params.historical_std < 0.0 {
            return Err(ModelError::NegativeVolatility {
                value: params.historical_std,
            });
        }

        Ok(Self {
            mean: params.mean,
            phi: params.phi,
            sigma: params.historical_std * (1.0 - params.phi * params.phi).sqrt(),
        })
    }

    fn generate<R: Rng>(&self, horizon: usize, rng: &mut R) -> Vec<f64> {
        let mut path = Vec::with_capacity(horizon);
        path.push(self.mean);

        for t in 1..horizon {
            let z: f64 = StandardNormal.sample(rng);
            let eps = self.sigma * z;
            path.push(self.mean + self.phi * (path[t - 1] - self.mean) + eps);
        }

        path
    }
}

/// Independent AR(1) return model for stocks, bonds, cash and inflation.
#[derive(Debug, Clone)]
pub struct MeanReversionModel {
    horizon: usize,
    stocks: Ar1Series,
    bonds: Ar1Series,
    cash: Ar1Series,
    inflation: Ar1Series,
}

impl MeanReversionModel {
    pub fn new(config: &MeanReversionConfig, horizon: usize) -> Result<Self, ModelError> {
        if horizon == 0 {
            return Err(ModelError::ZeroHorizon);
        }

        Ok(Self {
            horizon,
            stocks: Ar1Series::new(config.stocks)?,
            bonds: Ar1Series::new(config.bonds)?,
            cash: Ar1Series::new(config.cash)?,
            inflation: Ar1Series::new(config.inflation)?,
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn sample_path<R: Rng>(&self, rng: &mut R) -> Vec<AssetReturnSample> {
        let stocks = self.stocks.generate(self.horizon, rng);
        let bonds = self.bonds.generate(self.horizon, rng);
        let cash = self.cash.generate(self.horizon, rng);
        let inflation = self.inflation.generate(self.horizon, rng);

        (0..self.horizon)
            .map(|t| AssetReturnSample {
                stocks: stocks[t],
                bonds: bonds[t],
                cash: cash[t],
                inflation: inflation[t],
            })
            .collect()
    }
}
