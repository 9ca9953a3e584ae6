//! Return-generating models
//!
//! Four interchangeable generators share one contract: configured once
//! (including the horizon length), a model produces a full horizon of
//! per-period asset returns on demand. Models are selected by
//! [`ModelKind`] and carried as one tagged [`ReturnModel`] value; they hold
//! no mutable state, so a single instance can be shared by all parallel
//! trials while each trial supplies its own RNG.

mod bootstrap;
mod correlated;
mod fat_tail;
mod mean_reversion;

pub use bootstrap::BootstrapModel;
pub use correlated::{CorrelatedReturnsConfig, NormalModel};
pub use fat_tail::{FatTailModel, DEFAULT_DEGREES_OF_FREEDOM};
pub use mean_reversion::{Ar1Params, MeanReversionConfig, MeanReversionModel};

use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::historical::HistoricalSeries;

/// One period's realized returns, all as simple fractional values
/// (0.07 = +7%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetReturnSample {
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
    pub inflation: f64,
}

/// Discriminator used to select a return model at run setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Normal,
    FatTailed,
    MeanReverting,
    HistoricalBootstrap,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Normal => "normal",
            ModelKind::FatTailed => "fat-tailed",
            ModelKind::MeanReverting => "mean-reverting",
            ModelKind::HistoricalBootstrap => "historical-bootstrap",
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "fat-tailed" => Ok(Self::FatTailed),
            "mean-reverting" => Ok(Self::MeanReverting),
            "historical-bootstrap" => Ok(Self::HistoricalBootstrap),
            other => Err(format!(
                "unknown return model '{other}' (expected normal, fat-tailed, \
                 mean-reverting or historical-bootstrap)"
            )),
        }
    }
}

/// A configured return generator, one variant per [`ModelKind`].
#[derive(Debug, Clone)]
pub enum ReturnModel {
    Normal(NormalModel),
    FatTailed(FatTailModel),
    MeanReverting(MeanReversionModel),
    HistoricalBootstrap(BootstrapModel),
}

impl ReturnModel {
    /// Build a model of the given kind with its default configuration.
    ///
    /// The bootstrap variant needs a loaded historical series; passing
    /// `None` for it reports the source as unavailable.
    pub fn with_defaults(
        kind: ModelKind,
        horizon: usize,
        history: Option<Arc<HistoricalSeries>>,
    ) -> Result<Self, ModelError> {
        match kind {
            ModelKind::Normal => Ok(Self::Normal(NormalModel::new(
                &CorrelatedReturnsConfig::default(),
                horizon,
            )?)),
            ModelKind::FatTailed => Ok(Self::FatTailed(FatTailModel::new(
                &CorrelatedReturnsConfig::default(),
                DEFAULT_DEGREES_OF_FREEDOM,
                horizon,
            )?)),
            ModelKind::MeanReverting => Ok(Self::MeanReverting(MeanReversionModel::new(
                &MeanReversionConfig::default(),
                horizon,
            )?)),
            ModelKind::HistoricalBootstrap => {
                let history = history.ok_or(ModelError::EmptyHistory)?;
                Ok(Self::HistoricalBootstrap(BootstrapModel::new(
                    history, horizon,
                )?))
            }
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ReturnModel::Normal(_) => ModelKind::Normal,
            ReturnModel::FatTailed(_) => ModelKind::FatTailed,
            ReturnModel::MeanReverting(_) => ModelKind::MeanReverting,
            ReturnModel::HistoricalBootstrap(_) => ModelKind::HistoricalBootstrap,
        }
    }

    /// Number of periods every sampled path contains.
    pub fn horizon(&self) -> usize {
        match self {
            ReturnModel::Normal(m) => m.horizon(),
            ReturnModel::FatTailed(m) => m.horizon(),
            ReturnModel::MeanReverting(m) => m.horizon(),
            ReturnModel::HistoricalBootstrap(m) => m.horizon(),
        }
    }

    /// Draw one full horizon of per-period returns.
    pub fn sample_path<R: Rng>(&self, rng: &mut R) -> Vec<AssetReturnSample> {
        match self {
            ReturnModel::Normal(m) => m.sample_path(rng),
            ReturnModel::FatTailed(m) => m.sample_path(rng),
            ReturnModel::MeanReverting(m) => m.sample_path(rng),
            ReturnModel::HistoricalBootstrap(m) => m.sample_path(rng),
        }
    }
}
