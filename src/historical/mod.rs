//! Historical return series: load once, share read-only
//!
//! The series backs the bootstrap return model and the reporting queries:
//! filtered yearly rows, the available year range, and summary statistics
//! including the full pairwise correlation matrix. The dataset is loaded
//! once before any trial runs and is never mutated afterwards, so parallel
//! workers can read a shared snapshot without locks.

pub mod loader;

pub use loader::DEFAULT_DATA_PATH;

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::HistoricalError;

/// Asset classes exposed by the series, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Stocks,
    Bonds,
    Cash,
    Inflation,
}

impl AssetClass {
    /// All classes in the order used by [`CorrelationMatrix`] indices.
    pub const ALL: [AssetClass; 4] = [
        AssetClass::Stocks,
        AssetClass::Bonds,
        AssetClass::Cash,
        AssetClass::Inflation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::Stocks => "stocks",
            AssetClass::Bonds => "bonds",
            AssetClass::Cash => "cash",
            AssetClass::Inflation => "inflation",
        }
    }

    fn index(self) -> usize {
        match self {
            AssetClass::Stocks => 0,
            AssetClass::Bonds => 1,
            AssetClass::Cash => 2,
            AssetClass::Inflation => 3,
        }
    }
}

/// One year of realized returns, all as simple fractional values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyReturns {
    pub year: i32,
    pub stocks: f64,
    pub bonds: f64,
    pub cash: f64,
    pub inflation: f64,
}

impl YearlyReturns {
    fn value(&self, asset: AssetClass) -> f64 {
        match asset {
            AssetClass::Stocks => self.stocks,
            AssetClass::Bonds => self.bonds,
            AssetClass::Cash => self.cash,
            AssetClass::Inflation => self.inflation,
        }
    }
}

/// A row of a filtered query; assets outside the requested subset are absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilteredReturns {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stocks: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflation: Option<f64>,
}

/// Result of a filtered returns query.
#[derive(Debug, Clone, Serialize)]
pub struct ReturnsQuery {
    pub rows: Vec<FilteredReturns>,
    pub count: usize,
    /// First and last year actually present in the result.
    pub start_year: i32,
    pub end_year: i32,
}

/// Available span of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min_year: i32,
    pub max_year: i32,
    pub total_years: usize,
}

/// Summary statistics for one asset class over the full history.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AssetSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

/// Full pairwise Pearson correlations, indexed in [`AssetClass::ALL`] order.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix(pub [[f64; 4]; 4]);

impl CorrelationMatrix {
    pub fn between(&self, a: AssetClass, b: AssetClass) -> f64 {
        self.0[a.index()][b.index()]
    }
}

/// Summary statistics over the full available history.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStatistics {
    pub stocks: AssetSummary,
    pub bonds: AssetSummary,
    pub cash: AssetSummary,
    pub inflation: AssetSummary,
    pub correlations: CorrelationMatrix,
    pub first_year: i32,
    pub last_year: i32,
    pub n_years: usize,
}

/// Cleaned, chronologically ordered historical return table.
#[derive(Debug, Clone)]
pub struct HistoricalSeries {
    rows: Vec<YearlyReturns>,
}

impl HistoricalSeries {
    /// Load from the bundled CSV location.
    pub fn from_default_csv() -> Result<Self, HistoricalError> {
        Self::from_csv_path(DEFAULT_DATA_PATH)
    }

    /// Load from a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, HistoricalError> {
        Ok(Self {
            rows: loader::load_returns(path)?,
        })
    }

    /// Load from any reader (e.g. an in-memory buffer).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, HistoricalError> {
        Ok(Self {
            rows: loader::load_returns_from_reader(reader)?,
        })
    }

    /// Build directly from pre-computed rows, sorted by year.
    pub fn from_rows(mut rows: Vec<YearlyReturns>) -> Self {
        rows.sort_by_key(|row| row.year);
        Self { rows }
    }

    pub fn rows(&self) -> &[YearlyReturns] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Yearly rows, optionally filtered by an inclusive year range and an
    /// asset subset. A range matching no rows is an error, never an empty
    /// result.
    pub fn returns(
        &self,
        start_year: Option<i32>,
        end_year: Option<i32>,
        assets: Option<&[AssetClass]>,
    ) -> Result<ReturnsQuery, HistoricalError> {
        let range = self.year_range()?;

        let include = |asset: AssetClass| assets.is_none_or(|subset| subset.contains(&asset));
        let rows: Vec<FilteredReturns> = self
            .rows
            .iter()
            .filter(|row| {
                start_year.is_none_or(|start| row.year >= start)
                    && end_year.is_none_or(|end| row.year <= end)
            })
            .map(|row| FilteredReturns {
                year: row.year,
                stocks: include(AssetClass::Stocks).then_some(row.stocks),
                bonds: include(AssetClass::Bonds).then_some(row.bonds),
                cash: include(AssetClass::Cash).then_some(row.cash),
                inflation: include(AssetClass::Inflation).then_some(row.inflation),
            })
            .collect();

        let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
            return Err(HistoricalError::EmptyRange {
                start: start_year.unwrap_or(range.min_year),
                end: end_year.unwrap_or(range.max_year),
            });
        };

        Ok(ReturnsQuery {
            start_year: first.year,
            end_year: last.year,
            count: rows.len(),
            rows,
        })
    }

    /// Span of years with data.
    pub fn year_range(&self) -> Result<YearRange, HistoricalError> {
        let (Some(first), Some(last)) = (self.rows.first(), self.rows.last()) else {
            return Err(HistoricalError::Empty);
        };

        Ok(YearRange {
            min_year: first.year,
            max_year: last.year,
            total_years: self.rows.len(),
        })
    }

    /// Per-asset summary statistics and the full correlation matrix over
    /// the entire available history.
    pub fn summary(&self) -> Result<SummaryStatistics, HistoricalError> {
        let range = self.year_range()?;

        let series: Vec<Vec<f64>> = AssetClass::ALL
            .iter()
            .map(|&asset| self.rows.iter().map(|row| row.value(asset)).collect())
            .collect();

        let mut correlations = [[0.0; 4]; 4];
        for i in 0..4 {
            correlations[i][i] = 1.0;
            for j in 0..i {
                let rho = pearson(&series[i], &series[j]);
                correlations[i][j] = rho;
                correlations[j][i] = rho;
            }
        }

        Ok(SummaryStatistics {
            stocks: asset_summary(&series[0]),
            bonds: asset_summary(&series[1]),
            cash: asset_summary(&series[2]),
            inflation: asset_summary(&series[3]),
            correlations: CorrelationMatrix(correlations),
            first_year: range.min_year,
            last_year: range.max_year,
            n_years: range.total_years,
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn asset_summary(values: &[f64]) -> AssetSummary {
    AssetSummary {
        mean: mean(values),
        std_dev: std_dev(values),
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        median: median(values),
    }
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let (ma, mb) = (mean(a), mean(b));
    let cov: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum();
    let var_a: f64 = a.iter().map(|x| (x - ma).powi(2)).sum();
    let var_b: f64 = b.iter().map(|y| (y - mb).powi(2)).sum();

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        // A constant series has no meaningful correlation with anything.
        0.0
    } else {
        cov / denom
    }
}
