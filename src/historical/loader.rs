//! CSV ingest for the historical return series
//!
//! The bundled file carries one row per calendar year with fractional
//! stock/bond/cash returns and the consumer-price-index level for that
//! year. The inflation rate is derived here as the period-over-period
//! change of the index, so the first index year produces no usable row.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::YearlyReturns;
use crate::error::HistoricalError;

/// Default location of the bundled return series.
pub const DEFAULT_DATA_PATH: &str = "data/historical_returns.csv";

/// Raw CSV row as stored on disk.
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    year: i32,
    stocks: f64,
    bonds: f64,
    cash: f64,
    cpi: f64,
}

/// Load the series from a CSV file.
pub fn load_returns<P: AsRef<Path>>(path: P) -> Result<Vec<YearlyReturns>, HistoricalError> {
    let file = File::open(path.as_ref())?;
    load_returns_from_reader(file)
}

/// Load the series from any reader (e.g. an in-memory buffer in tests).
pub fn load_returns_from_reader<R: Read>(reader: R) -> Result<Vec<YearlyReturns>, HistoricalError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut raw: Vec<CsvRow> = Vec::new();
    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        raw.push(row);
    }

    if raw.len() < 2 {
        return Err(HistoricalError::TooFewRows { rows: raw.len() });
    }

    // Inflation is a change between consecutive index observations, so the
    // rows must be in year order before differencing.
    raw.sort_by_key(|row| row.year);

    let mut rows = Vec::with_capacity(raw.len() - 1);
    for pair in raw.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);
        rows.push(YearlyReturns {
            year: current.year,
            stocks: current.stocks,
            bonds: current.bonds,
            cash: current.cash,
            inflation: current.cpi / prev.cpi - 1.0,
        });
    }

    log::debug!(
        "loaded {} historical rows covering {}-{}",
        rows.len(),
        rows[0].year,
        rows[rows.len() - 1].year
    );

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE: &str = "\
year,stocks,bonds,cash,cpi
1927,0.3749,0.0312,0.0308,17.4
1928,0.4381,0.0084,0.0308,17.1
1929,-0.0830,0.0420,0.0316,17.1
1930,-0.2512,0.0454,0.0455,16.7
";

    #[test]
    fn derives_inflation_and_drops_first_index_year() {
        let rows = load_returns_from_reader(SAMPLE.as_bytes()).unwrap();

        // 1927 only seeds the price index.
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].year, 1928);
        assert_relative_eq!(rows[0].inflation, 17.1 / 17.4 - 1.0);
        // Flat index year means zero inflation.
        assert_relative_eq!(rows[1].inflation, 0.0);
        assert_relative_eq!(rows[0].stocks, 0.4381);
    }

    #[test]
    fn sorts_rows_before_differencing() {
        let shuffled = "\
year,stocks,bonds,cash,cpi
1929,-0.0830,0.0420,0.0316,17.1
1927,0.3749,0.0312,0.0308,17.4
1928,0.4381,0.0084,0.0308,17.1
";
        let rows = load_returns_from_reader(shuffled.as_bytes()).unwrap();
        assert_eq!(rows[0].year, 1928);
        assert_eq!(rows[1].year, 1929);
    }

    #[test]
    fn rejects_single_row_input() {
        let single = "year,stocks,bonds,cash,cpi\n1927,0.37,0.03,0.03,17.4\n";
        let err = load_returns_from_reader(single.as_bytes()).unwrap_err();
        assert!(matches!(err, HistoricalError::TooFewRows { rows: 1 }));
    }

    #[test]
    fn rejects_malformed_rows() {
        let bad = "year,stocks,bonds,cash,cpi\n1927,not-a-number,0.03,0.03,17.4\n";
        assert!(matches!(
            load_returns_from_reader(bad.as_bytes()),
            Err(HistoricalError::Csv(_))
        ));
    }
}
