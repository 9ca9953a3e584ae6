//! Console report over the historical return series
//!
//! Prints the available year range, per-asset summary statistics and the
//! pairwise correlation matrix of the bundled (or a given) data file.

use retiresim::historical::{AssetClass, HistoricalSeries, DEFAULT_DATA_PATH};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    let series = HistoricalSeries::from_csv_path(&path)?;

    let range = series.year_range()?;
    println!("Historical returns: {path}");
    println!(
        "Coverage: {}-{} ({} years)\n",
        range.min_year, range.max_year, range.total_years
    );

    let summary = series.summary()?;
    println!(
        "{:<10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "Asset", "Mean", "StdDev", "Min", "Median", "Max"
    );
    println!("{}", "-".repeat(56));
    for (asset, stats) in [
        ("stocks", &summary.stocks),
        ("bonds", &summary.bonds),
        ("cash", &summary.cash),
        ("inflation", &summary.inflation),
    ] {
        println!(
            "{:<10} {:>7.2}% {:>7.2}% {:>7.2}% {:>7.2}% {:>7.2}%",
            asset,
            stats.mean * 100.0,
            stats.std_dev * 100.0,
            stats.min * 100.0,
            stats.median * 100.0,
            stats.max * 100.0
        );
    }

    println!("\nCorrelations:");
    print!("{:<10}", "");
    for asset in AssetClass::ALL {
        print!(" {:>9}", asset.as_str());
    }
    println!();
    for a in AssetClass::ALL {
        print!("{:<10}", a.as_str());
        for b in AssetClass::ALL {
            print!(" {:>9.3}", summary.correlations.between(a, b));
        }
        println!();
    }

    Ok(())
}
