//! Failure-rate sweep across withdrawal rates and return models
//!
//! Runs the same retirement plan at a grid of initial withdrawal rates
//! under each return model and prints the failure rates side by side, for
//! comparing how much of the safe-withdrawal answer is model choice.

use std::sync::Arc;
use std::time::Instant;

use retiresim::historical::DEFAULT_DATA_PATH;
use retiresim::{
    HistoricalSeries, ModelKind, MonteCarlo, ReturnModel, SimulationParameters, TargetAllocation,
};

const STARTING_PORTFOLIO: f64 = 1_000_000.0;
const HORIZON_YEARS: usize = 30;
const RETIREMENT_AGE: u32 = 65;
const TRIALS: usize = 2_000;
const SEED: u64 = 20120731;
const WITHDRAWAL_RATES: [f64; 7] = [0.03, 0.035, 0.04, 0.045, 0.05, 0.055, 0.06];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let start = Instant::now();
    let history = Arc::new(HistoricalSeries::from_csv_path(DEFAULT_DATA_PATH)?);
    println!(
        "Loaded {} years of historical data in {:?}",
        history.len(),
        start.elapsed()
    );

    let kinds = [
        ModelKind::Normal,
        ModelKind::FatTailed,
        ModelKind::MeanReverting,
        ModelKind::HistoricalBootstrap,
    ];

    let header: Vec<String> = WITHDRAWAL_RATES
        .iter()
        .map(|r| format!("{:>7.1}%", r * 100.0))
        .collect();
    println!(
        "\nFailure rate by initial withdrawal rate ({TRIALS} trials, {HORIZON_YEARS}y horizon)"
    );
    println!("{:<22}{}", "Model", header.join(" "));
    println!("{}", "-".repeat(22 + 8 * WITHDRAWAL_RATES.len()));

    let allocation = TargetAllocation::new(0.6, 0.3, 0.1)?;
    for kind in kinds {
        let mut row = format!("{:<22}", kind.to_string());
        for rate in WITHDRAWAL_RATES {
            let params = SimulationParameters::new(
                STARTING_PORTFOLIO,
                STARTING_PORTFOLIO * rate,
                allocation,
                HORIZON_YEARS,
                RETIREMENT_AGE,
            )?;
            let model =
                ReturnModel::with_defaults(kind, HORIZON_YEARS, Some(Arc::clone(&history)))?;
            let stats = MonteCarlo::new(params, model, TRIALS)?
                .with_seed(SEED)
                .run();
            row.push_str(&format!("{:>7.1}% ", stats.failure_rate * 100.0));
        }
        println!("{row}");
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
