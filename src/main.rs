//! Retirement simulator CLI
//!
//! Runs a full Monte Carlo experiment from command-line parameters and
//! prints the aggregate summary; optionally writes the statistics as JSON
//! for downstream reporting.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use retiresim::historical::DEFAULT_DATA_PATH;
use retiresim::montecarlo::AggregateStatistics;
use retiresim::{
    HistoricalSeries, ModelKind, MonteCarlo, ReturnModel, SimulationParameters,
    SocialSecurityRule, SupplementalIncomeRule, SupplementalTrigger, TargetAllocation,
};

#[derive(Debug, Parser)]
#[command(name = "retiresim", about = "Monte Carlo retirement portfolio simulator")]
struct Cli {
    /// Portfolio value at retirement, in dollars
    #[arg(long, default_value_t = 750_000.0)]
    starting_portfolio: f64,

    /// Annual spending in today's dollars
    #[arg(long, default_value_t = 50_000.0)]
    annual_spending: f64,

    /// Stock allocation, in percent
    #[arg(long, default_value_t = 60.0)]
    stocks: f64,

    /// Bond allocation, in percent
    #[arg(long, default_value_t = 30.0)]
    bonds: f64,

    /// Cash allocation, in percent
    #[arg(long, default_value_t = 10.0)]
    cash: f64,

    /// Simulation horizon in years
    #[arg(long, default_value_t = 40)]
    years: usize,

    #[arg(long, default_value_t = 50)]
    retirement_age: u32,

    /// Age at which Social Security benefits begin
    #[arg(long, default_value_t = 67)]
    ss_start_age: u32,

    /// Annual Social Security benefit in today's dollars
    #[arg(long, default_value_t = 15_000.0)]
    ss_benefit: f64,

    /// Run without any Social Security income
    #[arg(long)]
    no_social_security: bool,

    /// Enable part-time income with this trigger
    /// (withdrawal-rate, percent-of-peak or percent-of-starting)
    #[arg(long)]
    parttime_trigger: Option<SupplementalTrigger>,

    /// Trigger threshold (e.g. 0.075 for the withdrawal-rate trigger)
    #[arg(long, default_value_t = 0.075)]
    parttime_threshold: f64,

    /// Annual part-time income in today's dollars
    #[arg(long, default_value_t = 25_000.0)]
    parttime_income: f64,

    /// Last age eligible for part-time work (withdrawal-rate trigger only)
    #[arg(long)]
    parttime_max_age: Option<u32>,

    /// Number of Monte Carlo trials
    #[arg(long, default_value_t = 10_000)]
    trials: usize,

    /// Return model: normal, fat-tailed, mean-reverting or
    /// historical-bootstrap
    #[arg(long, default_value_t = ModelKind::Normal)]
    model: ModelKind,

    /// Base RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Historical data CSV, used by the bootstrap model
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    historical_data: PathBuf,

    /// Write the aggregate statistics to this path as JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let allocation = TargetAllocation::from_percentages(cli.stocks, cli.bonds, cli.cash)?;
    let mut params = SimulationParameters::new(
        cli.starting_portfolio,
        cli.annual_spending,
        allocation,
        cli.years,
        cli.retirement_age,
    )?;

    if !cli.no_social_security {
        params = params.with_social_security(SocialSecurityRule {
            start_age: cli.ss_start_age,
            annual_benefit: cli.ss_benefit,
        });
    }

    if let Some(trigger) = cli.parttime_trigger {
        params = params.with_supplemental_income(SupplementalIncomeRule {
            trigger,
            threshold: cli.parttime_threshold,
            annual_income: cli.parttime_income,
            max_age: cli.parttime_max_age,
        });
    }

    let history = if cli.model == ModelKind::HistoricalBootstrap {
        let series = HistoricalSeries::from_csv_path(&cli.historical_data).with_context(|| {
            format!(
                "loading historical data from {}",
                cli.historical_data.display()
            )
        })?;
        Some(Arc::new(series))
    } else {
        None
    };

    let model = ReturnModel::with_defaults(cli.model, cli.years, history)?;

    let mut mc = MonteCarlo::new(params.clone(), model, cli.trials)?;
    if let Some(seed) = cli.seed {
        mc = mc.with_seed(seed);
    }

    let start = Instant::now();
    let stats = mc.run();
    log::info!("{} trials finished in {:?}", cli.trials, start.elapsed());

    print_summary(&stats, &params, cli.model);
    print_trajectory(&stats);

    if let Some(path) = &cli.output {
        let file = File::create(path)
            .with_context(|| format!("creating output file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &stats)?;
        println!("\nAggregate statistics written to: {}", path.display());
    }

    Ok(())
}

fn print_summary(stats: &AggregateStatistics, params: &SimulationParameters, model: ModelKind) {
    println!("{}", "=".repeat(70));
    println!("MONTE CARLO SIMULATION SUMMARY");
    println!("{}", "=".repeat(70));
    println!("Simulations:        {}", stats.trials);
    println!("Return model:       {model}");
    println!("Retirement age:     {}", params.retirement_age);
    println!("Starting portfolio: ${:.0}", params.starting_portfolio);
    println!("Annual spending:    ${:.0}", params.annual_spending);
    println!(
        "Allocation:         {:.0}% stocks / {:.0}% bonds / {:.0}% cash",
        params.allocation.stocks * 100.0,
        params.allocation.bonds * 100.0,
        params.allocation.cash * 100.0
    );
    println!();

    println!("{}", "-".repeat(70));
    println!("SUCCESS METRICS");
    println!("{}", "-".repeat(70));
    println!("Success rate: {:.1}%", stats.success_rate * 100.0);
    println!("Failure rate: {:.1}%", stats.failure_rate * 100.0);
    println!();

    println!("{}", "-".repeat(70));
    println!("FINAL PORTFOLIO VALUE");
    println!("{}", "-".repeat(70));
    let fv = &stats.final_value;
    println!("Median:  ${:.0}", fv.median);
    println!("Mean:    ${:.0}", fv.mean);
    println!("10th %:  ${:.0}", fv.p10);
    println!("90th %:  ${:.0}", fv.p90);
    println!("Min:     ${:.0}", fv.min);
    println!("Max:     ${:.0}", fv.max);
    println!();

    if params.supplemental_income.is_some() {
        println!("{}", "-".repeat(70));
        println!("PART-TIME WORK");
        println!("{}", "-".repeat(70));
        let pt = &stats.supplemental_income;
        println!(
            "Probability of needing part-time work: {:.1}%",
            pt.probability_any * 100.0
        );
        println!("Years of work (median): {:.1}", pt.median_years);
        println!("Years of work (mean):   {:.1}", pt.mean_years);
        println!("Years of work (max):    {}", pt.max_years);
        println!("Years of work (90th%):  {:.1}", pt.p90_years);
        println!();
    }

    if let Some(depletion) = &stats.depletion {
        println!("{}", "-".repeat(70));
        println!("FAILURE SCENARIOS (Portfolio Depletion)");
        println!("{}", "-".repeat(70));
        println!("Failed trials:        {}", depletion.count);
        println!("Median depletion age: {:.0}", depletion.median_age);
        println!("Earliest depletion:   {}", depletion.earliest_age);
        println!();
    }

    println!("{}", "=".repeat(70));
}

fn print_trajectory(stats: &AggregateStatistics) {
    println!("\nPORTFOLIO VALUE TRAJECTORY (selected years)");
    println!("{}", "-".repeat(70));
    println!(
        "{:<6} {:<6} {:>15} {:>15} {:>15}",
        "Age", "Year", "10th %", "Median", "90th %"
    );
    println!("{}", "-".repeat(70));

    let last = stats.value_over_time.len().saturating_sub(1);
    let mut shown = vec![0, 5, 10, 15, 20, 30];
    shown.push(last);
    shown.retain(|&p| p <= last);
    shown.dedup();

    for period in shown {
        let band = &stats.value_over_time[period];
        println!(
            "{:<6} {:<6} {:>15.0} {:>15.0} {:>15.0}",
            band.age, band.period, band.p10, band.median, band.p90
        );
    }
}
