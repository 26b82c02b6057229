//! Report writers for experiment results.

use crate::config::{MarketSize, Timing, MarketConfig};
use crate::error::Result;
use crate::experiment::ExperimentSummary;
use std::io::Write;
use std::path::Path;

/// Export an experiment summary to CSV: the settings block, the cross-run
/// means, then one data row per run
pub fn export_summary_csv<P: AsRef<Path>>(
    config: &MarketConfig,
    summary: &ExperimentSummary,
    path: P,
) -> Result<()> {
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "SETTING")?;
    match config.timing {
        Timing::Discrete => writeln!(
            file,
            "timing,discrete,,update interval,{}",
            config.update_interval
        )?,
        Timing::Random => writeln!(file, "timing,random")?,
    }
    writeln!(file, "market setting,{:?}", config.competition)?;
    writeln!(file, "market size,{}", config.market_size.firms())?;

    writeln!(file)?;
    writeln!(file, "SIMULATION")?;
    writeln!(file, "max number of periods,{}", config.max_periods)?;
    writeln!(file, "number of runs,{}", summary.runs.len())?;
    let collusive = (summary.collusive_share * summary.runs.len() as f64).round() as usize;
    writeln!(
        file,
        "number of collusive runs,{},{}%",
        collusive,
        summary.collusive_share * 100.0
    )?;

    writeln!(file)?;
    writeln!(file, "Q-LEARNING")?;
    writeln!(file, "actionset,[0; {}]", config.action_set_size - 1)?;
    writeln!(file, "alpha,{}", config.alpha)?;
    writeln!(file, "beta,{}", config.beta)?;
    if config.market_size == MarketSize::Triopoly {
        writeln!(file, "gamma,{}", config.gamma)?;
    }
    writeln!(file, "delta,{}", config.delta)?;
    // Mean exploration rate left at the end of a run; beta is small, so
    // (1 - beta)^periods is approximated by exp(-beta * mean periods).
    let end_epsilon = (-config.beta * summary.periods.mean).exp();
    writeln!(file, "mean epsilon at the end,{:.8}", end_epsilon)?;

    writeln!(file)?;
    writeln!(file, "MEAN")?;
    writeln!(file, "ALL RUNS,mean,sd")?;
    writeln!(file, "price,{},{}", summary.price.mean, summary.price.std)?;
    writeln!(file, "sd (of all period prices),{}", summary.price_sd.mean)?;
    writeln!(
        file,
        "quantity,{},{}",
        summary.quantity.mean, summary.quantity.std
    )?;
    writeln!(file, "profit,{},{}", summary.profit.mean, summary.profit.std)?;
    writeln!(
        file,
        "periods (in mio),{},{}",
        summary.periods.mean / 1e6,
        summary.periods.std / 1e6
    )?;
    writeln!(
        file,
        "degree,{},{}",
        summary.collusion_degree.mean, summary.collusion_degree.std
    )?;

    writeln!(file)?;
    writeln!(file, "DATA")?;
    writeln!(
        file,
        "i,price,sd (of all prices),quantity,profit,periods (in mio),degree"
    )?;
    for (i, run) in summary.runs.iter().enumerate() {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            i + 1,
            run.mean_price,
            run.sd_price,
            run.mean_quantity,
            run.mean_profit,
            run.periods as f64 / 1e6,
            run.collusion_degree
        )?;
    }

    Ok(())
}

/// Export an experiment summary as pretty-printed JSON
pub fn export_summary_json<P: AsRef<Path>>(
    summary: &ExperimentSummary,
    path: P,
) -> Result<()> {
    let data = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, data)?;
    Ok(())
}
