//! Batches of independent simulation runs.
//!
//! Runs are seeded 0..n and share nothing but the cold-start table cache,
//! which is read with copy-on-read semantics. Cross-run statistics follow
//! the reporting conventions of the oligopoly experiments: a run counts as
//! collusive when the standard deviation of its pooled prices stays below
//! the number of firms in the market.

use crate::config::MarketConfig;
use crate::error::Result;
use crate::metrics::Statistics;
use crate::run::{RunSummary, SimulationRun};
use crate::qtable::TableCache;
use log::info;
use serde::{Deserialize, Serialize};

/// Cross-run aggregate of an experiment batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSummary {
    pub runs: Vec<RunSummary>,
    pub price: Statistics,
    pub price_sd: Statistics,
    pub quantity: Statistics,
    pub profit: Statistics,
    pub collusion_degree: Statistics,
    pub periods: Statistics,
    /// Share of runs whose pooled price standard deviation stayed below
    /// the number of firms, in [0, 1]
    pub collusive_share: f64,
}

/// Drives a batch of seeded runs under one configuration
pub struct Experiment {
    config: MarketConfig,
    num_runs: usize,
    cache: TableCache,
}

impl Experiment {
    pub fn new(config: MarketConfig, num_runs: usize) -> Result<Self> {
        config.validate()?;
        Ok(Experiment {
            config,
            num_runs,
            cache: TableCache::default(),
        })
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn num_runs(&self) -> usize {
        self.num_runs
    }

    /// Simulate all runs and aggregate their summaries
    pub fn run(&mut self) -> Result<ExperimentSummary> {
        info!(
            "simulating {} runs: {:?} timing, {:?} competition, {} firms (alpha = {}, delta = {})",
            self.num_runs,
            self.config.timing,
            self.config.competition,
            self.config.market_size.firms(),
            self.config.alpha,
            self.config.delta,
        );

        let mut runs = Vec::with_capacity(self.num_runs);
        for seed in 0..self.num_runs as u64 {
            info!("run {} of {}", seed + 1, self.num_runs);
            let mut run = SimulationRun::new(&self.config, seed, &mut self.cache)?;
            runs.push(run.simulate()?);
        }

        Ok(self.aggregate(runs))
    }

    fn aggregate(&self, runs: Vec<RunSummary>) -> ExperimentSummary {
        let collect = |f: fn(&RunSummary) -> f64| -> Vec<f64> { runs.iter().map(f).collect() };

        let price_sds = collect(|r| r.sd_price);
        let firms = self.config.market_size.firms() as f64;
        let collusive = price_sds.iter().filter(|&&sd| sd < firms).count();
        let collusive_share = if runs.is_empty() {
            0.0
        } else {
            collusive as f64 / runs.len() as f64
        };

        ExperimentSummary {
            price: Statistics::from_slice(&collect(|r| r.mean_price)),
            price_sd: Statistics::from_slice(&price_sds),
            quantity: Statistics::from_slice(&collect(|r| r.mean_quantity)),
            profit: Statistics::from_slice(&collect(|r| r.mean_profit)),
            collusion_degree: Statistics::from_slice(&collect(|r| r.collusion_degree)),
            periods: Statistics::from_slice(&collect(|r| r.periods as f64)),
            collusive_share,
            runs,
        }
    }
}
