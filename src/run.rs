//! Per-seed simulation run.
//!
//! A run owns its firms and a private seeded random stream; nothing is
//! shared across runs, so a batch of runs is embarrassingly parallel.
//! Each period the firms' new decisions are computed under the configured
//! timing discipline, applied simultaneously, recorded, and checked for
//! sustained convergence.

use crate::config::{MarketConfig, Timing};
use crate::error::Result;
use crate::firm::Firm;
use crate::metrics;
use crate::payoff;
use crate::qtable::{QTable, TableCache};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Aggregate metrics of a completed run, pooled over all firms'
/// retained histories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub mean_price: f64,
    pub sd_price: f64,
    pub mean_quantity: f64,
    pub mean_profit: f64,
    /// 0 at the Nash benchmark, 1 at the joint-profit-maximizing price
    pub collusion_degree: f64,
    pub periods: u64,
}

/// Orchestrates a fixed set of firms over discrete periods until the
/// market converges or the period cap is reached
pub struct SimulationRun {
    config: MarketConfig,
    firms: Vec<Firm>,
    periods: u64,
    converged_periods: u64,
    rng: StdRng,
}

impl SimulationRun {
    /// Build the run's firms, drawing their table seeds from the run seed.
    ///
    /// Cold-start tables come from the shared cache; each firm receives an
    /// independent copy. Fails fast on invalid configurations and on
    /// unimplemented competition kinds.
    pub fn new(config: &MarketConfig, seed: u64, cache: &mut TableCache) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let firm_count = config.market_size.firms();
        let mut firms = Vec::with_capacity(firm_count);
        for index in 0..firm_count {
            let values =
                cache.table(config.competition, config.action_set_size, config.market_size)?;
            let table = QTable::new(config, values, rng.gen());
            firms.push(Firm::new(index, config, table));
        }
        debug!("run seeded with {} ({} firms)", seed, firm_count);

        Ok(SimulationRun {
            config: config.clone(),
            firms,
            periods: 0,
            converged_periods: 0,
            rng,
        })
    }

    /// Advance periods until the period cap or sustained convergence,
    /// then summarize
    pub fn simulate(&mut self) -> Result<RunSummary> {
        while self.periods < self.config.max_periods
            && self.converged_periods < self.config.min_converged_periods
        {
            self.step()?;
        }
        self.summary()
    }

    /// One full period: decide, apply, record, check convergence
    pub fn step(&mut self) -> Result<()> {
        let states = match self.config.timing {
            Timing::Discrete => self.step_discrete()?,
            Timing::Random => self.step_random()?,
        };

        for (firm, state) in self.firms.iter_mut().zip(states) {
            firm.set_state(state);
        }

        // Every firm records against the quantities just applied; the
        // competitor snapshots are taken up front so recording order
        // cannot matter.
        let competitor_sets: Vec<Vec<f64>> = (0..self.firms.len())
            .map(|i| self.competitor_quantities(i))
            .collect();
        for (firm, competitors) in self.firms.iter_mut().zip(&competitor_sets) {
            firm.record_period(competitors)?;
        }

        self.compare_periods();
        self.periods += 1;
        Ok(())
    }

    /// Discrete timing: every `update_interval` periods all firms learn,
    /// otherwise all replay their carried decision
    fn step_discrete(&mut self) -> Result<Vec<f64>> {
        if self.periods % self.config.update_interval == 0 {
            let competitor_sets: Vec<Vec<f64>> = (0..self.firms.len())
                .map(|i| self.competitor_quantities(i))
                .collect();
            let mut states = Vec::with_capacity(self.firms.len());
            for (firm, competitors) in self.firms.iter_mut().zip(&competitor_sets) {
                states.push(firm.run_episode(competitors)?);
            }
            Ok(states)
        } else {
            Ok(self.firms.iter().map(Firm::state).collect())
        }
    }

    /// Random timing: exactly one uniformly chosen firm learns this period
    fn step_random(&mut self) -> Result<Vec<f64>> {
        let mut states: Vec<f64> = self.firms.iter().map(Firm::state).collect();
        let chosen = self.rng.gen_range(0..self.firms.len());
        let competitors = self.competitor_quantities(chosen);
        states[chosen] = self.firms[chosen].run_episode(&competitors)?;
        Ok(states)
    }

    /// Carried quantities of every firm except `index`, in index order
    fn competitor_quantities(&self, index: usize) -> Vec<f64> {
        self.firms
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .map(|(_, firm)| firm.quantity)
            .collect()
    }

    /// Reset the converged-period counter if any firm moved this period,
    /// otherwise count the period as converged
    fn compare_periods(&mut self) {
        if self.firms.iter().all(Firm::has_converged) {
            self.converged_periods += 1;
        } else {
            self.converged_periods = 0;
        }
    }

    pub fn periods(&self) -> u64 {
        self.periods
    }

    pub fn converged_periods(&self) -> u64 {
        self.converged_periods
    }

    /// The firms with their retained histories, for deeper analysis
    pub fn firms(&self) -> &[Firm] {
        &self.firms
    }

    pub fn mean_price(&self) -> Result<f64> {
        metrics::mean(&self.pooled(|firm| firm.history().prices().iter().copied().collect()))
    }

    pub fn sd_price(&self) -> Result<f64> {
        metrics::std_dev(&self.pooled(|firm| firm.history().prices().iter().copied().collect()))
    }

    pub fn mean_quantity(&self) -> Result<f64> {
        metrics::mean(&self.pooled(|firm| firm.history().quantities().iter().copied().collect()))
    }

    pub fn mean_profit(&self) -> Result<f64> {
        metrics::mean(&self.pooled(|firm| firm.history().profits().iter().copied().collect()))
    }

    /// Normalized position of the run's mean price between the Nash and
    /// joint-profit-maximizing benchmarks
    pub fn collusion_degree(&self) -> Result<f64> {
        Ok(payoff::collusion_degree(
            self.mean_price()?,
            self.config.market_size,
        ))
    }

    /// Run-level aggregates over the pooled per-period data of all firms
    pub fn summary(&self) -> Result<RunSummary> {
        Ok(RunSummary {
            mean_price: self.mean_price()?,
            sd_price: self.sd_price()?,
            mean_quantity: self.mean_quantity()?,
            mean_profit: self.mean_profit()?,
            collusion_degree: self.collusion_degree()?,
            periods: self.periods,
        })
    }

    fn pooled<F>(&self, per_firm: F) -> Vec<f64>
    where
        F: Fn(&Firm) -> Vec<f64>,
    {
        self.firms.iter().flat_map(|firm| per_firm(firm)).collect()
    }
}
