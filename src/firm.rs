//! One market participant.
//!
//! A firm owns its value table and a bounded window of its recent per-period
//! data. It never holds references to other firms: competitor quantities
//! arrive as plain slices, assembled by the orchestrator from ownership
//! positions. Learning therefore depends only on numbers, and ownership is
//! strictly one-directional (firm owns table).

use crate::config::{Competition, MarketConfig, MarketSize};
use crate::error::{CollusimError, Result};
use crate::payoff;
use crate::qtable::QTable;
use std::collections::VecDeque;

/// Bounded per-period record of a firm's price, quantity and profit.
/// Oldest entries are evicted first; the three sequences always have
/// equal length.
#[derive(Debug, Clone)]
pub struct FirmHistory {
    prices: VecDeque<f64>,
    quantities: VecDeque<f64>,
    profits: VecDeque<f64>,
    window: usize,
}

impl FirmHistory {
    pub fn new(window: usize) -> Self {
        FirmHistory {
            prices: VecDeque::with_capacity(window),
            quantities: VecDeque::with_capacity(window),
            profits: VecDeque::with_capacity(window),
            window,
        }
    }

    pub fn push(&mut self, price: f64, quantity: f64, profit: f64) {
        if self.prices.len() == self.window {
            self.prices.pop_front();
            self.quantities.pop_front();
            self.profits.pop_front();
        }
        self.prices.push_back(price);
        self.quantities.push_back(quantity);
        self.profits.push_back(profit);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn prices(&self) -> &VecDeque<f64> {
        &self.prices
    }

    pub fn quantities(&self) -> &VecDeque<f64> {
        &self.quantities
    }

    pub fn profits(&self) -> &VecDeque<f64> {
        &self.profits
    }

    /// The two most recent quantities as (previous, latest)
    pub fn last_two_quantities(&self) -> Option<(f64, f64)> {
        let n = self.quantities.len();
        if n < 2 {
            return None;
        }
        Some((self.quantities[n - 2], self.quantities[n - 1]))
    }
}

/// A single firm: current market data, learned policy, bounded history
pub struct Firm {
    /// Position within the run; competitor slices are built from it
    pub index: usize,

    pub price: f64,
    pub quantity: f64,
    pub profit: f64,

    table: QTable,
    history: FirmHistory,

    competition: Competition,
    market_size: MarketSize,
    gamma: f64,
    convergence_threshold: f64,
}

impl Firm {
    pub fn new(index: usize, config: &MarketConfig, table: QTable) -> Self {
        Firm {
            index,
            price: 0.0,
            quantity: 0.0,
            profit: 0.0,
            table,
            history: FirmHistory::new(config.history_window),
            competition: config.competition,
            market_size: config.market_size,
            gamma: config.gamma,
            convergence_threshold: config.convergence_threshold,
        }
    }

    /// The firm's decision variable: quantity under Cournot, price under
    /// Bertrand
    pub fn state(&self) -> f64 {
        match self.competition {
            Competition::Cournot => self.quantity,
            Competition::Bertrand => self.price,
        }
    }

    /// Carry a (possibly unchanged) decision into the current period
    pub fn set_state(&mut self, value: f64) {
        match self.competition {
            Competition::Cournot => self.quantity = value,
            Competition::Bertrand => self.price = value,
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn history(&self) -> &FirmHistory {
        &self.history
    }

    /// Run one learning episode against the competitors' carried
    /// quantities and return the chosen quantity.
    ///
    /// The reward is computed against the *discretized* competitor
    /// quantities, matching the state the table was indexed with.
    pub fn run_episode(&mut self, competitors: &[f64]) -> Result<f64> {
        if self.competition == Competition::Bertrand {
            return Err(CollusimError::not_implemented("bertrand episode"));
        }

        let (state, discretized) = self.discretize_state(competitors);
        let action = self.table.select_action(state);
        let q = action as f64;

        let price = payoff::price(self.market_size, q, &discretized);
        let reward = payoff::profit(self.market_size, price, q);
        self.table.update(state, action, reward);

        Ok(q)
    }

    /// Recompute price and profit for the quantity carried this period and
    /// append the period's data to the bounded history.
    pub fn record_period(&mut self, competitors: &[f64]) -> Result<()> {
        if self.competition == Competition::Bertrand {
            return Err(CollusimError::not_implemented("bertrand market data"));
        }

        self.price = payoff::price(self.market_size, self.quantity, competitors);
        self.profit = payoff::profit(self.market_size, self.price, self.quantity);
        self.history.push(self.price, self.quantity, self.profit);
        Ok(())
    }

    /// True iff at least two periods are recorded and the two latest
    /// quantities differ by less than the convergence threshold
    pub fn has_converged(&self) -> bool {
        match self.history.last_two_quantities() {
            Some((previous, latest)) => (latest - previous).abs() < self.convergence_threshold,
            None => false,
        }
    }

    /// Map competitor quantities onto a table row index.
    ///
    /// Duopoly: the floored competitor quantity. Triopoly: the two floored
    /// quantities combined by the gamma weighting, biased toward the lower
    /// (gamma near 1) or higher competitor, halved and rounded. Results are
    /// clamped into the table's row range.
    pub(crate) fn discretize_state(&self, competitors: &[f64]) -> (usize, Vec<f64>) {
        let limit = (self.table.actions() - 1) as f64;
        match self.market_size {
            MarketSize::Duopoly => {
                let s = competitors[0].floor().clamp(0.0, limit);
                (s as usize, vec![s])
            }
            MarketSize::Triopoly => {
                let s1 = competitors[0].floor().clamp(0.0, limit);
                let s2 = competitors[1].floor().clamp(0.0, limit);
                let weighted = if s1 < s2 {
                    (self.gamma * s1 + (1.0 - self.gamma) * s2) / 2.0
                } else if s1 > s2 {
                    ((1.0 - self.gamma) * s1 + self.gamma * s2) / 2.0
                } else {
                    (s1 + s2) / 2.0
                };
                let state = weighted.round().clamp(0.0, limit);
                (state as usize, vec![s1, s2])
            }
        }
    }
}
