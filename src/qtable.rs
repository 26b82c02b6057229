//! Tabular Q-learning for a single firm.
//!
//! The value table is square: rows index the discretized market state,
//! columns index the firm's own quantity choice. Both live in
//! `[0, action_set_size)`. Each table owns a private seeded random stream
//! for its exploration draws, so concurrent runs never share randomness.

use crate::config::{Competition, MarketConfig, MarketSize};
use crate::error::Result;
use crate::payoff;
use log::debug;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// Expected-profit initialization of a value table.
///
/// Every entry `(i, j)` holds the profit of playing quantity `j` averaged
/// over the full Cartesian product of competitor quantities in
/// `[0, action_set_size)` — one competitor for a duopoly, two for a
/// triopoly. The row index does not enter the average: before any learning
/// there is no information that distinguishes states, so every row carries
/// the same expectation profile.
pub fn cold_start(
    competition: Competition,
    action_set_size: usize,
    market_size: MarketSize,
) -> Result<Array2<f64>> {
    if competition == Competition::Bertrand {
        return Err(crate::error::CollusimError::not_implemented(
            "bertrand cold-start table",
        ));
    }

    let n = action_set_size;
    let mut profile = vec![0.0f64; n];

    for (j, entry) in profile.iter_mut().enumerate() {
        let q = j as f64;
        let mut total = 0.0;
        match market_size {
            MarketSize::Duopoly => {
                for k in 0..n {
                    let price = payoff::duo_price(q, k as f64);
                    total += payoff::duo_profit(price, q);
                }
                *entry = total / n as f64;
            }
            MarketSize::Triopoly => {
                for k in 0..n {
                    for l in 0..n {
                        let price = payoff::trio_price(q, k as f64, l as f64);
                        total += payoff::trio_profit(price, q);
                    }
                }
                *entry = total / (n * n) as f64;
            }
        }
    }

    let mut table = Array2::zeros((n, n));
    for mut row in table.rows_mut() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = profile[j];
        }
    }
    debug!(
        "cold-start table built: {:?} {:?} n={}",
        competition, market_size, n
    );
    Ok(table)
}

/// Cache key for cold-start tables
pub type TableKey = (Competition, usize, MarketSize);

/// Size-bounded memo for cold-start tables.
///
/// Identical `(competition, action_set_size, market_size)` inputs always
/// yield element-wise identical tables, so the expectation sweep only needs
/// to run once per configuration. Reads hand out an independent copy:
/// a firm's learning must never leak into another firm's table.
pub struct TableCache {
    entries: HashMap<TableKey, Array2<f64>>,
    order: VecDeque<TableKey>,
    capacity: usize,
}

impl TableCache {
    pub fn new(capacity: usize) -> Self {
        TableCache {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Copy-on-read lookup, computing and memoizing on a miss
    pub fn table(
        &mut self,
        competition: Competition,
        action_set_size: usize,
        market_size: MarketSize,
    ) -> Result<Array2<f64>> {
        let key = (competition, action_set_size, market_size);
        if let Some(table) = self.entries.get(&key) {
            return Ok(table.clone());
        }

        let table = cold_start(competition, action_set_size, market_size)?;
        if self.entries.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.entries.insert(key, table.clone());
        self.order.push_back(key);
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TableCache {
    fn default() -> Self {
        // Matches the handful of (competition, n, size) combinations a
        // typical experiment batch touches.
        TableCache::new(8)
    }
}

fn snapshot_rng() -> StdRng {
    StdRng::seed_from_u64(0)
}

/// One firm's learned value table with epsilon-greedy action selection
#[derive(Serialize, Deserialize)]
pub struct QTable {
    /// Estimated long-run rewards, rows = state, columns = action
    pub values: Array2<f64>,

    /// Exploration probability; starts at 1 and decays per episode
    pub epsilon: f64,

    /// Number of learning episodes performed
    pub episodes: u64,

    actions: usize,
    alpha: f64,
    delta: f64,
    beta: f64,

    #[serde(skip, default = "snapshot_rng")]
    rng: StdRng,
}

impl QTable {
    /// Wrap a cold-start table with the run's learning parameters.
    /// `seed` fixes this table's private exploration stream.
    pub fn new(config: &MarketConfig, values: Array2<f64>, seed: u64) -> Self {
        let actions = config.action_set_size;
        debug_assert_eq!(values.dim(), (actions, actions));
        QTable {
            values,
            epsilon: 1.0,
            episodes: 0,
            actions,
            alpha: config.alpha,
            delta: config.delta,
            beta: config.beta,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of actions (and states)
    pub fn actions(&self) -> usize {
        self.actions
    }

    /// Epsilon-greedy action selection for the given state row
    pub fn select_action(&mut self, state: usize) -> usize {
        if self.rng.gen::<f64>() > self.epsilon {
            self.greedy_action(state)
        } else {
            self.rng.gen_range(0..self.actions)
        }
    }

    /// Argmax over the state's row, ties broken by the lowest action index
    pub fn greedy_action(&self, state: usize) -> usize {
        let row = self.values.row(state);
        let mut best = 0;
        let mut best_value = row[0];
        for (j, &value) in row.iter().enumerate().skip(1) {
            if value > best_value {
                best = j;
                best_value = value;
            }
        }
        best
    }

    /// Value update for one realized (state, action, reward) episode.
    ///
    /// The bootstrap term reads the row indexed by the action just taken,
    /// not by the next period's realized state: the firm uses its own
    /// current choice as the predictor of the next relevant row. This is
    /// the contract; callers must not substitute the realized next state.
    pub fn update(&mut self, state: usize, action: usize, reward: f64) {
        let bootstrap = self
            .values
            .row(action)
            .iter()
            .fold(f64::NEG_INFINITY, |max, &v| max.max(v));

        let old = self.values[[state, action]];
        self.values[[state, action]] =
            (1.0 - self.alpha) * old + self.alpha * (reward + self.delta * bootstrap);

        self.episodes += 1;
        self.epsilon = (1.0 - self.beta).powf(self.episodes as f64);
    }

    /// Save a snapshot of the table to disk
    pub fn save(&self, path: &str) -> Result<()> {
        let serialized = bincode::serialize(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    /// Load a snapshot from disk, reseeding the exploration stream
    pub fn load(path: &str, seed: u64) -> Result<Self> {
        let data = std::fs::read(path)?;
        let mut table: Self = bincode::deserialize(&data)?;
        table.rng = StdRng::seed_from_u64(seed);
        Ok(table)
    }
}
