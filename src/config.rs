use crate::error::{CollusimError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of oligopoly competition.
///
/// Bertrand (price-setting) markets are accepted by the configuration layer
/// but every code path that would need them returns
/// [`CollusimError::NotImplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competition {
    Cournot,
    Bertrand,
}

/// When firms run learning episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timing {
    /// Every `update_interval` periods, all firms learn simultaneously.
    Discrete,
    /// One uniformly chosen firm learns each period; the rest carry their
    /// previous choice forward.
    Random,
}

/// Number of firms in the market.
///
/// Only two- and three-firm markets have a calibrated payoff model, so the
/// market size is an enum rather than a free integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSize {
    Duopoly,
    Triopoly,
}

impl MarketSize {
    /// Number of firms in the market
    pub fn firms(&self) -> usize {
        match self {
            MarketSize::Duopoly => 2,
            MarketSize::Triopoly => 3,
        }
    }

    /// Number of competitors each firm faces
    pub fn competitors(&self) -> usize {
        self.firms() - 1
    }
}

/// Immutable parameter bundle for a batch of simulation runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub competition: Competition,
    pub market_size: MarketSize,
    pub timing: Timing,

    /// Number of discrete actions; states and actions both live in
    /// `[0, action_set_size)`
    pub action_set_size: usize,
    /// Periods between learning episodes under discrete timing
    pub update_interval: u64,

    /// Q-learning step size, in (0, 1]
    pub alpha: f64,
    /// Discount factor, in [0, 1)
    pub delta: f64,
    /// Exploration decay rate; epsilon = (1 - beta)^episodes
    pub beta: f64,
    /// Three-firm state-aggregation weight, in [0, 1]
    pub gamma: f64,

    /// Consecutive converged periods required to stop
    pub min_converged_periods: u64,
    /// Hard period cap
    pub max_periods: u64,
    /// Length of each firm's retained price/quantity/profit history
    pub history_window: usize,
    /// Quantities closer than this between consecutive periods count as
    /// unchanged for the convergence check
    pub convergence_threshold: f64,
}

impl MarketConfig {
    /// Calibrated parameters for a given timing and market size.
    /// Action set `[0, 100]`, with alpha, delta and gamma matched to the
    /// (timing, size) cell.
    pub fn calibrated(timing: Timing, market_size: MarketSize) -> Self {
        let (alpha, delta, gamma) = match (timing, market_size) {
            (Timing::Random, MarketSize::Duopoly) => (0.100, 0.99, 1.0),
            (Timing::Random, MarketSize::Triopoly) => (0.080, 0.87, 1.0),
            (Timing::Discrete, MarketSize::Duopoly) => (0.100, 0.99, 1.0),
            (Timing::Discrete, MarketSize::Triopoly) => (0.100, 0.82, 1.0),
        };

        let action_set_size = 101usize;
        let update_interval = 1u64;

        MarketConfig {
            competition: Competition::Cournot,
            market_size,
            timing,
            action_set_size,
            update_interval,
            alpha,
            delta,
            beta: 0.000_000_270_865,
            gamma,
            min_converged_periods: 100 * update_interval,
            max_periods: (action_set_size * action_set_size) as u64 * 5000,
            history_window: (100 * update_interval) as usize,
            convergence_threshold: 1e-5,
        }
    }

    /// Check the parameter ranges, returning the first violation
    pub fn validate(&self) -> Result<()> {
        if self.action_set_size == 0 {
            return Err(CollusimError::invalid_parameter(
                "action_set_size",
                "must be at least 1",
            ));
        }
        if self.update_interval == 0 {
            return Err(CollusimError::invalid_parameter(
                "update_interval",
                "must be at least 1",
            ));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(CollusimError::invalid_parameter(
                "alpha",
                "must be in (0, 1]",
            ));
        }
        if !(self.delta >= 0.0 && self.delta < 1.0) {
            return Err(CollusimError::invalid_parameter(
                "delta",
                "must be in [0, 1)",
            ));
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(CollusimError::invalid_parameter(
                "beta",
                "must be in (0, 1)",
            ));
        }
        if !(self.gamma >= 0.0 && self.gamma <= 1.0) {
            return Err(CollusimError::invalid_parameter(
                "gamma",
                "must be in [0, 1]",
            ));
        }
        if self.convergence_threshold <= 0.0 {
            return Err(CollusimError::invalid_parameter(
                "convergence_threshold",
                "must be positive",
            ));
        }
        if self.history_window < 2 {
            return Err(CollusimError::invalid_parameter(
                "history_window",
                "must hold at least 2 periods",
            ));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: MarketConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig::calibrated(Timing::Discrete, MarketSize::Duopoly)
    }
}

/// Builder pattern for MarketConfig
pub struct MarketConfigBuilder {
    config: MarketConfig,
}

impl MarketConfigBuilder {
    pub fn new() -> Self {
        MarketConfigBuilder {
            config: MarketConfig::default(),
        }
    }

    pub fn competition(mut self, competition: Competition) -> Self {
        self.config.competition = competition;
        self
    }

    pub fn market_size(mut self, market_size: MarketSize) -> Self {
        self.config.market_size = market_size;
        self
    }

    pub fn timing(mut self, timing: Timing) -> Self {
        self.config.timing = timing;
        self
    }

    pub fn action_set_size(mut self, n: usize) -> Self {
        self.config.action_set_size = n;
        self
    }

    pub fn update_interval(mut self, interval: u64) -> Self {
        self.config.update_interval = interval;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.config.alpha = alpha;
        self
    }

    pub fn delta(mut self, delta: f64) -> Self {
        self.config.delta = delta;
        self
    }

    pub fn beta(mut self, beta: f64) -> Self {
        self.config.beta = beta;
        self
    }

    pub fn gamma(mut self, gamma: f64) -> Self {
        self.config.gamma = gamma;
        self
    }

    pub fn min_converged_periods(mut self, periods: u64) -> Self {
        self.config.min_converged_periods = periods;
        self
    }

    pub fn max_periods(mut self, periods: u64) -> Self {
        self.config.max_periods = periods;
        self
    }

    pub fn history_window(mut self, window: usize) -> Self {
        self.config.history_window = window;
        self
    }

    pub fn convergence_threshold(mut self, threshold: f64) -> Self {
        self.config.convergence_threshold = threshold;
        self
    }

    pub fn build(self) -> Result<MarketConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for MarketConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
