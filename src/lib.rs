//! # Collusim - Algorithmic Collusion Simulator
//!
//! Collusim simulates repeated Cournot oligopoly competition among
//! independent tabular Q-learning firms and measures whether their learned
//! pricing behavior drifts toward the collusive outcome rather than the
//! competitive (Nash) equilibrium.
//!
//! ## Key Features
//!
//! - **Tabular Q-learning firms**: epsilon-greedy exploration with
//!   per-episode decay, expected-profit cold-start tables
//! - **Cournot payoffs**: calibrated two- and three-firm linear demand
//! - **Two timing disciplines**: simultaneous periodic learning episodes,
//!   or one randomly chosen learner per period
//! - **Deterministic runs**: every run owns a private seeded random
//!   stream; batches of runs are embarrassingly parallel
//! - **Collusion metrics**: normalized degree of tacit collusion between
//!   the Nash and joint-profit-maximizing price benchmarks
//!
//! ## Quick Start
//!
//! ```rust
//! use collusim::config::{MarketConfigBuilder, MarketSize, Timing};
//! use collusim::qtable::TableCache;
//! use collusim::run::SimulationRun;
//!
//! let config = MarketConfigBuilder::new()
//!     .market_size(MarketSize::Duopoly)
//!     .timing(Timing::Discrete)
//!     .action_set_size(11)
//!     .beta(0.01)
//!     .max_periods(500)
//!     .min_converged_periods(50)
//!     .history_window(50)
//!     .build()
//!     .unwrap();
//!
//! let mut cache = TableCache::default();
//! let mut run = SimulationRun::new(&config, 42, &mut cache).unwrap();
//! let summary = run.simulate().unwrap();
//!
//! assert!(summary.periods <= 500);
//! println!("degree of tacit collusion: {}", summary.collusion_degree);
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Market and learning parameter bundle, calibrated presets
//! - [`error`] - Error types and result handling
//! - [`experiment`] - Batches of seeded runs with cross-run aggregation
//! - [`export`] - CSV/JSON report writers
//! - [`firm`] - A market participant with bounded period histories
//! - [`metrics`] - Mean / standard deviation / summary statistics
//! - [`payoff`] - Cournot price and profit functions, benchmarks
//! - [`qtable`] - Tabular Q-learning with cold-start table caching
//! - [`run`] - The per-seed period loop and convergence detection

pub mod config;
pub mod error;
pub mod experiment;
pub mod export;
pub mod firm;
pub mod metrics;
pub mod payoff;
pub mod qtable;
pub mod run;

#[cfg(test)]
mod tests;

pub use config::{Competition, MarketConfig, MarketConfigBuilder, MarketSize, Timing};
pub use error::{CollusimError, Result};
pub use experiment::{Experiment, ExperimentSummary};
pub use firm::Firm;
pub use qtable::{QTable, TableCache};
pub use run::{RunSummary, SimulationRun};
