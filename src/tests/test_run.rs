use crate::config::{Competition, MarketConfig, MarketConfigBuilder, MarketSize, Timing};
use crate::error::CollusimError;
use crate::metrics;
use crate::qtable::TableCache;
use crate::run::SimulationRun;

fn small_config() -> MarketConfig {
    MarketConfigBuilder::new()
        .market_size(MarketSize::Duopoly)
        .timing(Timing::Discrete)
        .action_set_size(11)
        .beta(0.01)
        .max_periods(300)
        .min_converged_periods(50)
        .history_window(50)
        .build()
        .unwrap()
}

#[test]
fn test_bertrand_run_fails_fast() {
    let config = MarketConfigBuilder::new()
        .competition(Competition::Bertrand)
        .build()
        .unwrap();
    let mut cache = TableCache::default();
    let result = SimulationRun::new(&config, 0, &mut cache);
    assert!(matches!(
        result,
        Err(CollusimError::NotImplemented { .. })
    ));
}

#[test]
fn test_invalid_config_rejected_at_construction() {
    let mut config = small_config();
    config.alpha = 2.0;
    let mut cache = TableCache::default();
    assert!(SimulationRun::new(&config, 0, &mut cache).is_err());
}

#[test]
fn test_converged_counter_counts_quiet_periods() {
    // With a huge update interval only period 0 runs episodes; afterwards
    // every firm replays its quantity unchanged, so the converged counter
    // climbs by one per period starting at the second recorded period.
    let config = MarketConfigBuilder::new()
        .market_size(MarketSize::Duopoly)
        .timing(Timing::Discrete)
        .action_set_size(11)
        .update_interval(1000)
        .max_periods(100)
        .min_converged_periods(5)
        .history_window(10)
        .build()
        .unwrap();

    let mut cache = TableCache::default();
    let mut run = SimulationRun::new(&config, 1, &mut cache).unwrap();
    let summary = run.simulate().unwrap();

    assert_eq!(run.converged_periods(), 5);
    assert_eq!(summary.periods, 6);
}

#[test]
fn test_counter_resets_after_a_firm_moves() {
    // update_interval = 3: periods 0..2 carry period 0's quantities, then
    // period 3 runs fresh episodes. Exploration is still at epsilon = 1,
    // so the period-3 quantities change and the counter must reset.
    let config = MarketConfigBuilder::new()
        .market_size(MarketSize::Duopoly)
        .timing(Timing::Discrete)
        .action_set_size(101)
        .update_interval(3)
        .max_periods(100)
        .min_converged_periods(50)
        .history_window(10)
        .build()
        .unwrap();

    let mut cache = TableCache::default();
    let mut run = SimulationRun::new(&config, 1, &mut cache).unwrap();

    // quiet periods accumulate convergence
    for _ in 0..3 {
        run.step().unwrap();
    }
    assert_eq!(run.converged_periods(), 2);

    // episode period: quantities move, counter resets
    run.step().unwrap();
    assert_eq!(run.converged_periods(), 0);

    // the following quiet period counts again
    run.step().unwrap();
    assert_eq!(run.converged_periods(), 1);
}

#[test]
fn test_max_periods_caps_the_run() {
    let config = MarketConfigBuilder::new()
        .market_size(MarketSize::Duopoly)
        .action_set_size(11)
        .max_periods(40)
        .min_converged_periods(10_000)
        .history_window(20)
        .build()
        .unwrap();

    let mut cache = TableCache::default();
    let mut run = SimulationRun::new(&config, 3, &mut cache).unwrap();
    let summary = run.simulate().unwrap();
    assert_eq!(summary.periods, 40);
    assert_eq!(run.periods(), 40);
}

#[test]
fn test_same_seed_reproduces_identical_results() {
    let config = small_config();

    let mut cache = TableCache::default();
    let mut first = SimulationRun::new(&config, 42, &mut cache).unwrap();
    let a = first.simulate().unwrap();

    let mut cache = TableCache::default();
    let mut second = SimulationRun::new(&config, 42, &mut cache).unwrap();
    let b = second.simulate().unwrap();

    assert_eq!(a.periods, b.periods);
    assert_eq!(a.mean_price, b.mean_price);
    assert_eq!(a.sd_price, b.sd_price);
    assert_eq!(a.mean_quantity, b.mean_quantity);
    assert_eq!(a.mean_profit, b.mean_profit);
    assert_eq!(a.collusion_degree, b.collusion_degree);
}

#[test]
fn test_random_timing_is_deterministic_too() {
    let config = MarketConfigBuilder::new()
        .market_size(MarketSize::Triopoly)
        .timing(Timing::Random)
        .action_set_size(11)
        .beta(0.01)
        .max_periods(200)
        .min_converged_periods(50)
        .history_window(50)
        .build()
        .unwrap();

    let mut cache = TableCache::default();
    let a = SimulationRun::new(&config, 9, &mut cache)
        .unwrap()
        .simulate()
        .unwrap();
    let b = SimulationRun::new(&config, 9, &mut cache)
        .unwrap()
        .simulate()
        .unwrap();
    assert_eq!(a.mean_price, b.mean_price);
    assert_eq!(a.periods, b.periods);
}

#[test]
fn test_summary_pools_all_firm_histories() {
    let config = small_config();
    let mut cache = TableCache::default();
    let mut run = SimulationRun::new(&config, 5, &mut cache).unwrap();
    let summary = run.simulate().unwrap();

    let pooled: Vec<f64> = run
        .firms()
        .iter()
        .flat_map(|firm| firm.history().prices().iter().copied())
        .collect();
    assert_eq!(summary.mean_price, metrics::mean(&pooled).unwrap());

    let pooled_q: Vec<f64> = run
        .firms()
        .iter()
        .flat_map(|firm| firm.history().quantities().iter().copied())
        .collect();
    assert_eq!(summary.mean_quantity, metrics::mean(&pooled_q).unwrap());
}

#[test]
fn test_histories_bounded_by_window() {
    let config = small_config();
    let mut cache = TableCache::default();
    let mut run = SimulationRun::new(&config, 2, &mut cache).unwrap();
    run.simulate().unwrap();
    for firm in run.firms() {
        assert!(firm.history().len() <= 50);
        assert_eq!(firm.history().prices().len(), firm.history().profits().len());
    }
}
