use crate::config::{Competition, MarketConfig, MarketConfigBuilder, MarketSize};
use crate::firm::{Firm, FirmHistory};
use crate::payoff;
use crate::qtable::{cold_start, QTable};

fn make_firm(config: &MarketConfig, seed: u64) -> Firm {
    let values = cold_start(config.competition, config.action_set_size, config.market_size)
        .unwrap();
    Firm::new(0, config, QTable::new(config, values, seed))
}

fn duopoly_config() -> MarketConfig {
    MarketConfigBuilder::new()
        .market_size(MarketSize::Duopoly)
        .action_set_size(11)
        .history_window(3)
        .build()
        .unwrap()
}

fn triopoly_config(gamma: f64) -> MarketConfig {
    MarketConfigBuilder::new()
        .market_size(MarketSize::Triopoly)
        .action_set_size(21)
        .gamma(gamma)
        .build()
        .unwrap()
}

#[test]
fn test_history_evicts_oldest_first() {
    let mut history = FirmHistory::new(3);
    for i in 0..5 {
        history.push(i as f64, i as f64 * 10.0, i as f64 * 100.0);
    }
    assert_eq!(history.len(), 3);
    assert_eq!(history.prices().front(), Some(&2.0));
    assert_eq!(history.quantities().front(), Some(&20.0));
    assert_eq!(history.profits().front(), Some(&200.0));
    // the three sequences stay in lockstep
    assert_eq!(history.prices().len(), history.quantities().len());
    assert_eq!(history.quantities().len(), history.profits().len());
}

#[test]
fn test_state_is_quantity_under_cournot() {
    let config = duopoly_config();
    let mut firm = make_firm(&config, 0);
    firm.set_state(7.0);
    assert_eq!(firm.state(), 7.0);
    assert_eq!(firm.quantity, 7.0);
}

#[test]
fn test_record_period_matches_payoff_model() {
    let config = duopoly_config();
    let mut firm = make_firm(&config, 0);
    firm.set_state(10.0);
    firm.record_period(&[20.0]).unwrap();

    let price = payoff::duo_price(10.0, 20.0);
    assert_eq!(firm.price, price);
    assert_eq!(firm.profit, payoff::duo_profit(price, 10.0));
    assert_eq!(firm.history().len(), 1);
}

#[test]
fn test_convergence_needs_two_periods() {
    let config = duopoly_config();
    let mut firm = make_firm(&config, 0);
    assert!(!firm.has_converged());

    firm.set_state(5.0);
    firm.record_period(&[5.0]).unwrap();
    assert!(!firm.has_converged());

    firm.record_period(&[5.0]).unwrap();
    assert!(firm.has_converged());
}

#[test]
fn test_convergence_respects_threshold() {
    let config = MarketConfigBuilder::new()
        .market_size(MarketSize::Duopoly)
        .action_set_size(11)
        .convergence_threshold(0.5)
        .build()
        .unwrap();
    let mut firm = make_firm(&config, 0);

    firm.set_state(5.0);
    firm.record_period(&[5.0]).unwrap();
    firm.set_state(5.4);
    firm.record_period(&[5.0]).unwrap();
    assert!(firm.has_converged());

    firm.set_state(6.0);
    firm.record_period(&[5.0]).unwrap();
    assert!(!firm.has_converged());
}

#[test]
fn test_episode_returns_action_in_range() {
    let config = duopoly_config();
    let mut firm = make_firm(&config, 9);
    for _ in 0..50 {
        let q = firm.run_episode(&[3.0]).unwrap();
        assert_eq!(q, q.floor());
        assert!((0.0..11.0).contains(&q));
    }
    assert_eq!(firm.table().episodes, 50);
}

#[test]
fn test_duopoly_state_is_floored_competitor_quantity() {
    let config = duopoly_config();
    let firm = make_firm(&config, 0);
    let (state, discretized) = firm.discretize_state(&[7.9]);
    assert_eq!(state, 7);
    assert_eq!(discretized, vec![7.0]);

    // values outside the table clamp into range
    let (state, _) = firm.discretize_state(&[99.0]);
    assert_eq!(state, 10);
}

#[test]
fn test_triopoly_state_weighting() {
    // gamma = 1 puts full weight on the lower competitor when they differ
    let config = triopoly_config(1.0);
    let firm = make_firm(&config, 0);
    let (state, discretized) = firm.discretize_state(&[10.0, 16.0]);
    assert_eq!(state, 5); // round(10 / 2)
    assert_eq!(discretized, vec![10.0, 16.0]);

    // reversed order flips which side gets the weight
    let (state, _) = firm.discretize_state(&[16.0, 10.0]);
    assert_eq!(state, 5);

    // equal quantities average plainly
    let (state, _) = firm.discretize_state(&[10.0, 10.0]);
    assert_eq!(state, 10);
}

#[test]
fn test_triopoly_state_intermediate_gamma() {
    let config = triopoly_config(0.25);
    let firm = make_firm(&config, 0);
    // s1 < s2: (0.25 * 8 + 0.75 * 12) / 2 = 5.5, rounds to 6
    let (state, _) = firm.discretize_state(&[8.0, 12.0]);
    assert_eq!(state, 6);
}

#[test]
fn test_bertrand_episode_is_unimplemented() {
    let config = MarketConfigBuilder::new()
        .competition(Competition::Bertrand)
        .build()
        .unwrap();
    let values = ndarray::Array2::zeros((101, 101));
    let mut firm = Firm::new(0, &config, QTable::new(&config, values, 0));
    assert!(firm.run_episode(&[1.0]).is_err());
    assert!(firm.record_period(&[1.0]).is_err());
}
