//! Cournot payoff model.
//!
//! Pure functions mapping output quantities to market price and firm profit
//! under a linear inverse-demand calibration shared by the two- and
//! three-firm markets. Quantities are rescaled per market size so that
//! profit levels stay comparable across sizes.

use crate::config::MarketSize;

/// Demand intercept
pub const OMEGA: f64 = 100.0;
/// Demand slope
pub const LAMBDA: f64 = 1.0;
/// Substitutability of competitor output
pub const THETA: f64 = 2.0 / 3.0;

/// Price at which joint profit is maximized, both market sizes
pub const JOINT_PROFIT_MAX_PRICE: f64 = 50.0;

const DUO_QUANTITY_SCALE: f64 = 60.0 / 100.0;
const TRIO_QUANTITY_SCALE: f64 = 300.0 / 700.0;
const DUO_PROFIT_SCALE: f64 = 1.0;
const TRIO_PROFIT_SCALE: f64 = 1.5625;

/// Market price in a two-firm market
pub fn duo_price(q: f64, q_other: f64) -> f64 {
    let q = q * DUO_QUANTITY_SCALE;
    let q_other = q_other * DUO_QUANTITY_SCALE;
    OMEGA - LAMBDA * (q + THETA * q_other)
}

/// Firm profit in a two-firm market
pub fn duo_profit(price: f64, q: f64) -> f64 {
    price * q * DUO_PROFIT_SCALE
}

/// Market price in a three-firm market
pub fn trio_price(q: f64, q_other_1: f64, q_other_2: f64) -> f64 {
    let q = q * TRIO_QUANTITY_SCALE;
    let q_other_1 = q_other_1 * TRIO_QUANTITY_SCALE;
    let q_other_2 = q_other_2 * TRIO_QUANTITY_SCALE;
    OMEGA - LAMBDA * (q + THETA * (q_other_1 + q_other_2))
}

/// Firm profit in a three-firm market
pub fn trio_profit(price: f64, q: f64) -> f64 {
    price * q * TRIO_PROFIT_SCALE
}

/// Market price for own quantity `q` against competitor quantities.
///
/// `others` must hold exactly `market_size.competitors()` entries; the
/// orchestration layer builds it by index position, so the slice length is
/// correct by construction.
pub fn price(market_size: MarketSize, q: f64, others: &[f64]) -> f64 {
    match market_size {
        MarketSize::Duopoly => duo_price(q, others[0]),
        MarketSize::Triopoly => trio_price(q, others[0], others[1]),
    }
}

/// Firm profit for the given realized price and own quantity
pub fn profit(market_size: MarketSize, price: f64, q: f64) -> f64 {
    match market_size {
        MarketSize::Duopoly => duo_profit(price, q),
        MarketSize::Triopoly => trio_profit(price, q),
    }
}

/// Benchmark price under non-cooperative (Nash) play
pub fn nash_price(market_size: MarketSize) -> f64 {
    match market_size {
        MarketSize::Duopoly => 37.5,
        MarketSize::Triopoly => 30.0,
    }
}

/// Normalized position of a realized mean price between the Nash benchmark
/// (0) and the joint-profit-maximizing price (1).
pub fn collusion_degree(mean_price: f64, market_size: MarketSize) -> f64 {
    let nash = nash_price(market_size);
    (mean_price - nash) / (JOINT_PROFIT_MAX_PRICE - nash)
}
