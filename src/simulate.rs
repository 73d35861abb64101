//! Simulation harness for exercising the matching engine under realistic,
//! noisy market conditions.
//!
//! Feeds randomized orders straight into an in-process [`OrderBook`] to:
//! 1. Measure matching throughput (orders per second).
//! 2. Stress the crossing logic under stochastic order sizes, mid-price
//!    drift, and a mixed limit/market/cancel flow.
//!
//! ## Why these choices?
//! - **Gaussian drift** on the local mid-price mimics realistic volatility,
//!   so resting liquidity builds up at stale prices and gets swept.
//! - **Unit-exponential sizing** (`Exp1 * mean_qty`) yields heavy-tailed
//!   order sizes around `mean_qty`, producing plenty of partial fills.
//! - A small share of cancels keeps the cancel path honest under load.

use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, Normal};
use tracing::info;

use crate::orderbook::OrderBook;
use crate::orders::{LimitOrder, MarketOrder, Order, Price, Side};

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Total submissions to drive through the book.
    pub orders: u64,
    /// Starting mid-price the flow drifts around.
    pub mid_price: f64,
    /// Standard deviation of the per-order Gaussian mid-price drift.
    pub noise_sigma: f64,
    /// Average order size; each size is an `Exp(1)` draw times this.
    pub mean_qty: f64,
    /// Fixed seed for reproducible flow; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            orders: 100_000,
            mid_price: 100.0,
            noise_sigma: 0.5,
            mean_qty: 4.0,
            seed: None,
        }
    }
}

/// What came out of one simulation run.
#[derive(Debug, Clone)]
pub struct SimSummary {
    pub orders: u64,
    pub trades: usize,
    pub cancels: u64,
    pub elapsed: Duration,
    /// Orders still resting when the flow stopped.
    pub resting: usize,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
}

impl SimSummary {
    pub fn orders_per_sec(&self) -> f64 {
        self.orders as f64 / self.elapsed.as_secs_f64().max(f64::EPSILON)
    }
}

/// Drives `cfg.orders` randomized submissions through a fresh [`OrderBook`]
/// and reports what happened.
///
/// Roughly 5% of submissions cancel a random earlier order, 10% are market
/// orders, and the rest are limit orders quoted one tick away from the
/// drifting mid-price. Order ids double as submission timestamps, giving the
/// strictly increasing sequence the book expects.
///
/// # Errors
/// Fails only on invalid distribution parameters (negative `noise_sigma`).
pub fn run_simulation(cfg: &SimConfig) -> anyhow::Result<SimSummary> {
    let mut rng = match cfg.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let drift = Normal::new(0.0, cfg.noise_sigma)?;

    let mut book = OrderBook::new();
    let mut mid = cfg.mid_price;
    let mut trades = 0usize;
    let mut cancels = 0u64;
    let start = Instant::now();

    for n in 0..cfg.orders {
        let order_id = n + 1;
        mid = (mid + drift.sample(&mut rng)).max(2.0);
        let raw: f64 = Exp1.sample(&mut rng);
        let size = (raw * cfg.mean_qty).ceil().max(1.0) as u64;
        let side = if rng.random_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        };

        let order = if order_id > 1 && rng.random_bool(0.05) {
            cancels += 1;
            Order::Cancel {
                order_id: rng.random_range(1..order_id),
            }
        } else if rng.random_bool(0.1) {
            Order::Market(MarketOrder::new(order_id, side, size, order_id, order_id)?)
        } else {
            let spread = 1.0;
            let quote = match side {
                Side::Buy => mid - spread,
                Side::Sell => mid + spread,
            };
            let price = quote.round().max(1.0) as u64;
            Order::Limit(LimitOrder::new(
                order_id, side, size, price, order_id, order_id,
            )?)
        };

        trades += book.process_order(order).trades.len();
    }

    let elapsed = start.elapsed();
    info!(orders = cfg.orders, trades, ?elapsed, "simulation finished");

    Ok(SimSummary {
        orders: cfg.orders,
        trades,
        cancels,
        elapsed,
        resting: book.depth(),
        best_bid: book.best_bid(),
        best_ask: book.best_ask(),
    })
}
