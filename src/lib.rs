//! A price-time-priority order matching engine.
//!
//! Orders (market, limit, cancel) are submitted one at a time to an
//! [`orderbook::OrderBook`], which crosses them against resting liquidity on
//! skip-list price indexes and emits [`trade::Trade`]s at the resting
//! order's price. The engine is single-threaded by design: one call runs to
//! completion before the next, and the caller owns transport, persistence,
//! and settlement.

pub mod cli;
pub mod errors;
pub mod orderbook;
pub mod orders;
pub mod simulate;
pub mod skiplist;
pub mod trade;
pub mod utils;
