use serde::Serialize;
use tracing::debug;

use crate::{
    orders::{BookKey, LimitOrder, Order, OrderId, Price, Qty, Side, Signature, TraderId},
    skiplist::SkipList,
    trade::Trade,
};

/// An [`OrderBook`] stores **active** limit orders in two skip-list indexes:
/// - `bids` (buy orders): best = highest price, then earliest submission
/// - `asks` (sell orders): best = lowest price, then earliest submission
///
/// Both sides share one key scheme ([`BookKey`]) whose minimum is the side's
/// best order, so matching always pops from the front of the opposite index.
/// The book also owns the append-only trade log; callers hand it to a
/// settlement layer via [`OrderBook::drain_trades`].
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: SkipList<BookKey, LimitOrder>,
    asks: SkipList<BookKey, LimitOrder>,
    trades: Vec<Trade>,
}

/// Where an order ended up after one [`OrderBook::process_order`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    /// Fully matched; nothing rests.
    Filled,
    /// Limit remainder was inserted into the book.
    Resting,
    /// Market order ran out of opposite liquidity; the remainder is dropped,
    /// not rested. A non-zero `remaining` signals a partial fill.
    Exhausted,
    /// Cancel removed a resting order.
    Cancelled,
    /// Cancel matched no live order. A no-op, not an error.
    NotFound,
}

/// Outcome of one `process_order` call: the trades it produced, in matching
/// order, and the submitted order's post-call state.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    pub order_id: OrderId,
    pub status: OrderStatus,
    /// Quantity left unmatched; 0 unless `Resting`, `Exhausted`, or
    /// `Cancelled` (where it is the cancelled order's unfilled quantity).
    pub remaining: Qty,
    pub trades: Vec<Trade>,
}

/// Side-independent view of an order while it crosses the book.
struct Incoming {
    order_id: OrderId,
    side: Side,
    /// `None` for market orders, which cross at any price.
    limit: Option<Price>,
    remaining: Qty,
    trader_id: TraderId,
    signature: Signature,
}

impl OrderBook {
    /// Creates a new, empty [`OrderBook`] with no active bids or asks.
    pub fn new() -> Self {
        Self {
            bids: SkipList::new(),
            asks: SkipList::new(),
            trades: Vec::new(),
        }
    }

    /// Processes one order to completion against the book.
    ///
    /// # Behavior
    /// - `Cancel`: removes the matching resting order from whichever side
    ///   holds it; an unknown id is reported as [`OrderStatus::NotFound`]
    ///   and mutates nothing.
    /// - `Market`: crosses against the opposite side while any liquidity
    ///   remains; an unfilled remainder is dropped, never rested.
    /// - `Limit`: crosses while its limit price is satisfied by the best
    ///   opposite price; any remainder rests on its own side.
    ///
    /// Emitted trades are appended to the owned trade log and also returned
    /// in the report.
    pub fn process_order(&mut self, order: Order) -> ExecutionReport {
        let report = match order {
            Order::Cancel { order_id } => self.cancel(order_id),
            Order::Market(market) => {
                debug!(
                    order_id = market.order_id,
                    side = ?market.side,
                    size = market.size,
                    "processing market order"
                );
                let mut incoming = Incoming {
                    order_id: market.order_id,
                    side: market.side,
                    limit: None,
                    remaining: market.remaining,
                    trader_id: market.trader_id,
                    signature: market.signature,
                };
                let trades = self.cross(&mut incoming);
                let status = if incoming.remaining == 0 {
                    OrderStatus::Filled
                } else {
                    OrderStatus::Exhausted
                };
                ExecutionReport {
                    order_id: market.order_id,
                    status,
                    remaining: incoming.remaining,
                    trades,
                }
            }
            Order::Limit(mut limit) => {
                debug!(
                    order_id = limit.order_id,
                    side = ?limit.side,
                    size = limit.size,
                    price = limit.price,
                    "processing limit order"
                );
                let mut incoming = Incoming {
                    order_id: limit.order_id,
                    side: limit.side,
                    limit: Some(limit.price),
                    remaining: limit.remaining,
                    trader_id: limit.trader_id,
                    signature: limit.signature,
                };
                let trades = self.cross(&mut incoming);
                limit.remaining = incoming.remaining;
                let status = if limit.remaining == 0 {
                    OrderStatus::Filled
                } else {
                    self.side_mut(limit.side).insert(limit.key(), limit);
                    OrderStatus::Resting
                };
                ExecutionReport {
                    order_id: limit.order_id,
                    status,
                    remaining: limit.remaining,
                    trades,
                }
            }
        };
        debug_assert!(self.is_uncrossed(), "book left resting in a crossed state");
        report
    }

    /// Price of the best (highest) resting bid, if any. O(1).
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.front().map(|(_, order)| order.price)
    }

    /// Price of the best (lowest) resting ask, if any. O(1).
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.front().map(|(_, order)| order.price)
    }

    /// Resting buy orders in priority order (best first), for depth
    /// snapshots.
    pub fn bids(&self) -> impl Iterator<Item = &LimitOrder> {
        self.bids.iter().map(|(_, order)| order)
    }

    /// Resting sell orders in priority order (best first), for depth
    /// snapshots.
    pub fn asks(&self) -> impl Iterator<Item = &LimitOrder> {
        self.asks.iter().map(|(_, order)| order)
    }

    /// Number of resting orders across both sides.
    pub fn depth(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    /// Read access to the accumulated trade log.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Hands the accumulated trades to the caller (e.g. a settlement
    /// packager), leaving the log empty.
    pub fn drain_trades(&mut self) -> Vec<Trade> {
        std::mem::take(&mut self.trades)
    }

    /// Crosses `incoming` against the opposite side until the book can no
    /// longer satisfy it or it is exhausted.
    ///
    /// # Notes
    /// - The fill quantity is `min(incoming.remaining, resting.remaining)`,
    ///   so neither order can be overfilled.
    /// - Trades execute at the **resting** order's price.
    /// - A resting order left with remainder goes back under its original
    ///   key, keeping its time priority; the incoming order is necessarily
    ///   exhausted in that case and the loop ends.
    fn cross(&mut self, incoming: &mut Incoming) -> Vec<Trade> {
        let mut trades = Vec::new();
        while incoming.remaining > 0 {
            let opposite = match incoming.side {
                Side::Buy => &self.asks,
                Side::Sell => &self.bids,
            };
            let Some((_, best)) = opposite.front() else {
                break;
            };
            if let Some(limit) = incoming.limit {
                let crossed = match incoming.side {
                    Side::Buy => limit >= best.price,
                    Side::Sell => limit <= best.price,
                };
                if !crossed {
                    break;
                }
            }
            let popped = match incoming.side {
                Side::Buy => self.asks.pop_front(),
                Side::Sell => self.bids.pop_front(),
            };
            let Some((_, mut resting)) = popped else {
                break;
            };

            let volume = incoming.remaining.min(resting.remaining);
            incoming.remaining -= volume;
            resting.remaining -= volume;

            let (buyer, seller) = match incoming.side {
                Side::Buy => (
                    (incoming.trader_id, incoming.signature),
                    (resting.trader_id, resting.signature),
                ),
                Side::Sell => (
                    (resting.trader_id, resting.signature),
                    (incoming.trader_id, incoming.signature),
                ),
            };
            debug!(
                taker = incoming.order_id,
                maker = resting.order_id,
                price = resting.price,
                volume,
                "emitting trade"
            );
            trades.push(Trade {
                taker_order_id: incoming.order_id,
                maker_order_id: resting.order_id,
                taker_side: incoming.side,
                price: resting.price,
                size: volume,
                buyer_id: buyer.0,
                seller_id: seller.0,
                buyer_signature: buyer.1,
                seller_signature: seller.1,
            });

            if resting.remaining > 0 {
                // the resting order was the larger one; the incoming order
                // is spent, so the remainder goes back at its old priority
                debug_assert_eq!(incoming.remaining, 0);
                let key = resting.key();
                self.side_mut(resting.side).insert(key, resting);
                break;
            }
        }
        self.trades.extend_from_slice(&trades);
        trades
    }

    /// Removes the resting order with `order_id`, if any. Scans bids first,
    /// then asks; by invariant at most one side can hold the id.
    fn cancel(&mut self, order_id: OrderId) -> ExecutionReport {
        let removed = self
            .remove_by_id(Side::Buy, order_id)
            .or_else(|| self.remove_by_id(Side::Sell, order_id));
        match removed {
            Some(order) => {
                debug!(order_id, remaining = order.remaining, "cancelled resting order");
                ExecutionReport {
                    order_id,
                    status: OrderStatus::Cancelled,
                    remaining: order.remaining,
                    trades: Vec::new(),
                }
            }
            None => {
                debug!(order_id, "cancel target not found");
                ExecutionReport {
                    order_id,
                    status: OrderStatus::NotFound,
                    remaining: 0,
                    trades: Vec::new(),
                }
            }
        }
    }

    fn remove_by_id(&mut self, side: Side, order_id: OrderId) -> Option<LimitOrder> {
        let index = self.side_mut(side);
        let key = index
            .iter()
            .find(|(_, order)| order.order_id == order_id)
            .map(|(key, _)| *key)?;
        index.remove(&key)
    }

    fn side_mut(&mut self, side: Side) -> &mut SkipList<BookKey, LimitOrder> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn is_uncrossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid < ask,
            _ => true,
        }
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

//tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{MarketOrder, SignatureScheme};

    fn limit(id: u64, side: Side, size: u64, price: u64) -> Order {
        // the id doubles as the submission timestamp, so ascending ids give
        // ascending time priority
        Order::Limit(LimitOrder::new(id, side, size, price, 1_000 + id, id).unwrap())
    }

    fn market(id: u64, side: Side, size: u64) -> Order {
        Order::Market(MarketOrder::new(id, side, size, 1_000 + id, id).unwrap())
    }

    /// Tests a market buy order that partially fills against multiple sell
    /// orders across two price levels.
    #[test]
    fn test_partial_fill_market_buy() {
        let mut ob = OrderBook::new();

        ob.process_order(limit(1, Side::Sell, 5, 101));
        ob.process_order(limit(2, Side::Sell, 3, 102));

        let report = ob.process_order(market(100, Side::Buy, 6));

        assert_eq!(report.status, OrderStatus::Filled);
        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].size, 5);
        assert_eq!(report.trades[0].price, 101);
        assert_eq!(report.trades[1].size, 1);
        assert_eq!(report.trades[1].price, 102);

        let remaining: Vec<_> = ob.asks().collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].order_id, 2);
        assert_eq!(remaining[0].remaining, 2);
    }

    /// Tests a market sell order that exhausts the bid side and reports the
    /// unfilled remainder without resting it.
    #[test]
    fn test_partial_fill_market_sell() {
        let mut ob = OrderBook::new();

        ob.process_order(limit(1, Side::Buy, 4, 100));

        let report = ob.process_order(market(200, Side::Sell, 10));

        assert_eq!(report.status, OrderStatus::Exhausted);
        assert_eq!(report.remaining, 6);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].size, 4);
        assert_eq!(report.trades[0].price, 100);
        assert_eq!(ob.best_bid(), None);
        assert_eq!(ob.depth(), 0);
    }

    /// Tests that a market order against an empty book produces no trades,
    /// keeps its full remaining, and leaves the book untouched.
    #[test]
    fn test_market_order_on_empty_book_is_exhausted() {
        let mut ob = OrderBook::new();

        let report = ob.process_order(market(300, Side::Buy, 20));

        assert!(report.trades.is_empty());
        assert_eq!(report.status, OrderStatus::Exhausted);
        assert_eq!(report.remaining, 20);
        assert_eq!(ob.depth(), 0);
    }

    /// Tests resting a limit order and then clearing it with an exactly
    /// matching counter-order, leaving both sides empty.
    #[test]
    fn test_exact_match_empties_both_sides() {
        let mut ob = OrderBook::new();

        let report = ob.process_order(limit(1, Side::Buy, 10, 100));
        assert!(report.trades.is_empty());
        assert_eq!(report.status, OrderStatus::Resting);
        assert_eq!(ob.best_bid(), Some(100));

        let report = ob.process_order(limit(2, Side::Sell, 10, 100));
        assert_eq!(report.status, OrderStatus::Filled);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].price, 100);
        assert_eq!(report.trades[0].size, 10);
        assert_eq!(ob.best_bid(), None);
        assert_eq!(ob.best_ask(), None);
    }

    /// Tests a crossing limit sell that fills at the resting bid's price and
    /// rests its remainder on the ask side at its own price.
    #[test]
    fn test_limit_order_partial_match_and_remainder_rests() {
        let mut ob = OrderBook::new();

        ob.process_order(limit(1, Side::Buy, 5, 100));

        let report = ob.process_order(limit(2, Side::Sell, 8, 99));

        assert_eq!(report.status, OrderStatus::Resting);
        assert_eq!(report.remaining, 3);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].price, 100);
        assert_eq!(report.trades[0].size, 5);
        assert_eq!(ob.best_bid(), None);
        assert_eq!(ob.best_ask(), Some(99));
    }

    /// Tests a limit buy with no crossing liquidity going straight to the
    /// book.
    #[test]
    fn test_limit_order_no_match_goes_to_book() {
        let mut ob = OrderBook::new();

        let report = ob.process_order(limit(10, Side::Buy, 8, 90));

        assert!(report.trades.is_empty());
        assert_eq!(report.status, OrderStatus::Resting);
        assert_eq!(ob.best_bid(), Some(90));
        assert_eq!(ob.depth(), 1);
    }

    /// Tests that time priority is respected between orders resting at the
    /// same price.
    #[test]
    fn test_queue_fairness_fifo_fill_order() {
        let mut ob = OrderBook::new();

        ob.process_order(limit(1, Side::Sell, 4, 100));
        ob.process_order(limit(2, Side::Sell, 6, 100));

        let report = ob.process_order(market(3, Side::Buy, 9));

        assert_eq!(report.trades.len(), 2);
        assert_eq!(report.trades[0].maker_order_id, 1);
        assert_eq!(report.trades[0].size, 4);
        assert_eq!(report.trades[1].maker_order_id, 2);
        assert_eq!(report.trades[1].size, 5);

        let remaining: Vec<_> = ob.asks().collect();
        assert_eq!(remaining[0].order_id, 2);
        assert_eq!(remaining[0].remaining, 1);
    }

    /// Tests that equal submission timestamps fall back to the order id for
    /// priority.
    #[test]
    fn test_clock_collision_falls_back_to_order_id() {
        let mut ob = OrderBook::new();

        // same price, same timestamp, distinct ids
        ob.process_order(Order::Limit(
            LimitOrder::new(8, Side::Sell, 1, 100, 1, 77).unwrap(),
        ));
        ob.process_order(Order::Limit(
            LimitOrder::new(3, Side::Sell, 1, 100, 2, 77).unwrap(),
        ));

        let report = ob.process_order(market(9, Side::Buy, 1));
        assert_eq!(report.trades[0].maker_order_id, 3);
    }

    /// Tests that a limit buy above the best ask matches at the ask's price
    /// instead of resting (price improvement goes to the taker).
    #[test]
    fn test_crossing_limit_buy_fills_at_maker_price() {
        let mut ob = OrderBook::new();

        ob.process_order(limit(1, Side::Sell, 5, 105));

        let report = ob.process_order(limit(2, Side::Buy, 3, 110));

        assert_eq!(report.status, OrderStatus::Filled);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].price, 105);
        assert_eq!(report.trades[0].size, 3);

        let remaining: Vec<_> = ob.asks().collect();
        assert_eq!(remaining[0].remaining, 2);
        assert_eq!(ob.best_bid(), None);
    }

    /// Tests buyer/seller attribution and signature carry-through for an
    /// incoming sell: the resting bid is the buyer, the taker the seller.
    #[test]
    fn test_trade_attribution_for_incoming_sell() {
        let mut ob = OrderBook::new();

        let maker_sig = Signature {
            scheme: SignatureScheme::Eip712,
            v: 27,
            r: [1; 32],
            s: [2; 32],
        };
        let taker_sig = Signature {
            scheme: SignatureScheme::EthSign,
            v: 28,
            r: [3; 32],
            s: [4; 32],
        };
        ob.process_order(Order::Limit(
            LimitOrder::new(1, Side::Buy, 5, 100, 501, 1)
                .unwrap()
                .with_signature(maker_sig),
        ));
        let report = ob.process_order(Order::Market(
            MarketOrder::new(2, Side::Sell, 5, 502, 2)
                .unwrap()
                .with_signature(taker_sig),
        ));

        let trade = report.trades[0];
        assert_eq!(trade.taker_order_id, 2);
        assert_eq!(trade.maker_order_id, 1);
        assert_eq!(trade.taker_side, Side::Sell);
        assert_eq!(trade.buyer_id, 501);
        assert_eq!(trade.seller_id, 502);
        assert_eq!(trade.buyer_signature, maker_sig);
        assert_eq!(trade.seller_signature, taker_sig);
    }

    #[test]
    fn test_cancel_existing_order() {
        let mut ob = OrderBook::new();
        ob.process_order(limit(42, Side::Buy, 10, 101));

        let report = ob.process_order(Order::Cancel { order_id: 42 });

        assert_eq!(report.status, OrderStatus::Cancelled);
        assert_eq!(report.remaining, 10);
        assert!(report.trades.is_empty());
        assert_eq!(ob.best_bid(), None);
        assert_eq!(ob.depth(), 0);
    }

    /// Tests that cancelling an unknown id, or the same id twice, is a
    /// silent no-op.
    #[test]
    fn test_cancel_is_idempotent() {
        let mut ob = OrderBook::new();
        ob.process_order(limit(1, Side::Sell, 5, 99));

        assert_eq!(
            ob.process_order(Order::Cancel { order_id: 999 }).status,
            OrderStatus::NotFound
        );

        let first = ob.process_order(Order::Cancel { order_id: 1 });
        assert_eq!(first.status, OrderStatus::Cancelled);
        let second = ob.process_order(Order::Cancel { order_id: 1 });
        assert_eq!(second.status, OrderStatus::NotFound);
        assert!(second.trades.is_empty());
    }

    /// Tests that the trade log accumulates across calls and empties on
    /// drain.
    #[test]
    fn test_trade_log_accumulates_and_drains() {
        let mut ob = OrderBook::new();

        ob.process_order(limit(1, Side::Sell, 4, 100));
        ob.process_order(limit(2, Side::Sell, 6, 101));
        ob.process_order(market(3, Side::Buy, 6));

        assert_eq!(ob.trades().len(), 2);

        let drained = ob.drain_trades();
        assert_eq!(drained.len(), 2);
        assert!(ob.trades().is_empty());

        ob.process_order(limit(4, Side::Buy, 6, 101));
        assert_eq!(ob.trades().len(), 1);
    }
}
