use serde::{Deserialize, Serialize};

use crate::orders::{OrderId, Price, Qty, Side, Signature, TraderId};

/// A trade represents a matched transaction between two orders.
///
/// # Terminology
/// - **Maker**: the order that was already resting in the book (providing
///   liquidity) when the trade occurred.
/// - **Taker**: the incoming order that triggered the trade (taking
///   liquidity).
///
/// # Behavior
/// - The trade always executes at the **maker's price**; an incoming order
///   that crossed deeper than necessary keeps the improvement.
/// - Partial fills may occur: one incoming order can produce several trades.
/// - Both parties' authentication payloads ride along unmodified so a
///   downstream settlement layer can package the fill without another
///   lookup.
///
/// Trades are append-only: once created they are never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub taker_order_id: OrderId,
    pub maker_order_id: OrderId,
    /// Side of the incoming (taker) order.
    pub taker_side: Side,
    /// The resting (maker) order's quoted price.
    pub price: Price,
    /// Matched quantity; never exceeds either order's remaining at match
    /// time.
    pub size: Qty,
    pub buyer_id: TraderId,
    pub seller_id: TraderId,
    pub buyer_signature: Signature,
    pub seller_signature: Signature,
}
