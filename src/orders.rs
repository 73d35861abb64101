use serde::{Deserialize, Serialize};

use crate::errors::InvalidOrder;

/// Caller-assigned identifier, unique among currently-live orders in one book.
pub type OrderId = u64;
/// Opaque identifier of the submitting party, used only for trade attribution.
pub type TraderId = u64;
/// Price in ticks.
pub type Price = u64;
/// Quantity in units.
pub type Qty = u64;
/// Submission time in microseconds, or any strictly increasing sequence.
pub type Timestamp = u64;

/// Represents which side of the market the order is on.
///
/// # Intuition
/// - `Buy` (Bid): buyers rank from **highest to lowest price**; paying more
///   is more aggressive.
/// - `Sell` (Ask): sellers rank from **lowest to highest price**; asking less
///   is more aggressive.
///
/// This ranking ensures the matching engine always finds the **best price
/// first**: buyers match the lowest ask, sellers match the highest bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,  // Bid
    Sell, // Ask
}

/// Encoding tag for a [`Signature`], as produced by the upstream order
/// creation layer. The engine treats it as an opaque label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureScheme {
    /// EIP-712 typed-data signature.
    #[default]
    Eip712,
    /// Plain `eth_sign` over the order hash.
    EthSign,
}

/// Authentication payload attached by the caller and carried through to both
/// sides of a trade unmodified. The engine neither validates nor interprets
/// any of these fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub scheme: SignatureScheme,
    pub v: u8,
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// An order that executes immediately at whatever price resting liquidity
/// offers. It never rests in the book: whatever cannot be filled is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub order_id: OrderId,
    pub side: Side,
    /// Original requested quantity; immutable after creation.
    pub size: Qty,
    /// Quantity not yet matched. `0 <= remaining <= size` always holds.
    pub remaining: Qty,
    pub trader_id: TraderId,
    pub submitted_at: Timestamp,
    pub signature: Signature,
}

impl MarketOrder {
    pub fn new(
        order_id: OrderId,
        side: Side,
        size: Qty,
        trader_id: TraderId,
        submitted_at: Timestamp,
    ) -> Result<Self, InvalidOrder> {
        if size == 0 {
            return Err(InvalidOrder::ZeroSize);
        }
        Ok(Self {
            order_id,
            side,
            size,
            remaining: size,
            trader_id,
            submitted_at,
            signature: Signature::default(),
        })
    }

    /// Attaches an authentication payload after construction.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }
}

/// An order that executes at its `price` or better, and rests in the book if
/// not fully filled on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub order_id: OrderId,
    pub side: Side,
    /// Original requested quantity; immutable after creation.
    pub size: Qty,
    pub price: Price,
    /// Quantity not yet matched. `0 <= remaining <= size` always holds.
    pub remaining: Qty,
    pub trader_id: TraderId,
    pub submitted_at: Timestamp,
    pub signature: Signature,
}

impl LimitOrder {
    pub fn new(
        order_id: OrderId,
        side: Side,
        size: Qty,
        price: Price,
        trader_id: TraderId,
        submitted_at: Timestamp,
    ) -> Result<Self, InvalidOrder> {
        if size == 0 {
            return Err(InvalidOrder::ZeroSize);
        }
        if price == 0 {
            return Err(InvalidOrder::ZeroPrice);
        }
        Ok(Self {
            order_id,
            side,
            size,
            price,
            remaining: size,
            trader_id,
            submitted_at,
            signature: Signature::default(),
        })
    }

    /// Attaches an authentication payload after construction.
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    /// The placement key for this order on its own side of the book.
    pub fn key(&self) -> BookKey {
        BookKey::new(self.side, self.price, self.submitted_at, self.order_id)
    }
}

/// An order submitted to the matching engine.
///
/// The engine dispatches on the variant:
/// - `Cancel` is a removal instruction for a resting order, not an order of
///   its own; an unknown id is a no-op.
/// - `Market` crosses against any available opposite liquidity and never
///   rests.
/// - `Limit` crosses while its price allows and rests any remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Cancel { order_id: OrderId },
    Market(MarketOrder),
    Limit(LimitOrder),
}

impl Order {
    pub fn order_id(&self) -> OrderId {
        match self {
            Order::Cancel { order_id } => *order_id,
            Order::Market(order) => order.order_id,
            Order::Limit(order) => order.order_id,
        }
    }
}

/// Book placement key defining the total order within one side.
///
/// Compares lexicographically over `(rank, submitted_at, order_id)`:
/// - `rank` is the raw price for sells and the flipped price
///   (`Price::MAX - price`) for buys, so on either side the minimum key is
///   the best-priced order.
/// - `submitted_at` gives time priority among equal prices.
/// - `order_id` breaks any remaining tie, keeping the order strict even when
///   timestamps collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BookKey {
    rank: Price,
    submitted_at: Timestamp,
    order_id: OrderId,
}

impl BookKey {
    pub fn new(side: Side, price: Price, submitted_at: Timestamp, order_id: OrderId) -> Self {
        let rank = match side {
            Side::Buy => Price::MAX - price,
            Side::Sell => price,
        };
        Self {
            rank,
            submitted_at,
            order_id,
        }
    }
}
