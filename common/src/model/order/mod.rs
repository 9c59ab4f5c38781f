//! Order model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Amount, Price, Quantity};
use crate::model::currency::CurrencyPair;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// A limit order with the funds backing it held in reserve
///
/// Orders are normally opened through the ledger service, which reserves the
/// backing funds before the order exists; the escrow field carries the
/// reserved quote-currency value for buy orders and stays zero for sells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID, used for all book lookups and removals
    pub id: Uuid,
    /// Owning client ID
    pub client: Uuid,
    /// Instrument this order trades
    pub pair: CurrencyPair,
    /// Order side (buy or sell)
    pub side: Side,
    /// Limit price in the quote currency
    pub price: Price,
    /// Unfilled base-currency quantity
    pub remaining: Quantity,
    /// Quote-currency funds still held against the unfilled remainder
    pub escrow: Amount,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order record
    ///
    /// The caller is responsible for having reserved the funds this order
    /// represents; see the ledger service's open_order.
    pub fn new(
        client: Uuid,
        pair: CurrencyPair,
        side: Side,
        price: Price,
        remaining: Quantity,
        escrow: Amount,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client,
            pair,
            side,
            price,
            remaining,
            escrow,
            created_at: Utc::now(),
        }
    }

    /// Check if the order is fully filled
    pub fn is_filled(&self) -> bool {
        self.remaining.is_zero()
    }
}
