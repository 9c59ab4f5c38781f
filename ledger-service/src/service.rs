//! Ledger service implementation

use std::collections::HashMap;
use std::sync::Arc;

use common::decimal::{normalize, Amount, Price, Quantity};
use common::error::{Error, ErrorExt, Result};
use common::model::currency::{Currency, CurrencyPair};
use common::model::order::{Order, Side};
use tracing::{debug, info};
use uuid::Uuid;

use crate::store::BalanceStore;

/// Ledger service owning client balances and the fund side of the order
/// lifecycle
///
/// Orders are opened, filled and revoked through this service so that every
/// balance movement happens in the same step as the order mutation it
/// settles. Fund sufficiency is checked once, at open time; fills draw on
/// the reserved escrow and never re-check balances.
pub struct LedgerService {
    /// Balance cells
    store: Arc<BalanceStore>,
}

impl LedgerService {
    /// Create a new ledger service with an empty store
    pub fn new() -> Self {
        info!("Creating ledger service");
        Self {
            store: Arc::new(BalanceStore::new()),
        }
    }

    /// Shared access to the underlying balance store
    pub fn store(&self) -> Arc<BalanceStore> {
        self.store.clone()
    }

    /// Credit a client's balance
    pub fn deposit(&self, client: Uuid, currency: Currency, amount: Amount) {
        info!("Depositing {} {} to client {}", amount, currency, client);
        self.store.deposit(client, currency, amount);
    }

    /// Current balance of a client in one currency
    pub fn balance(&self, client: Uuid, currency: Currency) -> Amount {
        self.store.balance(client, currency)
    }

    /// Point-in-time copy of all of a client's balances
    pub fn snapshot(&self, client: Uuid) -> HashMap<Currency, Amount> {
        self.store.snapshot(client)
    }

    /// Open a new order, reserving the funds that back it
    ///
    /// Buy orders reserve `price * amount` of the quote currency and carry
    /// it as escrow; sell orders reserve the base amount itself. Nothing is
    /// created or reserved when the client's balance is insufficient.
    pub fn open_order(
        &self,
        client: Uuid,
        pair: CurrencyPair,
        side: Side,
        amount: Quantity,
        price: Price,
    ) -> Result<Order> {
        let amount = normalize(amount);
        let price = normalize(price);

        if amount <= Quantity::ZERO {
            return Err(Error::InvalidOrder(format!(
                "Order amount must be positive, got {}",
                amount
            )));
        }
        if price <= Price::ZERO {
            return Err(Error::InvalidOrder(format!(
                "Order price must be positive, got {}",
                price
            )));
        }

        let order = match side {
            Side::Buy => {
                let needed = normalize(price * amount);
                self.store
                    .reserve(client, pair.quote(), needed)
                    .with_context(|| format!("Cannot open buy order on {}", pair))?;
                Order::new(client, pair, side, price, amount, needed)
            }
            Side::Sell => {
                self.store
                    .reserve(client, pair.base(), amount)
                    .with_context(|| format!("Cannot open sell order on {}", pair))?;
                Order::new(client, pair, side, price, amount, Amount::ZERO)
            }
        };

        debug!(
            "Opened order {}: {:?} {} {} @ {}",
            order.id, side, amount, pair, price
        );
        Ok(order)
    }

    /// Settle one fill against an order, crediting the owner
    ///
    /// Buy orders receive the filled base amount and spend escrow; sell
    /// orders receive the deal value in quote currency (their base amount
    /// was reserved in full at open time). Returns whether the order is now
    /// fully filled. A zero-amount deal is a no-op.
    pub fn apply_fill(
        &self,
        order: &mut Order,
        deal_amount: Quantity,
        deal_price: Price,
    ) -> Result<bool> {
        let deal_amount = normalize(deal_amount);
        let deal_value = normalize(deal_amount * normalize(deal_price));

        if deal_amount > order.remaining {
            return Err(Error::Internal(format!(
                "Fill of {} exceeds remaining {} on order {}",
                deal_amount, order.remaining, order.id
            )));
        }

        match order.side {
            Side::Buy => {
                if deal_value > order.escrow {
                    return Err(Error::Internal(format!(
                        "Deal value {} exceeds escrow {} on order {}",
                        deal_value, order.escrow, order.id
                    )));
                }
                order.remaining = normalize(order.remaining - deal_amount);
                order.escrow = normalize(order.escrow - deal_value);
                self.store.deposit(order.client, order.pair.base(), deal_amount);
            }
            Side::Sell => {
                order.remaining = normalize(order.remaining - deal_amount);
                self.store.deposit(order.client, order.pair.quote(), deal_value);
            }
        }

        Ok(order.is_filled())
    }

    /// Refund whatever economic exposure an order still has
    ///
    /// Buy orders get their residual escrow back, sell orders their unfilled
    /// base amount. The refunded quantity is zeroed, so calling this again
    /// on a settled order is a safe no-op.
    pub fn revoke_order(&self, order: &mut Order) {
        match order.side {
            Side::Buy => {
                if order.escrow > Amount::ZERO {
                    debug!(
                        "Refunding {} {} escrow for order {}",
                        order.escrow,
                        order.pair.quote(),
                        order.id
                    );
                    self.store
                        .release(order.client, order.pair.quote(), order.escrow);
                    order.escrow = Amount::ZERO;
                }
            }
            Side::Sell => {
                if order.remaining > Quantity::ZERO {
                    debug!(
                        "Refunding {} {} for order {}",
                        order.remaining,
                        order.pair.base(),
                        order.id
                    );
                    self.store
                        .release(order.client, order.pair.base(), order.remaining);
                    order.remaining = Quantity::ZERO;
                }
            }
        }
    }
}
