//! Per-client, per-currency balance cells

use std::collections::HashMap;

use common::decimal::{normalize, Amount};
use common::error::{Error, Result};
use common::model::currency::Currency;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// In-memory balance store
///
/// Each (client, currency) pair owns an independent cell. Reservation is an
/// atomic check-then-debit on that one cell, so operations on different
/// clients or different currencies never serialize against each other.
pub struct BalanceStore {
    /// Balance cells by client and currency
    cells: DashMap<(Uuid, Currency), Amount>,
}

impl BalanceStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    /// Credit a client's balance unconditionally
    pub fn deposit(&self, client: Uuid, currency: Currency, amount: Amount) {
        let amount = normalize(amount);
        let mut cell = self.cells.entry((client, currency)).or_insert(Amount::ZERO);
        *cell = normalize(*cell + amount);
        debug!("Deposited {} {} to client {}", amount, currency, client);
    }

    /// Reserve funds: an atomic check-then-debit on one (client, currency)
    /// cell
    ///
    /// Nothing is debited when the available balance falls short.
    pub fn reserve(&self, client: Uuid, currency: Currency, amount: Amount) -> Result<()> {
        let amount = normalize(amount);
        match self.cells.entry((client, currency)) {
            Entry::Occupied(mut cell) => {
                let available = *cell.get();
                if available < amount {
                    return Err(Error::InsufficientFunds(format!(
                        "Needed at least {} {}, client {} has only {}",
                        amount, currency, client, available
                    )));
                }
                *cell.get_mut() = normalize(available - amount);
                debug!("Reserved {} {} from client {}", amount, currency, client);
                Ok(())
            }
            Entry::Vacant(_) => Err(Error::InsufficientFunds(format!(
                "Needed at least {} {}, client {} has no balance",
                amount, currency, client
            ))),
        }
    }

    /// Return previously reserved funds to a client
    pub fn release(&self, client: Uuid, currency: Currency, amount: Amount) {
        let amount = normalize(amount);
        let mut cell = self.cells.entry((client, currency)).or_insert(Amount::ZERO);
        *cell = normalize(*cell + amount);
        debug!("Released {} {} to client {}", amount, currency, client);
    }

    /// Current balance of one cell
    pub fn balance(&self, client: Uuid, currency: Currency) -> Amount {
        self.cells
            .get(&(client, currency))
            .map(|cell| *cell)
            .unwrap_or(Amount::ZERO)
    }

    /// Point-in-time copy of all of a client's balances
    ///
    /// Safe to call while other tasks mutate the store; each cell is read
    /// atomically.
    pub fn snapshot(&self, client: Uuid) -> HashMap<Currency, Amount> {
        self.cells
            .iter()
            .filter_map(|entry| {
                let ((owner, currency), amount) = entry.pair();
                if *owner == client {
                    Some((*currency, *amount))
                } else {
                    None
                }
            })
            .collect()
    }
}
