//! Order book and matching cycle for a single instrument

use common::decimal::{Price, Quantity};
use common::error::Result;
use common::model::currency::CurrencyPair;
use common::model::order::{Order, Side};
use ledger_service::LedgerService;
use tracing::debug;
use uuid::Uuid;

/// A resting order together with the sequence number it was admitted under
struct Resting {
    /// Monotonic admission sequence, the tie-break among equal prices
    seq: u64,
    order: Order,
}

/// Order book for a single instrument
///
/// Resting orders are kept unordered; every matching cycle scans the whole
/// book and sorts the crossing candidates by price priority. Only the worker
/// owning the instrument runs cycles against the book, so no locking happens
/// here.
pub struct OrderBook {
    /// Instrument this book trades
    pair: CurrencyPair,
    /// Resting orders, every one with remaining > 0
    resting: Vec<Resting>,
    /// Next admission sequence number
    next_seq: u64,
}

impl OrderBook {
    /// Create a new empty order book for the given instrument
    pub fn new(pair: CurrencyPair) -> Self {
        Self {
            pair,
            resting: Vec::new(),
            next_seq: 0,
        }
    }

    /// Instrument of this book
    pub fn pair(&self) -> CurrencyPair {
        self.pair
    }

    /// Number of resting orders
    pub fn len(&self) -> usize {
        self.resting.len()
    }

    /// Check whether the book holds no resting orders
    pub fn is_empty(&self) -> bool {
        self.resting.is_empty()
    }

    /// Point-in-time copy of the resting orders
    pub fn orders(&self) -> Vec<Order> {
        self.resting.iter().map(|entry| entry.order.clone()).collect()
    }

    /// Run one matching cycle for an incoming order
    ///
    /// Fills the incoming order against crossing resting orders in price
    /// priority (admission order among equal prices), settling each deal
    /// through the ledger, then rests any unfilled remainder. Candidates
    /// filled by a deal are revoked and removed in the same step.
    pub fn match_incoming(&mut self, ledger: &LedgerService, mut order: Order) -> Result<()> {
        for candidate_id in self.crossing_candidates(&order) {
            if order.is_filled() {
                break;
            }

            let pos = match self
                .resting
                .iter()
                .position(|entry| entry.order.id == candidate_id)
            {
                Some(pos) => pos,
                None => continue,
            };

            let candidate = &mut self.resting[pos].order;
            let deal_amount = Quantity::min(candidate.remaining, order.remaining);
            let deal_price = deal_price(&order, candidate);

            debug!(
                "Deal on {}: {} @ {} between resting order {} and incoming order {}",
                self.pair, deal_amount, deal_price, candidate.id, order.id
            );

            let candidate_filled = ledger.apply_fill(candidate, deal_amount, deal_price)?;
            let incoming_filled = ledger.apply_fill(&mut order, deal_amount, deal_price)?;

            if candidate_filled {
                // Residual refund is normally zero; the removal keeps the
                // book invariant that every resting order has remaining > 0.
                let mut closed = self.resting.remove(pos);
                ledger.revoke_order(&mut closed.order);
            }
            if incoming_filled {
                ledger.revoke_order(&mut order);
            }
        }

        if !order.is_filled() {
            self.insert(order);
        }
        Ok(())
    }

    /// Revoke every resting order, refunding through the ledger
    pub fn revoke_all(&mut self, ledger: &LedgerService) {
        for mut entry in self.resting.drain(..) {
            ledger.revoke_order(&mut entry.order);
        }
    }

    /// Ids of the resting orders that cross the incoming order, in the order
    /// they should be filled
    fn crossing_candidates(&self, order: &Order) -> Vec<Uuid> {
        let mut candidates: Vec<(Price, u64, Uuid)> = self
            .resting
            .iter()
            .filter(|entry| entry.order.client != order.client)
            .filter(|entry| entry.order.side != order.side)
            .filter(|entry| match order.side {
                Side::Buy => entry.order.price <= order.price,
                Side::Sell => entry.order.price >= order.price,
            })
            .map(|entry| (entry.order.price, entry.seq, entry.order.id))
            .collect();

        // Buyers take the cheapest offers first, sellers the highest bids;
        // admission order breaks price ties.
        match order.side {
            Side::Buy => candidates.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1))),
            Side::Sell => candidates.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1))),
        }

        candidates.into_iter().map(|(_, _, id)| id).collect()
    }

    /// Admit an order as resting
    fn insert(&mut self, order: Order) {
        debug!(
            "Resting order {} on {}: {:?} {} @ {}",
            order.id, self.pair, order.side, order.remaining, order.price
        );
        self.resting.push(Resting {
            seq: self.next_seq,
            order,
        });
        self.next_seq += 1;
    }
}

/// Price improvement favors the resting order
fn deal_price(incoming: &Order, candidate: &Order) -> Price {
    match incoming.side {
        Side::Buy => Price::min(incoming.price, candidate.price),
        Side::Sell => Price::max(incoming.price, candidate.price),
    }
}
