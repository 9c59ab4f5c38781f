//! Concurrent dispatch front for the matching engine

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::error::{Error, Result};
use common::model::currency::CurrencyPair;
use common::model::order::Order;
use dashmap::DashMap;
use ledger_service::LedgerService;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use crate::order_book::OrderBook;

/// A submitted order together with its completion signal
struct Submission {
    order: Order,
    done: oneshot::Sender<Result<()>>,
}

/// The matching engine front
///
/// One worker task per instrument drains a FIFO intake queue and owns that
/// instrument's book for the duration of each matching cycle. Submissions
/// for one instrument are matched in the order they were enqueued;
/// submissions for different instruments proceed in parallel.
pub struct MatchingEngine {
    /// Ledger settling all fills and refunds
    ledger: Arc<LedgerService>,
    /// Book per instrument, locked by the owning worker during a cycle
    books: HashMap<CurrencyPair, Arc<Mutex<OrderBook>>>,
    /// Intake queue senders per instrument
    intakes: HashMap<CurrencyPair, mpsc::UnboundedSender<Submission>>,
    /// Orders accepted but not yet through their matching cycle
    in_flight: Arc<DashMap<Uuid, Order>>,
}

impl MatchingEngine {
    /// Create a new matching engine and spawn one worker per instrument
    ///
    /// Must be called within a Tokio runtime; the workers live until the
    /// engine is dropped and their intake queues close.
    pub fn new(ledger: Arc<LedgerService>) -> Self {
        let mut books = HashMap::new();
        let mut intakes = HashMap::new();
        let in_flight: Arc<DashMap<Uuid, Order>> = Arc::new(DashMap::new());

        for pair in CurrencyPair::ALL {
            let book = Arc::new(Mutex::new(OrderBook::new(pair)));
            let (sender, receiver) = mpsc::unbounded_channel();

            tokio::spawn(run_worker(
                pair,
                book.clone(),
                ledger.clone(),
                in_flight.clone(),
                receiver,
            ));

            books.insert(pair, book);
            intakes.insert(pair, sender);
        }

        info!("Matching engine started with {} instruments", books.len());

        Self {
            ledger,
            books,
            intakes,
            in_flight,
        }
    }

    /// Submit an order and wait until its matching cycle has completed
    ///
    /// Safe to call from any number of concurrent tasks. When this returns,
    /// every fill for the order has been settled and the books updated, so
    /// the caller can read consistent balances immediately. The enqueue
    /// happens before the first await point: a caller that stops waiting
    /// detaches, and the order is still processed.
    pub async fn submit(&self, order: Order) -> Result<()> {
        let intake = self
            .intakes
            .get(&order.pair)
            .ok_or_else(|| Error::Internal(format!("No intake for instrument {}", order.pair)))?;

        let order_id = order.id;
        let (done, completion) = oneshot::channel();
        self.in_flight.insert(order_id, order.clone());

        if intake.send(Submission { order, done }).is_err() {
            self.in_flight.remove(&order_id);
            return Err(Error::Interrupted(format!(
                "Matching worker for order {} is gone",
                order_id
            )));
        }

        match completion.await {
            Ok(result) => result,
            Err(_) => Err(Error::Interrupted(format!(
                "Completion signal for order {} was dropped",
                order_id
            ))),
        }
    }

    /// Point-in-time copy of all live orders: resting in any book or still
    /// in flight through an intake queue
    pub fn all_orders(&self) -> Vec<Order> {
        let mut orders: HashMap<Uuid, Order> = HashMap::new();

        for entry in self.in_flight.iter() {
            let order = entry.value().clone();
            orders.insert(order.id, order);
        }
        for book in self.books.values() {
            let book = book.lock().unwrap();
            for order in book.orders() {
                orders.insert(order.id, order);
            }
        }

        orders.into_values().collect()
    }

    /// Revoke every resting order, refunding escrow and unfilled amounts,
    /// and empty every book
    ///
    /// Orders still in flight are not withdrawn; they complete their cycles
    /// normally afterwards.
    pub fn revoke_all(&self) {
        info!("Revoking all resting orders");
        for book in self.books.values() {
            let mut book = book.lock().unwrap();
            book.revoke_all(&self.ledger);
        }
    }
}

/// Worker loop owning one instrument's book
async fn run_worker(
    pair: CurrencyPair,
    book: Arc<Mutex<OrderBook>>,
    ledger: Arc<LedgerService>,
    in_flight: Arc<DashMap<Uuid, Order>>,
    mut intake: mpsc::UnboundedReceiver<Submission>,
) {
    debug!("Matching worker for {} started", pair);

    while let Some(Submission { order, done }) = intake.recv().await {
        let order_id = order.id;
        let result = {
            let mut book = book.lock().unwrap();
            in_flight.remove(&order_id);
            book.match_incoming(&ledger, order)
        };

        // The submitter may have stopped waiting; the order has been
        // processed either way.
        if done.send(result).is_err() {
            debug!("Submitter of order {} detached before completion", order_id);
        }
    }

    debug!("Matching worker for {} stopped", pair);
}
