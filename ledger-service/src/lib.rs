//! Ledger service for managing client balances and the fund side of the
//! order lifecycle

pub mod service;
pub mod store;

pub use service::LedgerService;
pub use store::BalanceStore;
