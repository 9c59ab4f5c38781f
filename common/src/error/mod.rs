//! Error types for the exchange
//!
//! This module provides a unified error handling system for all crates in
//! the workspace. Fund-affecting errors are always raised before any state
//! is mutated, so no variant here implies a partial write.

use std::fmt::Display;
use thiserror::Error;

/// Exchange error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error related to order validation
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Error when a client has insufficient funds
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    /// Error when a submission is cut off before its matching cycle completes
    #[error("Submission interrupted: {0}")]
    Interrupted(String),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait to add context to error results
pub trait ErrorExt<T> {
    /// Add context information to an error
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T> ErrorExt<T> for Result<T> {
    fn with_context<C, F>(self, context_fn: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        self.map_err(|e| {
            let context = context_fn().to_string();
            match e {
                Error::InvalidOrder(msg) => Error::InvalidOrder(format!("{}: {}", context, msg)),
                Error::InsufficientFunds(msg) => {
                    Error::InsufficientFunds(format!("{}: {}", context, msg))
                }
                Error::Interrupted(msg) => Error::Interrupted(format!("{}: {}", context, msg)),
                Error::Internal(msg) => Error::Internal(format!("{}: {}", context, msg)),
            }
        })
    }
}
