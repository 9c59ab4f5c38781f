//! Common types and utilities for the exchange
//!
//! This library contains the shared types used across the exchange crates:
//! a unified error type, fixed-scale decimal helpers, and the domain models
//! (currencies, currency pairs, orders).

pub mod decimal;
pub mod error;
pub mod model;

/// Re-export important types
pub use decimal::*;
pub use error::{Error, ErrorExt, Result};
