//! Stock valuation and movement accounting.
//!
//! This module implements the valuation core:
//! - Per-item-per-warehouse running balances
//! - Movement kinds and requests
//! - The pure valuation engine (receive, issue, adjust, revalue)
//! - Request validation
//! - Error types for valuation operations

pub mod balance;
pub mod error;
pub mod types;
pub mod validation;
pub mod valuation;

#[cfg(test)]
mod valuation_props;

pub use balance::StockBalance;
pub use error::ValuationError;
pub use types::{
    AppliedMovement, CostingMethod, DocumentKind, DocumentRef, MovementKind, MovementRequest,
};
pub use validation::validate_request;
pub use valuation::ValuationEngine;
