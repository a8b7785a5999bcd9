//! Valuation error types.
//!
//! This module defines all errors the valuation engine can produce:
//! stock-level failures and request-shape violations. Storage-level
//! failures (unknown ids, lock conflicts, database errors) live with the
//! transaction coordinator in the db crate.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::MovementKind;

/// Errors that can occur while applying a movement to a balance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuationError {
    // ========== Stock-Level Errors ==========
    /// An outbound movement or negative adjustment would drive the balance
    /// negative.
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Quantity the movement tried to remove.
        requested: Decimal,
        /// Quantity on hand before the movement.
        available: Decimal,
    },

    // ========== Request-Shape Errors ==========
    /// The kind requires an explicit unit cost and none was supplied.
    #[error("Movement kind {0:?} requires an explicit unit cost")]
    MissingUnitCost(MovementKind),

    /// Outbound movements are priced from the balance; a caller-supplied
    /// cost is rejected.
    #[error("Movement kind {0:?} derives its cost from the balance; explicit unit cost rejected")]
    ExplicitCostOnOutbound(MovementKind),

    /// Unit costs can never be negative.
    #[error("Unit cost cannot be negative: {0}")]
    NegativeUnitCost(Decimal),

    /// The quantity delta has the wrong sign or is zero for this kind.
    #[error("Invalid quantity delta {delta} for movement kind {kind:?}")]
    InvalidQuantityDelta {
        /// The movement kind.
        kind: MovementKind,
        /// The offending delta.
        delta: Decimal,
    },

    /// Revaluations change cost only; the quantity delta must be zero.
    #[error("Revaluation must have a zero quantity delta, got {0}")]
    NonZeroRevaluationDelta(Decimal),
}

impl ValuationError {
    /// Returns the error code for caller-facing messages.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::MissingUnitCost(_)
            | Self::ExplicitCostOnOutbound(_)
            | Self::NegativeUnitCost(_)
            | Self::InvalidQuantityDelta { .. }
            | Self::NonZeroRevaluationDelta(_) => "INVALID_MOVEMENT_REQUEST",
        }
    }

    /// Returns true if the request never reached the balance (rejected on
    /// shape alone).
    #[must_use]
    pub fn is_request_shape(&self) -> bool {
        !matches!(self, Self::InsufficientStock { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        let err = ValuationError::InsufficientStock {
            requested: dec!(60),
            available: dec!(40),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_STOCK");

        assert_eq!(
            ValuationError::MissingUnitCost(MovementKind::Entry).error_code(),
            "INVALID_MOVEMENT_REQUEST"
        );
        assert_eq!(
            ValuationError::ExplicitCostOnOutbound(MovementKind::Withdrawal).error_code(),
            "INVALID_MOVEMENT_REQUEST"
        );
    }

    #[test]
    fn test_request_shape_classification() {
        assert!(!ValuationError::InsufficientStock {
            requested: dec!(1),
            available: dec!(0),
        }
        .is_request_shape());
        assert!(ValuationError::NonZeroRevaluationDelta(dec!(5)).is_request_shape());
    }

    #[test]
    fn test_error_display() {
        let err = ValuationError::InsufficientStock {
            requested: dec!(60),
            available: dec!(40),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock: requested 60, available 40"
        );
    }
}
