//! Request-shape validation for stock movements.

use rust_decimal::Decimal;

use super::error::ValuationError;
use super::types::{MovementKind, MovementRequest};

/// Validates the shape of a movement request before any balance is touched.
///
/// Shape rules per kind:
/// - inbound (entry, opening balance, transfer-in): positive delta, explicit
///   non-negative unit cost required
/// - outbound (withdrawal, transfer-out): negative delta, explicit unit cost
///   rejected
/// - adjustment: non-zero delta, explicit non-negative unit cost required
/// - revaluation: zero delta, explicit non-negative unit cost required
///
/// # Errors
///
/// Returns a `ValuationError` describing the first violated rule.
pub fn validate_request(request: &MovementRequest) -> Result<(), ValuationError> {
    if request.kind.is_inbound() {
        if request.quantity_delta <= Decimal::ZERO {
            return Err(ValuationError::InvalidQuantityDelta {
                kind: request.kind,
                delta: request.quantity_delta,
            });
        }
        require_cost(request)?;
    } else if request.kind.is_outbound() {
        if request.quantity_delta >= Decimal::ZERO {
            return Err(ValuationError::InvalidQuantityDelta {
                kind: request.kind,
                delta: request.quantity_delta,
            });
        }
        if request.unit_cost.is_some() {
            return Err(ValuationError::ExplicitCostOnOutbound(request.kind));
        }
    } else {
        match request.kind {
            MovementKind::Adjustment => {
                if request.quantity_delta.is_zero() {
                    return Err(ValuationError::InvalidQuantityDelta {
                        kind: request.kind,
                        delta: request.quantity_delta,
                    });
                }
                require_cost(request)?;
            }
            MovementKind::Revaluation => {
                if !request.quantity_delta.is_zero() {
                    return Err(ValuationError::NonZeroRevaluationDelta(
                        request.quantity_delta,
                    ));
                }
                require_cost(request)?;
            }
            // Inbound/outbound kinds are handled above.
            _ => unreachable!("kind {:?} already classified", request.kind),
        }
    }

    Ok(())
}

fn require_cost(request: &MovementRequest) -> Result<(), ValuationError> {
    match request.unit_cost {
        None => Err(ValuationError::MissingUnitCost(request.kind)),
        Some(cost) if cost < Decimal::ZERO => Err(ValuationError::NegativeUnitCost(cost)),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use stokra_shared::types::{ItemId, WarehouseId};

    use crate::inventory::types::CostingMethod;

    fn make_request(
        kind: MovementKind,
        delta: Decimal,
        unit_cost: Option<Decimal>,
    ) -> MovementRequest {
        MovementRequest {
            item_id: ItemId::new(),
            warehouse_id: WarehouseId::new(),
            kind,
            quantity_delta: delta,
            unit_cost,
            costing_method: CostingMethod::MovingAverage,
            reference: None,
            note: None,
        }
    }

    #[test]
    fn test_valid_entry() {
        let request = make_request(MovementKind::Entry, dec!(10), Some(dec!(5)));
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_entry_without_cost_rejected() {
        let request = make_request(MovementKind::Entry, dec!(10), None);
        assert!(matches!(
            validate_request(&request),
            Err(ValuationError::MissingUnitCost(MovementKind::Entry))
        ));
    }

    #[test]
    fn test_entry_with_negative_delta_rejected() {
        let request = make_request(MovementKind::Entry, dec!(-10), Some(dec!(5)));
        assert!(matches!(
            validate_request(&request),
            Err(ValuationError::InvalidQuantityDelta { .. })
        ));
    }

    #[test]
    fn test_withdrawal_with_explicit_cost_rejected() {
        let request = make_request(MovementKind::Withdrawal, dec!(-10), Some(dec!(5)));
        assert!(matches!(
            validate_request(&request),
            Err(ValuationError::ExplicitCostOnOutbound(
                MovementKind::Withdrawal
            ))
        ));
    }

    #[test]
    fn test_withdrawal_with_positive_delta_rejected() {
        let request = make_request(MovementKind::Withdrawal, dec!(10), None);
        assert!(matches!(
            validate_request(&request),
            Err(ValuationError::InvalidQuantityDelta { .. })
        ));
    }

    #[test]
    fn test_valid_withdrawal() {
        let request = make_request(MovementKind::Withdrawal, dec!(-10), None);
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_revaluation_with_nonzero_delta_rejected() {
        let request = make_request(MovementKind::Revaluation, dec!(1), Some(dec!(5)));
        assert!(matches!(
            validate_request(&request),
            Err(ValuationError::NonZeroRevaluationDelta(_))
        ));
    }

    #[test]
    fn test_valid_revaluation() {
        let request = make_request(MovementKind::Revaluation, dec!(0), Some(dec!(5)));
        assert!(validate_request(&request).is_ok());
    }

    #[test]
    fn test_adjustment_with_zero_delta_rejected() {
        let request = make_request(MovementKind::Adjustment, dec!(0), Some(dec!(5)));
        assert!(matches!(
            validate_request(&request),
            Err(ValuationError::InvalidQuantityDelta { .. })
        ));
    }

    #[test]
    fn test_negative_unit_cost_rejected() {
        let request = make_request(MovementKind::Entry, dec!(10), Some(dec!(-5)));
        assert!(matches!(
            validate_request(&request),
            Err(ValuationError::NegativeUnitCost(_))
        ));
    }

    #[test]
    fn test_transfer_out_mirrors_withdrawal_rules() {
        let ok = make_request(MovementKind::TransferOut, dec!(-3), None);
        assert!(validate_request(&ok).is_ok());

        let bad = make_request(MovementKind::TransferOut, dec!(-3), Some(dec!(2)));
        assert!(matches!(
            validate_request(&bad),
            Err(ValuationError::ExplicitCostOnOutbound(
                MovementKind::TransferOut
            ))
        ));
    }
}
