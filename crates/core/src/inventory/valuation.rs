//! The valuation engine: pure movement application rules.
//!
//! Given a current balance and a movement request, computes the resulting
//! balance and the ledger row to append. No I/O, no hidden state; the
//! transaction coordinator in the db crate makes the result durable.

use rust_decimal::Decimal;

use super::balance::{round_cost, round_value, StockBalance};
use super::error::ValuationError;
use super::types::{AppliedMovement, MovementKind, MovementRequest};
use super::validation::validate_request;

/// Pure valuation rules for stock movements.
///
/// Rules by movement kind:
/// - **Receive** (entry, opening balance, transfer-in): stock is added at the
///   caller's explicit cost and the average cost re-weighted.
/// - **Issue** (withdrawal, transfer-out): stock is removed at the
///   pre-movement average cost; the average does not move.
/// - **Adjust**: the count delta is applied and the whole balance re-based
///   to the adjustment's unit cost (a count establishes a new cost basis,
///   it is not a priced acquisition to blend in).
/// - **Revalue**: quantity is untouched; the balance value is restated at
///   the new unit cost.
pub struct ValuationEngine;

impl ValuationEngine {
    /// Applies a movement request to a balance.
    ///
    /// `balance` is `None` when no row exists yet for the item+warehouse
    /// pair; that is equivalent to a zero balance with no cost memory.
    ///
    /// # Errors
    ///
    /// Returns `ValuationError` if the request shape is invalid or the
    /// movement would drive quantity or value negative.
    pub fn apply_movement(
        balance: Option<&StockBalance>,
        request: &MovementRequest,
    ) -> Result<AppliedMovement, ValuationError> {
        validate_request(request)?;

        let current = balance.cloned().unwrap_or_else(StockBalance::opening);

        if request.kind.is_inbound() {
            Self::receive(&current, request)
        } else if request.kind.is_outbound() {
            Self::issue(&current, request)
        } else if request.kind == MovementKind::Adjustment {
            Self::adjust(&current, request)
        } else {
            Self::revalue(&current, request)
        }
    }

    /// Inbound movement: add stock at an explicit cost, re-weight average.
    fn receive(
        current: &StockBalance,
        request: &MovementRequest,
    ) -> Result<AppliedMovement, ValuationError> {
        // Validation guarantees the cost is present and non-negative.
        let unit_cost = request
            .unit_cost
            .ok_or(ValuationError::MissingUnitCost(request.kind))?;

        let new_quantity = current.quantity + request.quantity_delta;
        let value_delta = round_value(request.quantity_delta * unit_cost);
        let new_value = current.total_value + value_delta;

        let avg_unit_cost = if new_quantity.is_zero() {
            Decimal::ZERO
        } else {
            round_cost(new_value / new_quantity)
        };

        Ok(AppliedMovement {
            kind: request.kind,
            quantity_delta: request.quantity_delta,
            unit_cost,
            value_delta,
            costing_method: request.costing_method,
            balance_after: StockBalance {
                quantity: new_quantity,
                total_value: new_value,
                avg_unit_cost,
                version: current.version + 1,
            },
        })
    }

    /// Outbound movement: remove stock priced at the current average cost.
    ///
    /// Removing stock at its own average does not move the average; a full
    /// issue takes the entire remaining value so no rounding dust is left
    /// behind, and the average cost is retained as cost memory.
    fn issue(
        current: &StockBalance,
        request: &MovementRequest,
    ) -> Result<AppliedMovement, ValuationError> {
        let out_quantity = -request.quantity_delta;

        if out_quantity > current.quantity {
            return Err(ValuationError::InsufficientStock {
                requested: out_quantity,
                available: current.quantity,
            });
        }

        let unit_cost = current.avg_unit_cost;
        let value_delta = if out_quantity == current.quantity {
            -current.total_value
        } else {
            -round_value(out_quantity * unit_cost)
        };
        let new_value = current.total_value + value_delta;

        if new_value < Decimal::ZERO {
            return Err(ValuationError::InsufficientStock {
                requested: out_quantity,
                available: current.quantity,
            });
        }

        Ok(AppliedMovement {
            kind: request.kind,
            quantity_delta: request.quantity_delta,
            unit_cost,
            value_delta,
            costing_method: request.costing_method,
            balance_after: StockBalance {
                quantity: current.quantity + request.quantity_delta,
                total_value: new_value,
                avg_unit_cost: current.avg_unit_cost,
                version: current.version + 1,
            },
        })
    }

    /// Adjustment: apply the count delta and re-base the cost.
    ///
    /// The new average cost becomes exactly the adjustment's unit cost
    /// (full re-basing, not blended with the prior average).
    fn adjust(
        current: &StockBalance,
        request: &MovementRequest,
    ) -> Result<AppliedMovement, ValuationError> {
        let unit_cost = request
            .unit_cost
            .ok_or(ValuationError::MissingUnitCost(request.kind))?;

        let new_quantity = current.quantity + request.quantity_delta;
        if new_quantity < Decimal::ZERO {
            return Err(ValuationError::InsufficientStock {
                requested: -request.quantity_delta,
                available: current.quantity,
            });
        }

        let new_value = round_value(new_quantity * unit_cost);

        Ok(AppliedMovement {
            kind: request.kind,
            quantity_delta: request.quantity_delta,
            unit_cost,
            value_delta: new_value - current.total_value,
            costing_method: request.costing_method,
            balance_after: StockBalance {
                quantity: new_quantity,
                total_value: new_value,
                avg_unit_cost: unit_cost,
                version: current.version + 1,
            },
        })
    }

    /// Revaluation: restate the balance value at a new unit cost.
    fn revalue(
        current: &StockBalance,
        request: &MovementRequest,
    ) -> Result<AppliedMovement, ValuationError> {
        let unit_cost = request
            .unit_cost
            .ok_or(ValuationError::MissingUnitCost(request.kind))?;

        let new_value = round_value(current.quantity * unit_cost);

        Ok(AppliedMovement {
            kind: request.kind,
            quantity_delta: Decimal::ZERO,
            unit_cost,
            value_delta: new_value - current.total_value,
            costing_method: request.costing_method,
            balance_after: StockBalance {
                quantity: current.quantity,
                total_value: new_value,
                avg_unit_cost: unit_cost,
                version: current.version + 1,
            },
        })
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

    fn balance(quantity: Decimal, total_value: Decimal, avg: Decimal) -> StockBalance {
        StockBalance {
            quantity,
            total_value,
            avg_unit_cost: avg,
            version: 3,
        }
    }

    #[test]
    fn test_receipt_into_empty_balance() {
        let request = make_request(MovementKind::Entry, dec!(10), Some(dec!(4)));
        let applied = ValuationEngine::apply_movement(None, &request).unwrap();

        assert_eq!(applied.unit_cost, dec!(4));
        assert_eq!(applied.value_delta, dec!(40));
        assert_eq!(applied.balance_after.quantity, dec!(10));
        assert_eq!(applied.balance_after.total_value, dec!(40));
        assert_eq!(applied.balance_after.avg_unit_cost, dec!(4));
        assert_eq!(applied.balance_after.version, 1);
    }

    #[test]
    fn test_receipt_reweights_average() {
        // {qty: 100, value: 1000, avg: 10} + 50 @ 16 -> {150, 1800, 12}
        let current = balance(dec!(100), dec!(1000), dec!(10));
        let request = make_request(MovementKind::Entry, dec!(50), Some(dec!(16)));

        let applied = ValuationEngine::apply_movement(Some(&current), &request).unwrap();

        assert_eq!(applied.balance_after.quantity, dec!(150));
        assert_eq!(applied.balance_after.total_value, dec!(1800));
        assert_eq!(applied.balance_after.avg_unit_cost, dec!(12));
        assert_eq!(applied.balance_after.version, 4);
    }

    #[test]
    fn test_withdrawal_priced_from_balance() {
        // {qty: 100, value: 1000, avg: 10} - 30 -> {70, 700, 10}, unit cost 10
        let current = balance(dec!(100), dec!(1000), dec!(10));
        let request = make_request(MovementKind::Withdrawal, dec!(-30), None);

        let applied = ValuationEngine::apply_movement(Some(&current), &request).unwrap();

        assert_eq!(applied.unit_cost, dec!(10));
        assert_eq!(applied.value_delta, dec!(-300));
        assert_eq!(applied.balance_after.quantity, dec!(70));
        assert_eq!(applied.balance_after.total_value, dec!(700));
        assert_eq!(applied.balance_after.avg_unit_cost, dec!(10));
    }

    #[test]
    fn test_withdrawal_beyond_stock_fails() {
        let current = balance(dec!(100), dec!(1000), dec!(10));
        let request = make_request(MovementKind::Withdrawal, dec!(-130), None);

        let result = ValuationEngine::apply_movement(Some(&current), &request);
        assert_eq!(
            result.unwrap_err(),
            ValuationError::InsufficientStock {
                requested: dec!(130),
                available: dec!(100),
            }
        );
    }

    #[test]
    fn test_withdrawal_from_absent_balance_fails() {
        let request = make_request(MovementKind::Withdrawal, dec!(-1), None);
        assert!(matches!(
            ValuationEngine::apply_movement(None, &request),
            Err(ValuationError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_full_issue_leaves_no_dust_and_keeps_cost_memory() {
        // An uneven average would leave rounding dust if the issue were
        // priced per unit instead of taking the remaining value.
        let current = balance(dec!(3), dec!(10), dec!(3.333333));
        let request = make_request(MovementKind::Withdrawal, dec!(-3), None);

        let applied = ValuationEngine::apply_movement(Some(&current), &request).unwrap();

        assert_eq!(applied.value_delta, dec!(-10));
        assert_eq!(applied.balance_after.quantity, dec!(0));
        assert_eq!(applied.balance_after.total_value, dec!(0));
        assert_eq!(applied.balance_after.avg_unit_cost, dec!(3.333333));
    }

    #[test]
    fn test_adjustment_rebases_cost() {
        // {qty: 70, value: 700, avg: 10}, count 70 -> 65 @ 11 -> {65, 715, 11}
        let current = balance(dec!(70), dec!(700), dec!(10));
        let request = make_request(MovementKind::Adjustment, dec!(-5), Some(dec!(11)));

        let applied = ValuationEngine::apply_movement(Some(&current), &request).unwrap();

        assert_eq!(applied.quantity_delta, dec!(-5));
        assert_eq!(applied.balance_after.quantity, dec!(65));
        assert_eq!(applied.balance_after.total_value, dec!(715));
        assert_eq!(applied.balance_after.avg_unit_cost, dec!(11));
        assert_eq!(applied.value_delta, dec!(15));
    }

    #[test]
    fn test_adjustment_below_zero_fails() {
        let current = balance(dec!(5), dec!(50), dec!(10));
        let request = make_request(MovementKind::Adjustment, dec!(-6), Some(dec!(10)));

        assert!(matches!(
            ValuationEngine::apply_movement(Some(&current), &request),
            Err(ValuationError::InsufficientStock { .. })
        ));
    }

    #[test]
    fn test_revaluation_changes_value_only() {
        let current = balance(dec!(40), dec!(400), dec!(10));
        let request = make_request(MovementKind::Revaluation, dec!(0), Some(dec!(12.5)));

        let applied = ValuationEngine::apply_movement(Some(&current), &request).unwrap();

        assert_eq!(applied.quantity_delta, dec!(0));
        assert_eq!(applied.value_delta, dec!(100));
        assert_eq!(applied.balance_after.quantity, dec!(40));
        assert_eq!(applied.balance_after.total_value, dec!(500));
        assert_eq!(applied.balance_after.avg_unit_cost, dec!(12.5));
    }

    #[test]
    fn test_transfer_legs_round_trip_value() {
        // Out leg priced at source average, in leg priced at the out cost.
        let source = balance(dec!(20), dec!(90), dec!(4.5));
        let out_request = make_request(MovementKind::TransferOut, dec!(-8), None);
        let out = ValuationEngine::apply_movement(Some(&source), &out_request).unwrap();

        assert_eq!(out.unit_cost, dec!(4.5));
        assert_eq!(out.value_delta, dec!(-36));

        let in_request = make_request(MovementKind::TransferIn, dec!(8), Some(out.unit_cost));
        let applied_in = ValuationEngine::apply_movement(None, &in_request).unwrap();

        assert_eq!(applied_in.value_delta, dec!(36));
        assert_eq!(applied_in.balance_after.avg_unit_cost, dec!(4.5));
    }

    #[test]
    fn test_opening_balance_behaves_like_receipt() {
        let request = make_request(MovementKind::OpeningBalance, dec!(25), Some(dec!(2)));
        let applied = ValuationEngine::apply_movement(None, &request).unwrap();

        assert_eq!(applied.balance_after.quantity, dec!(25));
        assert_eq!(applied.balance_after.total_value, dec!(50));
        assert_eq!(applied.balance_after.version, 1);
    }

    #[test]
    fn test_resulting_balances_stay_consistent() {
        let current = balance(dec!(100), dec!(1000), dec!(10));
        let request = make_request(MovementKind::Entry, dec!(33), Some(dec!(7.77)));

        let applied = ValuationEngine::apply_movement(Some(&current), &request).unwrap();
        assert!(applied.balance_after.is_consistent());
    }
}
