//! Pure builders turning document lines into movement requests.
//!
//! Each builder validates line shapes and resolves the item's costing
//! method through a caller-supplied lookup, mirroring how the valuation
//! engine stays free of persistence concerns. The transaction coordinator
//! applies the resulting batch atomically.

use rust_decimal::Decimal;
use stokra_shared::types::{ItemId, WarehouseId};
use thiserror::Error;

use crate::inventory::types::{CostingMethod, DocumentRef, MovementKind, MovementRequest};

use super::types::{
    AdjustmentLineInput, EntryLineInput, PricedTransferLine, TransferLineInput,
    WithdrawalLineInput,
};

/// Errors from building movement requests out of document lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The document has no lines.
    #[error("Document has no lines")]
    EmptyDocument,

    /// A line references an item the lookup does not know.
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Line quantities must be positive.
    #[error("Quantity must be positive for item {item_id}: {quantity}")]
    NonPositiveQuantity {
        /// The offending item.
        item_id: ItemId,
        /// The offending quantity.
        quantity: Decimal,
    },

    /// Counted quantities cannot be negative.
    #[error("Count quantity cannot be negative for item {item_id}: {quantity}")]
    NegativeCount {
        /// The offending item.
        item_id: ItemId,
        /// The offending quantity.
        quantity: Decimal,
    },

    /// Unit costs cannot be negative.
    #[error("Unit cost cannot be negative for item {item_id}: {unit_cost}")]
    NegativeUnitCost {
        /// The offending item.
        item_id: ItemId,
        /// The offending cost.
        unit_cost: Decimal,
    },
}

fn require_positive(item_id: ItemId, quantity: Decimal) -> Result<(), RequestError> {
    if quantity <= Decimal::ZERO {
        return Err(RequestError::NonPositiveQuantity { item_id, quantity });
    }
    Ok(())
}

fn require_cost(item_id: ItemId, unit_cost: Decimal) -> Result<(), RequestError> {
    if unit_cost < Decimal::ZERO {
        return Err(RequestError::NegativeUnitCost { item_id, unit_cost });
    }
    Ok(())
}

/// Builds receipt movements for a goods-receipt document.
///
/// # Errors
///
/// Returns `RequestError` on empty documents, unknown items, non-positive
/// quantities, or negative costs.
pub fn entry_requests<F>(
    reference: DocumentRef,
    warehouse_id: WarehouseId,
    lines: &[EntryLineInput],
    costing_method: F,
) -> Result<Vec<MovementRequest>, RequestError>
where
    F: Fn(ItemId) -> Option<CostingMethod>,
{
    if lines.is_empty() {
        return Err(RequestError::EmptyDocument);
    }

    lines
        .iter()
        .map(|line| {
            require_positive(line.item_id, line.quantity)?;
            require_cost(line.item_id, line.unit_cost)?;
            let method =
                costing_method(line.item_id).ok_or(RequestError::UnknownItem(line.item_id))?;

            Ok(MovementRequest {
                item_id: line.item_id,
                warehouse_id,
                kind: MovementKind::Entry,
                quantity_delta: line.quantity,
                unit_cost: Some(line.unit_cost),
                costing_method: method,
                reference: Some(reference),
                note: None,
            })
        })
        .collect()
}

/// Builds withdrawal movements. Costs are derived from the balance, so the
/// lines carry none.
///
/// # Errors
///
/// Returns `RequestError` on empty documents, unknown items, or
/// non-positive quantities.
pub fn withdrawal_requests<F>(
    reference: DocumentRef,
    warehouse_id: WarehouseId,
    lines: &[WithdrawalLineInput],
    costing_method: F,
) -> Result<Vec<MovementRequest>, RequestError>
where
    F: Fn(ItemId) -> Option<CostingMethod>,
{
    if lines.is_empty() {
        return Err(RequestError::EmptyDocument);
    }

    lines
        .iter()
        .map(|line| {
            require_positive(line.item_id, line.quantity)?;
            let method =
                costing_method(line.item_id).ok_or(RequestError::UnknownItem(line.item_id))?;

            Ok(MovementRequest {
                item_id: line.item_id,
                warehouse_id,
                kind: MovementKind::Withdrawal,
                quantity_delta: -line.quantity,
                unit_cost: None,
                costing_method: method,
                reference: Some(reference),
                note: None,
            })
        })
        .collect()
}

/// Builds adjustment movements with delta `actual - system`.
///
/// Lines whose counted quantity matches the system quantity produce no
/// movement; a fully matching count yields an empty batch, which posts the
/// document without touching any balance.
///
/// # Errors
///
/// Returns `RequestError` on empty documents, unknown items, negative
/// counts, or negative costs.
pub fn adjustment_requests<F>(
    reference: DocumentRef,
    warehouse_id: WarehouseId,
    lines: &[AdjustmentLineInput],
    costing_method: F,
) -> Result<Vec<MovementRequest>, RequestError>
where
    F: Fn(ItemId) -> Option<CostingMethod>,
{
    if lines.is_empty() {
        return Err(RequestError::EmptyDocument);
    }

    let mut requests = Vec::with_capacity(lines.len());

    for line in lines {
        if line.actual_quantity < Decimal::ZERO {
            return Err(RequestError::NegativeCount {
                item_id: line.item_id,
                quantity: line.actual_quantity,
            });
        }
        if line.system_quantity < Decimal::ZERO {
            return Err(RequestError::NegativeCount {
                item_id: line.item_id,
                quantity: line.system_quantity,
            });
        }
        require_cost(line.item_id, line.unit_cost)?;

        let delta = line.delta();
        if delta.is_zero() {
            continue;
        }

        let method = costing_method(line.item_id).ok_or(RequestError::UnknownItem(line.item_id))?;

        requests.push(MovementRequest {
            item_id: line.item_id,
            warehouse_id,
            kind: MovementKind::Adjustment,
            quantity_delta: delta,
            unit_cost: Some(line.unit_cost),
            costing_method: method,
            reference: Some(reference),
            note: None,
        });
    }

    Ok(requests)
}

/// Builds the outbound legs of a transfer (priced from the source balance).
///
/// # Errors
///
/// Returns `RequestError` on empty documents, unknown items, or
/// non-positive quantities.
pub fn transfer_out_requests<F>(
    reference: DocumentRef,
    source_warehouse_id: WarehouseId,
    lines: &[TransferLineInput],
    costing_method: F,
) -> Result<Vec<MovementRequest>, RequestError>
where
    F: Fn(ItemId) -> Option<CostingMethod>,
{
    if lines.is_empty() {
        return Err(RequestError::EmptyDocument);
    }

    lines
        .iter()
        .map(|line| {
            require_positive(line.item_id, line.quantity)?;
            let method =
                costing_method(line.item_id).ok_or(RequestError::UnknownItem(line.item_id))?;

            Ok(MovementRequest {
                item_id: line.item_id,
                warehouse_id: source_warehouse_id,
                kind: MovementKind::TransferOut,
                quantity_delta: -line.quantity,
                unit_cost: None,
                costing_method: method,
                reference: Some(reference),
                note: None,
            })
        })
        .collect()
}

/// Builds the inbound legs of a transfer, priced by the executed outbound
/// legs so value is conserved across warehouses.
///
/// # Errors
///
/// Returns `RequestError` on unknown items or non-positive quantities.
pub fn transfer_in_requests<F>(
    reference: DocumentRef,
    destination_warehouse_id: WarehouseId,
    lines: &[PricedTransferLine],
    costing_method: F,
) -> Result<Vec<MovementRequest>, RequestError>
where
    F: Fn(ItemId) -> Option<CostingMethod>,
{
    lines
        .iter()
        .map(|line| {
            require_positive(line.item_id, line.quantity)?;
            require_cost(line.item_id, line.unit_cost)?;
            let method =
                costing_method(line.item_id).ok_or(RequestError::UnknownItem(line.item_id))?;

            Ok(MovementRequest {
                item_id: line.item_id,
                warehouse_id: destination_warehouse_id,
                kind: MovementKind::TransferIn,
                quantity_delta: line.quantity,
                unit_cost: Some(line.unit_cost),
                costing_method: method,
                reference: Some(reference),
                note: None,
            })
        })
        .collect()
}

/// Builds a single opening-balance movement for an item+warehouse pair.
///
/// # Errors
///
/// Returns `RequestError` on non-positive quantities or negative costs.
pub fn opening_balance_request(
    item_id: ItemId,
    warehouse_id: WarehouseId,
    quantity: Decimal,
    unit_cost: Decimal,
    costing_method: CostingMethod,
) -> Result<MovementRequest, RequestError> {
    require_positive(item_id, quantity)?;
    require_cost(item_id, unit_cost)?;

    Ok(MovementRequest {
        item_id,
        warehouse_id,
        kind: MovementKind::OpeningBalance,
        quantity_delta: quantity,
        unit_cost: Some(unit_cost),
        costing_method,
        reference: None,
        note: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::inventory::types::DocumentKind;

    fn reference(kind: DocumentKind) -> DocumentRef {
        DocumentRef {
            kind,
            id: Uuid::now_v7(),
        }
    }

    fn any_method(_item: ItemId) -> Option<CostingMethod> {
        Some(CostingMethod::MovingAverage)
    }

    #[test]
    fn test_entry_requests() {
        let item = ItemId::new();
        let warehouse = WarehouseId::new();
        let lines = vec![EntryLineInput {
            item_id: item,
            quantity: dec!(10),
            unit_cost: dec!(4.5),
        }];

        let requests = entry_requests(
            reference(DocumentKind::ItemEntry),
            warehouse,
            &lines,
            any_method,
        )
        .unwrap();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, MovementKind::Entry);
        assert_eq!(requests[0].quantity_delta, dec!(10));
        assert_eq!(requests[0].unit_cost, Some(dec!(4.5)));
        assert!(requests[0].reference.is_some());
    }

    #[test]
    fn test_entry_rejects_zero_quantity() {
        let lines = vec![EntryLineInput {
            item_id: ItemId::new(),
            quantity: dec!(0),
            unit_cost: dec!(1),
        }];

        let result = entry_requests(
            reference(DocumentKind::ItemEntry),
            WarehouseId::new(),
            &lines,
            any_method,
        );
        assert!(matches!(
            result,
            Err(RequestError::NonPositiveQuantity { .. })
        ));
    }

    #[test]
    fn test_empty_document_rejected() {
        let result = withdrawal_requests(
            reference(DocumentKind::Withdrawal),
            WarehouseId::new(),
            &[],
            any_method,
        );
        assert_eq!(result.unwrap_err(), RequestError::EmptyDocument);
    }

    #[test]
    fn test_unknown_item_rejected() {
        let item = ItemId::new();
        let lines = vec![WithdrawalLineInput {
            item_id: item,
            quantity: dec!(5),
        }];

        let result = withdrawal_requests(
            reference(DocumentKind::Withdrawal),
            WarehouseId::new(),
            &lines,
            |_| None,
        );
        assert_eq!(result.unwrap_err(), RequestError::UnknownItem(item));
    }

    #[test]
    fn test_withdrawal_carries_no_cost() {
        let lines = vec![WithdrawalLineInput {
            item_id: ItemId::new(),
            quantity: dec!(5),
        }];

        let requests = withdrawal_requests(
            reference(DocumentKind::Withdrawal),
            WarehouseId::new(),
            &lines,
            any_method,
        )
        .unwrap();

        assert_eq!(requests[0].quantity_delta, dec!(-5));
        assert_eq!(requests[0].unit_cost, None);
    }

    #[test]
    fn test_adjustment_skips_matching_counts() {
        let changed = ItemId::new();
        let lines = vec![
            AdjustmentLineInput {
                item_id: ItemId::new(),
                system_quantity: dec!(10),
                actual_quantity: dec!(10),
                unit_cost: dec!(2),
            },
            AdjustmentLineInput {
                item_id: changed,
                system_quantity: dec!(70),
                actual_quantity: dec!(65),
                unit_cost: dec!(11),
            },
        ];

        let requests = adjustment_requests(
            reference(DocumentKind::Adjustment),
            WarehouseId::new(),
            &lines,
            any_method,
        )
        .unwrap();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].item_id, changed);
        assert_eq!(requests[0].quantity_delta, dec!(-5));
        assert_eq!(requests[0].unit_cost, Some(dec!(11)));
    }

    #[test]
    fn test_adjustment_rejects_negative_count() {
        let lines = vec![AdjustmentLineInput {
            item_id: ItemId::new(),
            system_quantity: dec!(10),
            actual_quantity: dec!(-1),
            unit_cost: dec!(2),
        }];

        let result = adjustment_requests(
            reference(DocumentKind::Adjustment),
            WarehouseId::new(),
            &lines,
            any_method,
        );
        assert!(matches!(result, Err(RequestError::NegativeCount { .. })));
    }

    #[test]
    fn test_transfer_legs() {
        let item = ItemId::new();
        let source = WarehouseId::new();
        let destination = WarehouseId::new();
        let doc = reference(DocumentKind::Transfer);

        let outs = transfer_out_requests(
            doc,
            source,
            &[TransferLineInput {
                item_id: item,
                quantity: dec!(8),
            }],
            any_method,
        )
        .unwrap();

        assert_eq!(outs[0].kind, MovementKind::TransferOut);
        assert_eq!(outs[0].warehouse_id, source);
        assert_eq!(outs[0].unit_cost, None);

        let ins = transfer_in_requests(
            doc,
            destination,
            &[PricedTransferLine {
                item_id: item,
                quantity: dec!(8),
                unit_cost: dec!(4.5),
            }],
            any_method,
        )
        .unwrap();

        assert_eq!(ins[0].kind, MovementKind::TransferIn);
        assert_eq!(ins[0].warehouse_id, destination);
        assert_eq!(ins[0].quantity_delta, dec!(8));
        assert_eq!(ins[0].unit_cost, Some(dec!(4.5)));
    }

    #[test]
    fn test_opening_balance_request() {
        let request = opening_balance_request(
            ItemId::new(),
            WarehouseId::new(),
            dec!(100),
            dec!(3),
            CostingMethod::WeightedAverage,
        )
        .unwrap();

        assert_eq!(request.kind, MovementKind::OpeningBalance);
        assert_eq!(request.quantity_delta, dec!(100));
        assert!(request.reference.is_none());
    }
}
