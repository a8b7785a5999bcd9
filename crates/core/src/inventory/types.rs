//! Inventory domain types for movement requests and results.
//!
//! This module defines the core types used for requesting and applying
//! stock movements against per-item-per-warehouse balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stokra_shared::types::{ItemId, WarehouseId};
use uuid::Uuid;

use super::balance::StockBalance;

/// Costing method assigned to an item.
///
/// The valuation rules applied per movement are kind-based; the item's
/// costing method is recorded on every movement so the ledger can be
/// replayed under a different engine later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostingMethod {
    /// Weighted average of all receipts.
    WeightedAverage,
    /// First in, first out.
    Fifo,
    /// Last in, first out.
    Lifo,
    /// Moving average recomputed on every receipt.
    MovingAverage,
    /// Fixed standard cost.
    StandardCost,
    /// Cost tracked per identified unit.
    SpecificIdentification,
}

/// Kind of stock movement.
///
/// Positive-delta kinds add stock at an explicit cost; negative-delta kinds
/// remove stock priced at the balance's average cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Goods receipt from a supplier.
    Entry,
    /// Initial stock load for an item+warehouse pair.
    OpeningBalance,
    /// Inbound leg of a warehouse transfer.
    TransferIn,
    /// Outbound leg of a warehouse transfer.
    TransferOut,
    /// Outbound issue (consumption, sale, disposal).
    Withdrawal,
    /// Physical count or damage correction.
    Adjustment,
    /// Cost change with no quantity change.
    Revaluation,
}

impl MovementKind {
    /// Returns true for kinds that add stock at a caller-supplied cost.
    #[must_use]
    pub fn is_inbound(&self) -> bool {
        matches!(self, Self::Entry | Self::OpeningBalance | Self::TransferIn)
    }

    /// Returns true for kinds that remove stock priced from the balance.
    #[must_use]
    pub fn is_outbound(&self) -> bool {
        matches!(self, Self::Withdrawal | Self::TransferOut)
    }
}

/// Document type that originated a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Goods-receipt document.
    ItemEntry,
    /// Withdrawal document.
    Withdrawal,
    /// Warehouse transfer document.
    Transfer,
    /// Stock adjustment document.
    Adjustment,
}

/// Reference to the document a movement originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    /// The document type.
    pub kind: DocumentKind,
    /// The document's ID.
    pub id: Uuid,
}

/// A single requested stock movement.
///
/// One request maps to exactly one ledger row and one balance update.
/// `unit_cost` is required for inbound movements, adjustments, and
/// revaluations, and must be absent for outbound movements (which are
/// priced at the pre-movement average cost).
#[derive(Debug, Clone)]
pub struct MovementRequest {
    /// The item being moved.
    pub item_id: ItemId,
    /// The warehouse the movement applies to.
    pub warehouse_id: WarehouseId,
    /// The movement kind.
    pub kind: MovementKind,
    /// Signed quantity change (zero only for revaluations).
    pub quantity_delta: Decimal,
    /// Explicit unit cost, where the kind requires one.
    pub unit_cost: Option<Decimal>,
    /// Costing method in effect for the item.
    pub costing_method: CostingMethod,
    /// Originating document, if any.
    pub reference: Option<DocumentRef>,
    /// Free-text note.
    pub note: Option<String>,
}

/// Result of applying a movement request to a balance.
///
/// Produced by the valuation engine; the transaction coordinator persists
/// it as one ledger row plus one balance upsert.
#[derive(Debug, Clone)]
pub struct AppliedMovement {
    /// The movement kind.
    pub kind: MovementKind,
    /// Signed quantity change.
    pub quantity_delta: Decimal,
    /// Unit cost actually used (explicit or derived from the balance).
    pub unit_cost: Decimal,
    /// Signed value change.
    pub value_delta: Decimal,
    /// Costing method in effect.
    pub costing_method: CostingMethod,
    /// The balance after this movement, version bumped.
    pub balance_after: StockBalance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_kinds() {
        assert!(MovementKind::Entry.is_inbound());
        assert!(MovementKind::OpeningBalance.is_inbound());
        assert!(MovementKind::TransferIn.is_inbound());
        assert!(!MovementKind::Withdrawal.is_inbound());
        assert!(!MovementKind::Adjustment.is_inbound());
        assert!(!MovementKind::Revaluation.is_inbound());
    }

    #[test]
    fn test_outbound_kinds() {
        assert!(MovementKind::Withdrawal.is_outbound());
        assert!(MovementKind::TransferOut.is_outbound());
        assert!(!MovementKind::Entry.is_outbound());
        assert!(!MovementKind::Revaluation.is_outbound());
    }

    #[test]
    fn test_kind_serde_names() {
        let json = serde_json::to_string(&MovementKind::TransferOut).unwrap();
        assert_eq!(json, "\"transfer_out\"");
        let back: MovementKind = serde_json::from_str("\"opening_balance\"").unwrap();
        assert_eq!(back, MovementKind::OpeningBalance);
    }

    #[test]
    fn test_costing_method_serde_names() {
        let json = serde_json::to_string(&CostingMethod::WeightedAverage).unwrap();
        assert_eq!(json, "\"weighted_average\"");
    }
}
