//! Document statuses and line inputs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stokra_shared::types::ItemId;

/// Status of a goods-receipt document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Being drafted, lines editable.
    Draft,
    /// Movements generated, immutable.
    Posted,
    /// Abandoned before posting.
    Cancelled,
}

/// Status of a withdrawal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    /// Being drafted, lines editable.
    Draft,
    /// Movements generated, immutable.
    Posted,
    /// Abandoned before posting.
    Cancelled,
}

/// Status of a warehouse transfer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Being drafted, lines editable.
    Draft,
    /// Both legs executed, immutable.
    Completed,
    /// Abandoned before execution.
    Cancelled,
}

/// Status of a stock adjustment document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentStatus {
    /// Being drafted, lines editable.
    Draft,
    /// Movements generated, immutable.
    Posted,
    /// Abandoned before posting.
    Cancelled,
}

macro_rules! status_rules {
    ($name:ident, $terminal:ident) => {
        impl $name {
            /// Returns true if the document can still be modified.
            #[must_use]
            pub fn is_editable(&self) -> bool {
                matches!(self, Self::Draft)
            }

            /// Returns true if movements have been generated.
            #[must_use]
            pub fn is_executed(&self) -> bool {
                matches!(self, Self::$terminal)
            }
        }
    };
}

status_rules!(EntryStatus, Posted);
status_rules!(WithdrawalStatus, Posted);
status_rules!(TransferStatus, Completed);
status_rules!(AdjustmentStatus, Posted);

/// One line of a goods-receipt document.
#[derive(Debug, Clone)]
pub struct EntryLineInput {
    /// The received item.
    pub item_id: ItemId,
    /// Received quantity (positive).
    pub quantity: Decimal,
    /// Landed unit cost.
    pub unit_cost: Decimal,
}

/// One line of a withdrawal document.
#[derive(Debug, Clone)]
pub struct WithdrawalLineInput {
    /// The issued item.
    pub item_id: ItemId,
    /// Issued quantity (positive).
    pub quantity: Decimal,
}

/// One line of a transfer document.
#[derive(Debug, Clone)]
pub struct TransferLineInput {
    /// The transferred item.
    pub item_id: ItemId,
    /// Transferred quantity (positive).
    pub quantity: Decimal,
}

/// A transfer line priced by its executed outbound leg.
#[derive(Debug, Clone)]
pub struct PricedTransferLine {
    /// The transferred item.
    pub item_id: ItemId,
    /// Transferred quantity (positive).
    pub quantity: Decimal,
    /// Unit cost taken from the outbound movement.
    pub unit_cost: Decimal,
}

/// One line of an adjustment document.
///
/// The caller supplies both quantities; the movement delta is
/// `actual_quantity - system_quantity`.
#[derive(Debug, Clone)]
pub struct AdjustmentLineInput {
    /// The counted item.
    pub item_id: ItemId,
    /// Quantity the system believed was on hand.
    pub system_quantity: Decimal,
    /// Quantity actually counted.
    pub actual_quantity: Decimal,
    /// Unit cost establishing the new cost basis.
    pub unit_cost: Decimal,
}

impl AdjustmentLineInput {
    /// The signed quantity delta this line applies.
    #[must_use]
    pub fn delta(&self) -> Decimal {
        self.actual_quantity - self.system_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_draft_is_editable() {
        assert!(EntryStatus::Draft.is_editable());
        assert!(WithdrawalStatus::Draft.is_editable());
        assert!(TransferStatus::Draft.is_editable());
        assert!(AdjustmentStatus::Draft.is_editable());
    }

    #[test]
    fn test_executed_states() {
        assert!(EntryStatus::Posted.is_executed());
        assert!(TransferStatus::Completed.is_executed());
        assert!(!EntryStatus::Cancelled.is_executed());
        assert!(!AdjustmentStatus::Draft.is_executed());
    }

    #[test]
    fn test_executed_is_not_editable() {
        assert!(!WithdrawalStatus::Posted.is_editable());
        assert!(!TransferStatus::Completed.is_editable());
        assert!(!AdjustmentStatus::Cancelled.is_editable());
    }

    #[test]
    fn test_adjustment_delta() {
        let line = AdjustmentLineInput {
            item_id: ItemId::new(),
            system_quantity: dec!(70),
            actual_quantity: dec!(65),
            unit_cost: dec!(11),
        };
        assert_eq!(line.delta(), dec!(-5));
    }
}
