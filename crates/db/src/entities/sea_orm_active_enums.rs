//! Postgres enum mappings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of stock movement.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_kind")]
pub enum MovementKind {
    /// Goods receipt.
    #[sea_orm(string_value = "entry")]
    Entry,
    /// Initial stock load.
    #[sea_orm(string_value = "opening_balance")]
    OpeningBalance,
    /// Inbound transfer leg.
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    /// Outbound transfer leg.
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    /// Outbound issue.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Count or damage correction.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// Cost restatement.
    #[sea_orm(string_value = "revaluation")]
    Revaluation,
}

/// Costing method assigned to an item.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "costing_method")]
pub enum CostingMethod {
    /// Weighted average.
    #[sea_orm(string_value = "weighted_average")]
    WeightedAverage,
    /// First in, first out.
    #[sea_orm(string_value = "fifo")]
    Fifo,
    /// Last in, first out.
    #[sea_orm(string_value = "lifo")]
    Lifo,
    /// Moving average.
    #[sea_orm(string_value = "moving_average")]
    MovingAverage,
    /// Fixed standard cost.
    #[sea_orm(string_value = "standard_cost")]
    StandardCost,
    /// Per-unit identification.
    #[sea_orm(string_value = "specific_identification")]
    SpecificIdentification,
}

/// Document type originating a movement.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_kind")]
pub enum DocumentKind {
    /// Goods-receipt document.
    #[sea_orm(string_value = "item_entry")]
    ItemEntry,
    /// Withdrawal document.
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
    /// Transfer document.
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Adjustment document.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

/// Goods-receipt document status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_status")]
pub enum EntryStatus {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Movements generated.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Abandoned.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Withdrawal document status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "withdrawal_status")]
pub enum WithdrawalStatus {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Movements generated.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Abandoned.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Transfer document status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transfer_status")]
pub enum TransferStatus {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Both legs executed.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Abandoned.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Adjustment document status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "adjustment_status")]
pub enum AdjustmentStatus {
    /// Being drafted.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Movements generated.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Abandoned.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

// Conversions between the pure core enums and their column mappings.

impl From<stokra_core::inventory::MovementKind> for MovementKind {
    fn from(kind: stokra_core::inventory::MovementKind) -> Self {
        use stokra_core::inventory::MovementKind as Core;
        match kind {
            Core::Entry => Self::Entry,
            Core::OpeningBalance => Self::OpeningBalance,
            Core::TransferIn => Self::TransferIn,
            Core::TransferOut => Self::TransferOut,
            Core::Withdrawal => Self::Withdrawal,
            Core::Adjustment => Self::Adjustment,
            Core::Revaluation => Self::Revaluation,
        }
    }
}

impl From<MovementKind> for stokra_core::inventory::MovementKind {
    fn from(kind: MovementKind) -> Self {
        use stokra_core::inventory::MovementKind as Core;
        match kind {
            MovementKind::Entry => Core::Entry,
            MovementKind::OpeningBalance => Core::OpeningBalance,
            MovementKind::TransferIn => Core::TransferIn,
            MovementKind::TransferOut => Core::TransferOut,
            MovementKind::Withdrawal => Core::Withdrawal,
            MovementKind::Adjustment => Core::Adjustment,
            MovementKind::Revaluation => Core::Revaluation,
        }
    }
}

impl From<stokra_core::inventory::CostingMethod> for CostingMethod {
    fn from(method: stokra_core::inventory::CostingMethod) -> Self {
        use stokra_core::inventory::CostingMethod as Core;
        match method {
            Core::WeightedAverage => Self::WeightedAverage,
            Core::Fifo => Self::Fifo,
            Core::Lifo => Self::Lifo,
            Core::MovingAverage => Self::MovingAverage,
            Core::StandardCost => Self::StandardCost,
            Core::SpecificIdentification => Self::SpecificIdentification,
        }
    }
}

impl From<CostingMethod> for stokra_core::inventory::CostingMethod {
    fn from(method: CostingMethod) -> Self {
        use stokra_core::inventory::CostingMethod as Core;
        match method {
            CostingMethod::WeightedAverage => Core::WeightedAverage,
            CostingMethod::Fifo => Core::Fifo,
            CostingMethod::Lifo => Core::Lifo,
            CostingMethod::MovingAverage => Core::MovingAverage,
            CostingMethod::StandardCost => Core::StandardCost,
            CostingMethod::SpecificIdentification => Core::SpecificIdentification,
        }
    }
}

impl From<stokra_core::inventory::DocumentKind> for DocumentKind {
    fn from(kind: stokra_core::inventory::DocumentKind) -> Self {
        use stokra_core::inventory::DocumentKind as Core;
        match kind {
            Core::ItemEntry => Self::ItemEntry,
            Core::Withdrawal => Self::Withdrawal,
            Core::Transfer => Self::Transfer,
            Core::Adjustment => Self::Adjustment,
        }
    }
}

impl From<DocumentKind> for stokra_core::inventory::DocumentKind {
    fn from(kind: DocumentKind) -> Self {
        use stokra_core::inventory::DocumentKind as Core;
        match kind {
            DocumentKind::ItemEntry => Core::ItemEntry,
            DocumentKind::Withdrawal => Core::Withdrawal,
            DocumentKind::Transfer => Core::Transfer,
            DocumentKind::Adjustment => Core::Adjustment,
        }
    }
}
