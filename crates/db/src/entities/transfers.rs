//! `SeaORM` Entity for the transfers table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransferStatus;

/// A warehouse transfer document header.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Generated document number (`TRF-YEAR-seq`), unique.
    #[sea_orm(unique)]
    pub number: String,
    /// Warehouse the stock leaves.
    pub source_warehouse_id: Uuid,
    /// Warehouse the stock arrives at.
    pub destination_warehouse_id: Uuid,
    /// Document status.
    pub status: TransferStatus,
    /// Free-text note.
    pub note: Option<String>,
    /// User who created the document.
    pub created_by: Uuid,
    /// User who executed the transfer.
    pub completed_by: Option<Uuid>,
    /// When the transfer was executed.
    pub completed_at: Option<DateTimeWithTimeZone>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last-update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Lines of this document.
    #[sea_orm(has_many = "super::transfer_lines::Entity")]
    TransferLines,
    /// The source warehouse.
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::SourceWarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    SourceWarehouse,
    /// The destination warehouse.
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::DestinationWarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    DestinationWarehouse,
}

impl Related<super::transfer_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransferLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
