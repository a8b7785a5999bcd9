//! `SeaORM` Entity for the item_entries (goods receipt) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::EntryStatus;

/// A goods-receipt document header.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_entries")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Generated document number (`ENT-YEAR-seq`), unique.
    #[sea_orm(unique)]
    pub number: String,
    /// Receiving warehouse.
    pub warehouse_id: Uuid,
    /// Supplier the goods came from, if recorded.
    pub supplier: Option<String>,
    /// Document status.
    pub status: EntryStatus,
    /// Free-text note.
    pub note: Option<String>,
    /// User who created the document.
    pub created_by: Uuid,
    /// User who posted the document.
    pub posted_by: Option<Uuid>,
    /// When the document was posted.
    pub posted_at: Option<DateTimeWithTimeZone>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last-update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Lines of this document.
    #[sea_orm(has_many = "super::item_entry_lines::Entity")]
    ItemEntryLines,
    /// The receiving warehouse.
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    Warehouses,
}

impl Related<super::item_entry_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemEntryLines.def()
    }
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
