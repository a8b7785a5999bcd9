//! `SeaORM` Entity for the stock_movements table.
//!
//! Append-only movement ledger. Rows are never updated or deleted; each
//! carries the balance snapshot resulting from its application.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CostingMethod, DocumentKind, MovementKind};

/// One immutable ledger entry.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The item moved.
    pub item_id: Uuid,
    /// The warehouse the movement applies to.
    pub warehouse_id: Uuid,
    /// Movement kind.
    pub kind: MovementKind,
    /// Signed quantity change.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_delta: Decimal,
    /// Unit cost used for this movement.
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub unit_cost: Decimal,
    /// Signed value change.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub value_delta: Decimal,
    /// Quantity on hand immediately after this movement.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_quantity: Decimal,
    /// Value on hand immediately after this movement.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance_value: Decimal,
    /// Position in the per-pair ledger (unique with item and warehouse).
    pub balance_version: i64,
    /// Costing method in effect when the movement was applied.
    pub costing_method: CostingMethod,
    /// Type of the originating document, if any.
    pub reference_kind: Option<DocumentKind>,
    /// ID of the originating document, if any.
    pub reference_id: Option<Uuid>,
    /// Free-text note.
    pub note: Option<String>,
    /// User the movement is attributed to.
    pub created_by: Uuid,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The item moved.
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
    /// The warehouse moved against.
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id"
    )]
    Warehouses,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
