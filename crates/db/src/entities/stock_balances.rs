//! `SeaORM` Entity for the stock_balances table.
//!
//! One row per (item, warehouse) pair: the materialized view of the
//! movement ledger, updated transactionally alongside it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Current balance for one item in one warehouse.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_balances")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The item.
    pub item_id: Uuid,
    /// The warehouse.
    pub warehouse_id: Uuid,
    /// Quantity on hand. Never negative (CHECK constraint).
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    /// Total value on hand. Never negative (CHECK constraint).
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_value: Decimal,
    /// Average unit cost. Retained as cost memory at zero quantity.
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub avg_unit_cost: Decimal,
    /// Number of movements applied to this pair.
    pub version: i64,
    /// Creation timestamp (first movement).
    pub created_at: DateTimeWithTimeZone,
    /// Last-update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The item this balance belongs to.
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
    /// The warehouse this balance belongs to.
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
