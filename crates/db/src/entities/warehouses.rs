//! `SeaORM` Entity for the warehouses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CostingMethod;

/// A storage location.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Warehouse name, unique.
    #[sea_orm(unique)]
    pub name: String,
    /// Physical location.
    pub location: Option<String>,
    /// At most one warehouse is flagged as main (partial unique index).
    pub is_main: bool,
    /// Default costing method for items received here.
    pub default_costing_method: CostingMethod,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last-update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Balances held in this warehouse.
    #[sea_orm(has_many = "super::stock_balances::Entity")]
    StockBalances,
    /// Movements against this warehouse.
    #[sea_orm(has_many = "super::stock_movements::Entity")]
    StockMovements,
}

impl Related<super::stock_balances::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockBalances.def()
    }
}

impl Related<super::stock_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
