//! `SeaORM` Entity for the items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::CostingMethod;

/// A stock-keeping unit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Identifying code, unique and immutable once referenced by movements.
    #[sea_orm(unique)]
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Unit of measure (e.g. "pcs", "kg").
    pub unit: String,
    /// Standard cost used for planning and standard-cost valuation.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub standard_cost: Decimal,
    /// Costing method in effect for this item.
    pub costing_method: CostingMethod,
    /// Reorder point, if managed.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub reorder_level: Option<Decimal>,
    /// Minimum stock level, if managed.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub min_level: Option<Decimal>,
    /// Maximum stock level, if managed.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub max_level: Option<Decimal>,
    /// Owning supplier, if any.
    pub supplier: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
    /// Last-update timestamp.
    pub updated_at: DateTimeWithTimeZone,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Balances for this item.
    #[sea_orm(has_many = "super::stock_balances::Entity")]
    StockBalances,
    /// Movements for this item.
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
