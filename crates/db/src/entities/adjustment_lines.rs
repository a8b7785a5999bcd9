//! `SeaORM` Entity for the adjustment_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One counted item line.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "adjustment_lines")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Parent document.
    pub adjustment_id: Uuid,
    /// Counted item.
    pub item_id: Uuid,
    /// Quantity the system believed was on hand.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub system_quantity: Decimal,
    /// Quantity actually counted.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub actual_quantity: Decimal,
    /// Unit cost establishing the new cost basis.
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub unit_cost: Decimal,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The parent document.
    #[sea_orm(
        belongs_to = "super::adjustments::Entity",
        from = "Column::AdjustmentId",
        to = "super::adjustments::Column::Id"
    )]
    Adjustments,
    /// The counted item.
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
}

impl Related<super::adjustments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustments.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
