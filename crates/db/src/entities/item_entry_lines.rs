//! `SeaORM` Entity for the item_entry_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One received item line.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_entry_lines")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Parent document.
    pub entry_id: Uuid,
    /// Received item.
    pub item_id: Uuid,
    /// Received quantity.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
    /// Landed unit cost.
    #[sea_orm(column_type = "Decimal(Some((19, 6)))")]
    pub unit_cost: Decimal,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The parent document.
    #[sea_orm(
        belongs_to = "super::item_entries::Entity",
        from = "Column::EntryId",
        to = "super::item_entries::Column::Id"
    )]
    ItemEntries,
    /// The received item.
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
}

impl Related<super::item_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemEntries.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
