//! `SeaORM` Entity for the withdrawal_lines table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One issued item line. Costs are derived from the balance at posting.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal_lines")]
pub struct Model {
    /// Primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Parent document.
    pub withdrawal_id: Uuid,
    /// Issued item.
    pub item_id: Uuid,
    /// Issued quantity.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity: Decimal,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The parent document.
    #[sea_orm(
        belongs_to = "super::withdrawals::Entity",
        from = "Column::WithdrawalId",
        to = "super::withdrawals::Column::Id"
    )]
    Withdrawals,
    /// The issued item.
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
}

impl Related<super::withdrawals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
