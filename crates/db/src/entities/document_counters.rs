//! `SeaORM` Entity for the document_counters table.
//!
//! One row per (prefix, year); `last_value` is bumped with a single atomic
//! upsert so concurrent document creation never yields duplicate numbers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Atomic sequence counter for document numbers.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document_counters")]
pub struct Model {
    /// Document-type prefix (e.g. `ADJ`).
    #[sea_orm(primary_key, auto_increment = false)]
    pub prefix: String,
    /// Calendar year.
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Last sequence value handed out.
    pub last_value: i64,
}

/// Entity relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
