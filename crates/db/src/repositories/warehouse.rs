//! Warehouse repository for catalog database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use stokra_shared::types::WarehouseId;

use crate::entities::{
    sea_orm_active_enums::CostingMethod, stock_balances, stock_movements, warehouses,
};

/// Error types for warehouse operations.
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    /// Warehouse name already exists.
    #[error("Warehouse name '{0}' already exists")]
    DuplicateName(String),

    /// Warehouse not found.
    #[error("Warehouse not found: {0}")]
    NotFound(Uuid),

    /// Cannot delete a warehouse with stock or movement history.
    #[error("Cannot delete warehouse: it has {balances} balances and {movements} movements")]
    CannotDeleteReferenced {
        /// Current balance rows.
        balances: u64,
        /// Ledger rows.
        movements: u64,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a warehouse.
#[derive(Debug, Clone)]
pub struct CreateWarehouseInput {
    /// Warehouse name (unique).
    pub name: String,
    /// Physical location.
    pub location: Option<String>,
    /// Whether this becomes the main warehouse.
    pub is_main: bool,
    /// Default costing method.
    pub default_costing_method: CostingMethod,
}

/// Input for updating a warehouse.
#[derive(Debug, Clone, Default)]
pub struct UpdateWarehouseInput {
    /// Warehouse name.
    pub name: Option<String>,
    /// Physical location.
    pub location: Option<Option<String>>,
    /// Whether this becomes the main warehouse.
    pub is_main: Option<bool>,
    /// Default costing method.
    pub default_costing_method: Option<CostingMethod>,
}

/// Warehouse repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    db: DatabaseConnection,
}

impl WarehouseRepository {
    /// Creates a new warehouse repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new warehouse. Flagging it main demotes the current main
    /// warehouse in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the insert fails.
    pub async fn create(
        &self,
        input: CreateWarehouseInput,
    ) -> Result<warehouses::Model, WarehouseError> {
        let existing = warehouses::Entity::find()
            .filter(warehouses::Column::Name.eq(&input.name))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(WarehouseError::DuplicateName(input.name));
        }

        let txn = self.db.begin().await?;

        if input.is_main {
            Self::demote_current_main(&txn).await?;
        }

        let now = Utc::now().into();
        let warehouse = warehouses::ActiveModel {
            id: Set(WarehouseId::new().into_inner()),
            name: Set(input.name),
            location: Set(input.location),
            is_main: Set(input.is_main),
            default_costing_method: Set(input.default_costing_method),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let warehouse = warehouse.insert(&txn).await?;
        txn.commit().await?;

        Ok(warehouse)
    }

    /// Gets a warehouse by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse is missing or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<warehouses::Model, WarehouseError> {
        warehouses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(WarehouseError::NotFound(id))
    }

    /// Gets the main warehouse, if one is flagged.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_main(&self) -> Result<Option<warehouses::Model>, WarehouseError> {
        let warehouse = warehouses::Entity::find()
            .filter(warehouses::Column::IsMain.eq(true))
            .one(&self.db)
            .await?;
        Ok(warehouse)
    }

    /// Lists all warehouses ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self) -> Result<Vec<warehouses::Model>, WarehouseError> {
        let warehouses = warehouses::Entity::find()
            .order_by_asc(warehouses::Column::Name)
            .all(&self.db)
            .await?;
        Ok(warehouses)
    }

    /// Updates a warehouse. Flagging it main demotes the current main
    /// warehouse in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse is missing, the new name is
    /// taken, or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateWarehouseInput,
    ) -> Result<warehouses::Model, WarehouseError> {
        let warehouse = self.get(id).await?;

        if let Some(name) = &input.name {
            if *name != warehouse.name {
                let taken = warehouses::Entity::find()
                    .filter(warehouses::Column::Name.eq(name))
                    .filter(warehouses::Column::Id.ne(id))
                    .count(&self.db)
                    .await?;
                if taken > 0 {
                    return Err(WarehouseError::DuplicateName(name.clone()));
                }
            }
        }

        let txn = self.db.begin().await?;

        if input.is_main == Some(true) && !warehouse.is_main {
            Self::demote_current_main(&txn).await?;
        }

        let mut active: warehouses::ActiveModel = warehouse.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(is_main) = input.is_main {
            active.is_main = Set(is_main);
        }
        if let Some(method) = input.default_costing_method {
            active.default_costing_method = Set(method);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Deletes a warehouse. Blocked once any balance or movement
    /// references it.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse is missing, referenced, or the
    /// delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), WarehouseError> {
        let warehouse = self.get(id).await?;

        let balances = stock_balances::Entity::find()
            .filter(stock_balances::Column::WarehouseId.eq(id))
            .count(&self.db)
            .await?;
        let movements = stock_movements::Entity::find()
            .filter(stock_movements::Column::WarehouseId.eq(id))
            .count(&self.db)
            .await?;

        if balances > 0 || movements > 0 {
            return Err(WarehouseError::CannotDeleteReferenced {
                balances,
                movements,
            });
        }

        warehouses::Entity::delete_by_id(warehouse.id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Clears the main flag on whichever warehouse currently holds it.
    async fn demote_current_main<C: sea_orm::ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
        let current = warehouses::Entity::find()
            .filter(warehouses::Column::IsMain.eq(true))
            .all(conn)
            .await?;

        for warehouse in current {
            let mut active: warehouses::ActiveModel = warehouse.into();
            active.is_main = Set(false);
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;
        }

        Ok(())
    }
}
