//! Item repository for catalog database operations.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use stokra_shared::types::ItemId;

use crate::entities::{items, sea_orm_active_enums::CostingMethod, stock_movements};

/// Error types for item operations.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Item code already exists.
    #[error("Item code '{0}' already exists")]
    DuplicateCode(String),

    /// Item not found.
    #[error("Item not found: {0}")]
    NotFound(Uuid),

    /// Cannot change the code of an item referenced by movements.
    #[error("Cannot change code: item has {0} movements")]
    CodeImmutable(u64),

    /// Cannot delete an item referenced by movements.
    #[error("Cannot delete item: it has {0} movements")]
    CannotDeleteWithMovements(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    /// Identifying code (unique).
    pub code: String,
    /// Description.
    pub description: String,
    /// Unit of measure.
    pub unit: String,
    /// Standard cost.
    pub standard_cost: Decimal,
    /// Costing method.
    pub costing_method: CostingMethod,
    /// Reorder point.
    pub reorder_level: Option<Decimal>,
    /// Minimum stock level.
    pub min_level: Option<Decimal>,
    /// Maximum stock level.
    pub max_level: Option<Decimal>,
    /// Owning supplier.
    pub supplier: Option<String>,
}

/// Input for updating an item. `None` leaves a field untouched;
/// `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemInput {
    /// Identifying code (only while no movements reference the item).
    pub code: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Unit of measure.
    pub unit: Option<String>,
    /// Standard cost.
    pub standard_cost: Option<Decimal>,
    /// Costing method.
    pub costing_method: Option<CostingMethod>,
    /// Reorder point.
    pub reorder_level: Option<Option<Decimal>>,
    /// Minimum stock level.
    pub min_level: Option<Option<Decimal>>,
    /// Maximum stock level.
    pub max_level: Option<Option<Decimal>>,
    /// Owning supplier.
    pub supplier: Option<Option<String>>,
}

/// Filter options for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Substring match on code or description.
    pub search: Option<String>,
    /// Filter by costing method.
    pub costing_method: Option<CostingMethod>,
    /// Filter by supplier.
    pub supplier: Option<String>,
}

/// Item repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    db: DatabaseConnection,
}

impl ItemRepository {
    /// Creates a new item repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new item.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken or the insert fails.
    pub async fn create(&self, input: CreateItemInput) -> Result<items::Model, ItemError> {
        let existing = items::Entity::find()
            .filter(items::Column::Code.eq(&input.code))
            .count(&self.db)
            .await?;
        if existing > 0 {
            return Err(ItemError::DuplicateCode(input.code));
        }

        let now = Utc::now().into();
        let item = items::ActiveModel {
            id: Set(ItemId::new().into_inner()),
            code: Set(input.code),
            description: Set(input.description),
            unit: Set(input.unit),
            standard_cost: Set(input.standard_cost),
            costing_method: Set(input.costing_method),
            reorder_level: Set(input.reorder_level),
            min_level: Set(input.min_level),
            max_level: Set(input.max_level),
            supplier: Set(input.supplier),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let item = item.insert(&self.db).await?;
        Ok(item)
    }

    /// Gets an item by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<items::Model, ItemError> {
        items::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    /// Gets an item by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<items::Model>, ItemError> {
        let item = items::Entity::find()
            .filter(items::Column::Code.eq(code))
            .one(&self.db)
            .await?;
        Ok(item)
    }

    /// Lists items with optional filters, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, filter: ItemFilter) -> Result<Vec<items::Model>, ItemError> {
        let mut query = items::Entity::find();

        if let Some(search) = filter.search {
            let pattern = format!("%{search}%");
            query = query.filter(
                Condition::any()
                    .add(items::Column::Code.like(&pattern))
                    .add(items::Column::Description.like(&pattern)),
            );
        }

        if let Some(method) = filter.costing_method {
            query = query.filter(items::Column::CostingMethod.eq(method));
        }

        if let Some(supplier) = filter.supplier {
            query = query.filter(items::Column::Supplier.eq(supplier));
        }

        let items = query.order_by_asc(items::Column::Code).all(&self.db).await?;
        Ok(items)
    }

    /// Updates an item. The code is immutable once movements reference it.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing, the new code is taken, the
    /// code change is blocked, or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateItemInput,
    ) -> Result<items::Model, ItemError> {
        let item = self.get(id).await?;

        if let Some(code) = &input.code {
            if *code != item.code {
                let movements = self.movement_count(id).await?;
                if movements > 0 {
                    return Err(ItemError::CodeImmutable(movements));
                }
                let taken = items::Entity::find()
                    .filter(items::Column::Code.eq(code))
                    .filter(items::Column::Id.ne(id))
                    .count(&self.db)
                    .await?;
                if taken > 0 {
                    return Err(ItemError::DuplicateCode(code.clone()));
                }
            }
        }

        let mut active: items::ActiveModel = item.into();

        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(unit) = input.unit {
            active.unit = Set(unit);
        }
        if let Some(standard_cost) = input.standard_cost {
            active.standard_cost = Set(standard_cost);
        }
        if let Some(method) = input.costing_method {
            active.costing_method = Set(method);
        }
        if let Some(reorder_level) = input.reorder_level {
            active.reorder_level = Set(reorder_level);
        }
        if let Some(min_level) = input.min_level {
            active.min_level = Set(min_level);
        }
        if let Some(max_level) = input.max_level {
            active.max_level = Set(max_level);
        }
        if let Some(supplier) = input.supplier {
            active.supplier = Set(supplier);
        }
        active.updated_at = Set(Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Deletes an item. Blocked once any movement references it.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing, referenced, or the delete
    /// fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), ItemError> {
        let item = self.get(id).await?;

        let movements = self.movement_count(id).await?;
        if movements > 0 {
            return Err(ItemError::CannotDeleteWithMovements(movements));
        }

        items::Entity::delete_by_id(item.id).exec(&self.db).await?;
        Ok(())
    }

    async fn movement_count(&self, item_id: Uuid) -> Result<u64, ItemError> {
        let count = stock_movements::Entity::find()
            .filter(stock_movements::Column::ItemId.eq(item_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }
}
