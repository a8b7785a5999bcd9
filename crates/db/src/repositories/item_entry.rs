//! Goods-receipt document repository.
//!
//! Receipts are drafted with lines, then posted: posting turns the lines
//! into entry movements and flips the status in one transaction.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use stokra_core::documents::{entry_requests, EntryLineInput, RequestError};
use stokra_core::inventory::{CostingMethod, DocumentKind, DocumentRef};
use stokra_shared::types::{ItemEntryId, UserId, WarehouseId};

use crate::entities::{
    item_entries, item_entry_lines, items, sea_orm_active_enums::EntryStatus, stock_movements,
    warehouses,
};
use crate::repositories::document_number::DocumentNumberRepository;
use crate::repositories::movement::{MovementError, MovementRepository};

/// Bounded retries for posting races on fresh balance rows.
const MAX_POST_RETRIES: usize = 3;

/// Error types for goods-receipt operations.
#[derive(Debug, thiserror::Error)]
pub enum ItemEntryError {
    /// Document not found.
    #[error("Goods receipt not found: {0}")]
    NotFound(Uuid),

    /// Warehouse not found.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(Uuid),

    /// Only draft documents can be modified, posted, or cancelled.
    #[error("Goods receipt is not a draft")]
    NotDraft,

    /// Invalid document lines.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Movement application failed.
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a goods receipt.
#[derive(Debug, Clone)]
pub struct CreateItemEntryInput {
    /// Receiving warehouse.
    pub warehouse_id: WarehouseId,
    /// Supplier the goods came from.
    pub supplier: Option<String>,
    /// Free-text note.
    pub note: Option<String>,
    /// Received lines.
    pub lines: Vec<EntryLineInput>,
    /// User creating the document.
    pub created_by: UserId,
}

/// A goods receipt with its lines.
#[derive(Debug, Clone)]
pub struct ItemEntryWithLines {
    /// Document header.
    pub entry: item_entries::Model,
    /// Document lines.
    pub lines: Vec<item_entry_lines::Model>,
}

/// Result of posting a goods receipt.
#[derive(Debug, Clone)]
pub struct PostedItemEntry {
    /// The posted header.
    pub entry: item_entries::Model,
    /// The generated movements, one per line.
    pub movements: Vec<stock_movements::Model>,
}

/// Filter options for listing goods receipts.
#[derive(Debug, Clone, Default)]
pub struct ItemEntryFilter {
    /// Filter by status.
    pub status: Option<EntryStatus>,
    /// Filter by warehouse.
    pub warehouse_id: Option<Uuid>,
}

/// Goods-receipt repository.
#[derive(Debug, Clone)]
pub struct ItemEntryRepository {
    db: DatabaseConnection,
}

impl ItemEntryRepository {
    /// Creates a new goods-receipt repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft goods receipt with a generated number.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse is unknown, the lines are
    /// invalid, or the insert fails.
    pub async fn create(
        &self,
        input: CreateItemEntryInput,
    ) -> Result<ItemEntryWithLines, ItemEntryError> {
        validate_lines(&input.lines)?;
        self.check_warehouse(input.warehouse_id.into_inner()).await?;

        let txn = self.db.begin().await?;

        let number =
            DocumentNumberRepository::next_number_in(&txn, DocumentKind::ItemEntry, Utc::now().year())
                .await?;

        let now = Utc::now().into();
        let entry_id = ItemEntryId::new().into_inner();

        let entry = item_entries::ActiveModel {
            id: Set(entry_id),
            number: Set(number.to_string()),
            warehouse_id: Set(input.warehouse_id.into_inner()),
            supplier: Set(input.supplier),
            status: Set(EntryStatus::Draft),
            note: Set(input.note),
            created_by: Set(input.created_by.into_inner()),
            posted_by: Set(None),
            posted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let entry = entry.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let model = item_entry_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                entry_id: Set(entry_id),
                item_id: Set(line.item_id.into_inner()),
                quantity: Set(line.quantity),
                unit_cost: Set(line.unit_cost),
            };
            lines.push(model.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(number = %entry.number, "created goods receipt draft");
        Ok(ItemEntryWithLines { entry, lines })
    }

    /// Gets a goods receipt with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<ItemEntryWithLines, ItemEntryError> {
        let entry = item_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ItemEntryError::NotFound(id))?;

        let lines = item_entry_lines::Entity::find()
            .filter(item_entry_lines::Column::EntryId.eq(id))
            .all(&self.db)
            .await?;

        Ok(ItemEntryWithLines { entry, lines })
    }

    /// Lists goods receipts with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: ItemEntryFilter,
    ) -> Result<Vec<item_entries::Model>, ItemEntryError> {
        let mut query = item_entries::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(item_entries::Column::Status.eq(status));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(item_entries::Column::WarehouseId.eq(warehouse_id));
        }

        let entries = query
            .order_by_desc(item_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    /// Cancels a draft goods receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or not a draft.
    pub async fn cancel(&self, id: Uuid) -> Result<item_entries::Model, ItemEntryError> {
        let entry = item_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ItemEntryError::NotFound(id))?;

        if entry.status != EntryStatus::Draft {
            return Err(ItemEntryError::NotDraft);
        }

        let mut active: item_entries::ActiveModel = entry.into();
        active.status = Set(EntryStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());

        let cancelled = active.update(&self.db).await?;
        Ok(cancelled)
    }

    /// Posts a draft goods receipt: generates entry movements for every
    /// line and flips the status, atomically. Retries internally on
    /// first-balance-row races.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing, not a draft, a line is
    /// rejected, or storage fails. On error nothing is persisted.
    pub async fn post(
        &self,
        id: Uuid,
        acting_user: UserId,
    ) -> Result<PostedItemEntry, ItemEntryError> {
        let mut attempt = 0;
        loop {
            match self.try_post(id, acting_user).await {
                Err(ItemEntryError::Movement(err))
                    if err.is_retryable() && attempt + 1 < MAX_POST_RETRIES =>
                {
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn try_post(
        &self,
        id: Uuid,
        acting_user: UserId,
    ) -> Result<PostedItemEntry, ItemEntryError> {
        let txn = self.db.begin().await?;

        let entry = item_entries::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(ItemEntryError::NotFound(id))?;

        if entry.status != EntryStatus::Draft {
            return Err(ItemEntryError::NotDraft);
        }

        let lines = item_entry_lines::Entity::find()
            .filter(item_entry_lines::Column::EntryId.eq(id))
            .all(&txn)
            .await?;

        let line_inputs: Vec<EntryLineInput> = lines
            .iter()
            .map(|line| EntryLineInput {
                item_id: stokra_shared::types::ItemId::from_uuid(line.item_id),
                quantity: line.quantity,
                unit_cost: line.unit_cost,
            })
            .collect();

        let methods = costing_methods(&txn, lines.iter().map(|l| l.item_id)).await?;

        let reference = DocumentRef {
            kind: DocumentKind::ItemEntry,
            id,
        };
        let requests = entry_requests(
            reference,
            WarehouseId::from_uuid(entry.warehouse_id),
            &line_inputs,
            |item| methods.get(&item.into_inner()).copied(),
        )?;

        let movements = MovementRepository::apply_movements_in(&txn, acting_user, &requests).await?;

        let number = entry.number.clone();
        let mut active: item_entries::ActiveModel = entry.into();
        active.status = Set(EntryStatus::Posted);
        active.posted_by = Set(Some(acting_user.into_inner()));
        active.posted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        let entry = active.update(&txn).await?;

        txn.commit().await?;

        info!(number = %number, movements = movements.len(), "posted goods receipt");
        Ok(PostedItemEntry { entry, movements })
    }

    async fn check_warehouse(&self, warehouse_id: Uuid) -> Result<(), ItemEntryError> {
        warehouses::Entity::find_by_id(warehouse_id)
            .one(&self.db)
            .await?
            .ok_or(ItemEntryError::WarehouseNotFound(warehouse_id))?;
        Ok(())
    }
}

/// Shape-checks document lines before anything is persisted.
fn validate_lines(lines: &[EntryLineInput]) -> Result<(), RequestError> {
    if lines.is_empty() {
        return Err(RequestError::EmptyDocument);
    }
    for line in lines {
        if line.quantity <= rust_decimal::Decimal::ZERO {
            return Err(RequestError::NonPositiveQuantity {
                item_id: line.item_id,
                quantity: line.quantity,
            });
        }
        if line.unit_cost < rust_decimal::Decimal::ZERO {
            return Err(RequestError::NegativeUnitCost {
                item_id: line.item_id,
                unit_cost: line.unit_cost,
            });
        }
    }
    Ok(())
}

/// Loads the costing method for each distinct item id.
pub(crate) async fn costing_methods(
    txn: &DatabaseTransaction,
    item_ids: impl Iterator<Item = Uuid>,
) -> Result<HashMap<Uuid, CostingMethod>, DbErr> {
    let ids: Vec<Uuid> = item_ids.collect();
    let found = items::Entity::find()
        .filter(items::Column::Id.is_in(ids))
        .all(txn)
        .await?;

    Ok(found
        .into_iter()
        .map(|item| (item.id, item.costing_method.into()))
        .collect())
}
