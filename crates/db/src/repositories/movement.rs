//! Movement repository: the transaction coordinator.
//!
//! Makes the valuation engine's pure computation durable and atomic. Each
//! batch of movement requests is applied in one database transaction:
//! balance rows are locked with `SELECT ... FOR UPDATE` in deterministic
//! key order, each request reads the just-updated balance of any earlier
//! request in the same batch, and one ledger row plus one balance upsert
//! is written per request. On any line failing validation the whole batch
//! rolls back and the failing line is reported.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use stokra_core::inventory::{MovementRequest, StockBalance, ValuationEngine, ValuationError};
use stokra_shared::types::{MovementId, PageRequest, PageResponse, UserId};

use crate::entities::{items, sea_orm_active_enums::DocumentKind, stock_balances, stock_movements, warehouses};

/// Bounded internal retries for first-insert races on fresh balance rows.
const MAX_RETRIES: usize = 3;

/// Error types for movement application.
#[derive(Debug, thiserror::Error)]
pub enum MovementError {
    /// A request references an item that does not exist.
    #[error("Unknown item: {0}")]
    UnknownItem(Uuid),

    /// A request references a warehouse that does not exist.
    #[error("Unknown warehouse: {0}")]
    UnknownWarehouse(Uuid),

    /// A line was rejected by the valuation engine. The whole batch is
    /// rolled back.
    #[error("Line {line} rejected for item {item_id}: {source}")]
    Rejected {
        /// Zero-based index of the failing request.
        line: usize,
        /// The item of the failing request.
        item_id: Uuid,
        /// The warehouse of the failing request.
        warehouse_id: Uuid,
        /// The engine's reason.
        source: ValuationError,
    },

    /// Contention the locking scheme could not resolve within the retry
    /// budget.
    #[error("Concurrent modification detected, please retry")]
    ConcurrencyConflict,

    /// Underlying storage error. Never swallowed.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl MovementError {
    /// Returns the error code for caller-facing messages.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownItem(_) | Self::UnknownWarehouse(_) => "UNKNOWN_ITEM_OR_WAREHOUSE",
            Self::Rejected { source, .. } => source.error_code(),
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
            Self::Database(_) => "PERSISTENCE_FAILURE",
        }
    }

    /// Returns true if retrying the batch may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict)
    }
}

/// Classifies a database error from a write inside the batch.
///
/// A unique-constraint violation here means another transaction created
/// the same balance row (or ledger position) between our lock query and
/// our insert; the batch can be retried against the now-existing row.
fn classify_db_err(err: DbErr) -> MovementError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => MovementError::ConcurrencyConflict,
        _ => MovementError::Database(err),
    }
}

/// Movement repository: atomic batch application plus ledger/balance reads.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Creates a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a batch of movement requests atomically.
    ///
    /// Retries internally (bounded) when two callers race to create the
    /// first balance row for the same item+warehouse pair.
    ///
    /// # Errors
    ///
    /// Returns `MovementError` if any line fails validation, a referenced
    /// id is unknown, contention exceeds the retry budget, or storage
    /// fails. No partial application is ever observable.
    pub async fn apply_movements(
        &self,
        acting_user: UserId,
        requests: &[MovementRequest],
    ) -> Result<Vec<stock_movements::Model>, MovementError> {
        let mut attempt = 0;
        loop {
            let txn = self.db.begin().await?;
            match Self::apply_movements_in(&txn, acting_user, requests).await {
                Ok(models) => {
                    txn.commit().await?;
                    info!(count = models.len(), "applied movement batch");
                    return Ok(models);
                }
                Err(err) if err.is_retryable() && attempt + 1 < MAX_RETRIES => {
                    txn.rollback().await.ok();
                    attempt += 1;
                    debug!(attempt, "retrying movement batch after conflict");
                }
                Err(err) => {
                    txn.rollback().await.ok();
                    return Err(err);
                }
            }
        }
    }

    /// Applies a batch inside an existing transaction.
    ///
    /// Document workflows use this to compose movement application with
    /// their own status updates atomically. The caller owns commit and
    /// rollback; retry on `ConcurrencyConflict` means re-running the whole
    /// caller transaction.
    ///
    /// # Errors
    ///
    /// See [`MovementRepository::apply_movements`].
    pub async fn apply_movements_in(
        txn: &DatabaseTransaction,
        acting_user: UserId,
        requests: &[MovementRequest],
    ) -> Result<Vec<stock_movements::Model>, MovementError> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        Self::check_references(txn, requests).await?;

        // Lock all touched balance rows up front, in deterministic key
        // order so overlapping batches acquire locks in the same sequence.
        let keys: BTreeSet<(Uuid, Uuid)> = requests
            .iter()
            .map(|r| (r.item_id.into_inner(), r.warehouse_id.into_inner()))
            .collect();

        let mut condition = Condition::any();
        for (item_id, warehouse_id) in &keys {
            condition = condition.add(
                stock_balances::Column::ItemId
                    .eq(*item_id)
                    .and(stock_balances::Column::WarehouseId.eq(*warehouse_id)),
            );
        }

        let locked = stock_balances::Entity::find()
            .filter(condition)
            .order_by_asc(stock_balances::Column::ItemId)
            .order_by_asc(stock_balances::Column::WarehouseId)
            .lock_exclusive()
            .all(txn)
            .await?;

        let mut row_ids: HashMap<(Uuid, Uuid), Uuid> = HashMap::with_capacity(locked.len());
        let mut balances: HashMap<(Uuid, Uuid), StockBalance> =
            HashMap::with_capacity(locked.len());
        for row in locked {
            let key = (row.item_id, row.warehouse_id);
            row_ids.insert(key, row.id);
            balances.insert(
                key,
                StockBalance {
                    quantity: row.quantity,
                    total_value: row.total_value,
                    avg_unit_cost: row.avg_unit_cost,
                    version: row.version,
                },
            );
        }

        let now = Utc::now().into();
        let mut inserted = Vec::with_capacity(requests.len());

        for (line, request) in requests.iter().enumerate() {
            let key = (
                request.item_id.into_inner(),
                request.warehouse_id.into_inner(),
            );

            let applied = ValuationEngine::apply_movement(balances.get(&key), request).map_err(
                |source| MovementError::Rejected {
                    line,
                    item_id: key.0,
                    warehouse_id: key.1,
                    source,
                },
            )?;

            let movement = stock_movements::ActiveModel {
                id: Set(MovementId::new().into_inner()),
                item_id: Set(key.0),
                warehouse_id: Set(key.1),
                kind: Set(applied.kind.into()),
                quantity_delta: Set(applied.quantity_delta),
                unit_cost: Set(applied.unit_cost),
                value_delta: Set(applied.value_delta),
                balance_quantity: Set(applied.balance_after.quantity),
                balance_value: Set(applied.balance_after.total_value),
                balance_version: Set(applied.balance_after.version),
                costing_method: Set(applied.costing_method.into()),
                reference_kind: Set(request.reference.map(|r| r.kind.into())),
                reference_id: Set(request.reference.map(|r| r.id)),
                note: Set(request.note.clone()),
                created_by: Set(acting_user.into_inner()),
                created_at: Set(now),
            };
            let movement = movement.insert(txn).await.map_err(classify_db_err)?;

            if let Some(&row_id) = row_ids.get(&key) {
                stock_balances::ActiveModel {
                    id: Set(row_id),
                    quantity: Set(applied.balance_after.quantity),
                    total_value: Set(applied.balance_after.total_value),
                    avg_unit_cost: Set(applied.balance_after.avg_unit_cost),
                    version: Set(applied.balance_after.version),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .update(txn)
                .await?;
            } else {
                let row_id = Uuid::now_v7();
                stock_balances::ActiveModel {
                    id: Set(row_id),
                    item_id: Set(key.0),
                    warehouse_id: Set(key.1),
                    quantity: Set(applied.balance_after.quantity),
                    total_value: Set(applied.balance_after.total_value),
                    avg_unit_cost: Set(applied.balance_after.avg_unit_cost),
                    version: Set(applied.balance_after.version),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(classify_db_err)?;
                row_ids.insert(key, row_id);
            }

            // Later lines for the same pair read this updated balance.
            balances.insert(key, applied.balance_after);
            inserted.push(movement);
        }

        Ok(inserted)
    }

    /// Fails fast when a request references an unknown item or warehouse.
    async fn check_references(
        txn: &DatabaseTransaction,
        requests: &[MovementRequest],
    ) -> Result<(), MovementError> {
        let item_ids: BTreeSet<Uuid> = requests.iter().map(|r| r.item_id.into_inner()).collect();
        let warehouse_ids: BTreeSet<Uuid> = requests
            .iter()
            .map(|r| r.warehouse_id.into_inner())
            .collect();

        let found_items: BTreeSet<Uuid> = items::Entity::find()
            .filter(items::Column::Id.is_in(item_ids.iter().copied()))
            .all(txn)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();
        if let Some(missing) = item_ids.difference(&found_items).next() {
            return Err(MovementError::UnknownItem(*missing));
        }

        let found_warehouses: BTreeSet<Uuid> = warehouses::Entity::find()
            .filter(warehouses::Column::Id.is_in(warehouse_ids.iter().copied()))
            .all(txn)
            .await?
            .into_iter()
            .map(|w| w.id)
            .collect();
        if let Some(missing) = warehouse_ids.difference(&found_warehouses).next() {
            return Err(MovementError::UnknownWarehouse(*missing));
        }

        Ok(())
    }

    /// Gets the current balance row for an item+warehouse pair.
    ///
    /// Returns `None` when no movement has ever touched the pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_balance(
        &self,
        item_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<Option<stock_balances::Model>, MovementError> {
        let balance = stock_balances::Entity::find()
            .filter(stock_balances::Column::ItemId.eq(item_id))
            .filter(stock_balances::Column::WarehouseId.eq(warehouse_id))
            .one(&self.db)
            .await?;

        Ok(balance)
    }

    /// Lists current balances, optionally restricted to one warehouse.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_balances(
        &self,
        warehouse_id: Option<Uuid>,
    ) -> Result<Vec<stock_balances::Model>, MovementError> {
        let mut query = stock_balances::Entity::find();

        if let Some(warehouse_id) = warehouse_id {
            query = query.filter(stock_balances::Column::WarehouseId.eq(warehouse_id));
        }

        let balances = query
            .order_by_asc(stock_balances::Column::ItemId)
            .all(&self.db)
            .await?;

        Ok(balances)
    }

    /// Lists balances at or below their item's reorder level.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_low_stock(
        &self,
    ) -> Result<Vec<(stock_balances::Model, items::Model)>, MovementError> {
        let rows = stock_balances::Entity::find()
            .find_also_related(items::Entity)
            .filter(items::Column::ReorderLevel.is_not_null())
            .filter(
                Expr::col((stock_balances::Entity, stock_balances::Column::Quantity)).lte(
                    Expr::col((items::Entity, items::Column::ReorderLevel)),
                ),
            )
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(balance, item)| item.map(|i| (balance, i)))
            .collect())
    }

    /// Movement history for an item+warehouse pair in ledger order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn movement_history(
        &self,
        item_id: Uuid,
        warehouse_id: Uuid,
        page: &PageRequest,
    ) -> Result<PageResponse<stock_movements::Model>, MovementError> {
        let query = stock_movements::Entity::find()
            .filter(stock_movements::Column::ItemId.eq(item_id))
            .filter(stock_movements::Column::WarehouseId.eq(warehouse_id));

        let total = query.clone().count(&self.db).await?;

        let movements = query
            .order_by_asc(stock_movements::Column::BalanceVersion)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(movements, page, total))
    }

    /// Movements generated by one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn movements_for_document(
        &self,
        reference_kind: DocumentKind,
        reference_id: Uuid,
    ) -> Result<Vec<stock_movements::Model>, MovementError> {
        let movements = stock_movements::Entity::find()
            .filter(stock_movements::Column::ReferenceKind.eq(reference_kind))
            .filter(stock_movements::Column::ReferenceId.eq(reference_id))
            .order_by_asc(stock_movements::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(movements)
    }
}
