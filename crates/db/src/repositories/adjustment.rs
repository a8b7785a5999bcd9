//! Adjustment document repository.
//!
//! Adjustments record a physical count (system vs actual quantity) per
//! line. Posting applies the deltas and re-bases each touched balance to
//! the line's unit cost. Lines whose count matches the system quantity
//! generate no movement; the document still posts.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use stokra_core::documents::{adjustment_requests, AdjustmentLineInput, RequestError};
use stokra_core::inventory::{DocumentKind, DocumentRef};
use stokra_shared::types::{AdjustmentId, ItemId, UserId, WarehouseId};

use crate::entities::{
    adjustment_lines, adjustments, sea_orm_active_enums::AdjustmentStatus, stock_movements,
    warehouses,
};
use crate::repositories::document_number::DocumentNumberRepository;
use crate::repositories::item_entry::costing_methods;
use crate::repositories::movement::{MovementError, MovementRepository};

/// Bounded retries for posting races.
const MAX_POST_RETRIES: usize = 3;

/// Error types for adjustment operations.
#[derive(Debug, thiserror::Error)]
pub enum AdjustmentError {
    /// Document not found.
    #[error("Adjustment not found: {0}")]
    NotFound(Uuid),

    /// Warehouse not found.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(Uuid),

    /// Only draft documents can be modified, posted, or cancelled.
    #[error("Adjustment is not a draft")]
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

/// Input for creating an adjustment.
#[derive(Debug, Clone)]
pub struct CreateAdjustmentInput {
    /// Counted warehouse.
    pub warehouse_id: WarehouseId,
    /// Free-text note.
    pub note: Option<String>,
    /// Counted lines.
    pub lines: Vec<AdjustmentLineInput>,
    /// User creating the document.
    pub created_by: UserId,
}

/// An adjustment with its lines.
#[derive(Debug, Clone)]
pub struct AdjustmentWithLines {
    /// Document header.
    pub adjustment: adjustments::Model,
    /// Document lines.
    pub lines: Vec<adjustment_lines::Model>,
}

/// Result of posting an adjustment.
#[derive(Debug, Clone)]
pub struct PostedAdjustment {
    /// The posted header.
    pub adjustment: adjustments::Model,
    /// The generated movements, one per line with a non-zero delta.
    pub movements: Vec<stock_movements::Model>,
}

/// Filter options for listing adjustments.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentFilter {
    /// Filter by status.
    pub status: Option<AdjustmentStatus>,
    /// Filter by warehouse.
    pub warehouse_id: Option<Uuid>,
}

/// Adjustment repository.
#[derive(Debug, Clone)]
pub struct AdjustmentRepository {
    db: DatabaseConnection,
}

impl AdjustmentRepository {
    /// Creates a new adjustment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft adjustment with a generated number.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse is unknown, the lines are
    /// invalid, or the insert fails.
    pub async fn create(
        &self,
        input: CreateAdjustmentInput,
    ) -> Result<AdjustmentWithLines, AdjustmentError> {
        if input.lines.is_empty() {
            return Err(RequestError::EmptyDocument.into());
        }
        for line in &input.lines {
            if line.system_quantity < Decimal::ZERO {
                return Err(RequestError::NegativeCount {
                    item_id: line.item_id,
                    quantity: line.system_quantity,
                }
                .into());
            }
            if line.actual_quantity < Decimal::ZERO {
                return Err(RequestError::NegativeCount {
                    item_id: line.item_id,
                    quantity: line.actual_quantity,
                }
                .into());
            }
            if line.unit_cost < Decimal::ZERO {
                return Err(RequestError::NegativeUnitCost {
                    item_id: line.item_id,
                    unit_cost: line.unit_cost,
                }
                .into());
            }
        }

        warehouses::Entity::find_by_id(input.warehouse_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AdjustmentError::WarehouseNotFound(
                input.warehouse_id.into_inner(),
            ))?;

        let txn = self.db.begin().await?;

        let number = DocumentNumberRepository::next_number_in(
            &txn,
            DocumentKind::Adjustment,
            Utc::now().year(),
        )
        .await?;

        let now = Utc::now().into();
        let adjustment_id = AdjustmentId::new().into_inner();

        let adjustment = adjustments::ActiveModel {
            id: Set(adjustment_id),
            number: Set(number.to_string()),
            warehouse_id: Set(input.warehouse_id.into_inner()),
            status: Set(AdjustmentStatus::Draft),
            note: Set(input.note),
            created_by: Set(input.created_by.into_inner()),
            posted_by: Set(None),
            posted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let adjustment = adjustment.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let model = adjustment_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                adjustment_id: Set(adjustment_id),
                item_id: Set(line.item_id.into_inner()),
                system_quantity: Set(line.system_quantity),
                actual_quantity: Set(line.actual_quantity),
                unit_cost: Set(line.unit_cost),
            };
            lines.push(model.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(number = %adjustment.number, "created adjustment draft");
        Ok(AdjustmentWithLines { adjustment, lines })
    }

    /// Gets an adjustment with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<AdjustmentWithLines, AdjustmentError> {
        let adjustment = adjustments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AdjustmentError::NotFound(id))?;

        let lines = adjustment_lines::Entity::find()
            .filter(adjustment_lines::Column::AdjustmentId.eq(id))
            .all(&self.db)
            .await?;

        Ok(AdjustmentWithLines { adjustment, lines })
    }

    /// Lists adjustments with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: AdjustmentFilter,
    ) -> Result<Vec<adjustments::Model>, AdjustmentError> {
        let mut query = adjustments::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(adjustments::Column::Status.eq(status));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(adjustments::Column::WarehouseId.eq(warehouse_id));
        }

        let adjustments = query
            .order_by_desc(adjustments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(adjustments)
    }

    /// Cancels a draft adjustment.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or not a draft.
    pub async fn cancel(&self, id: Uuid) -> Result<adjustments::Model, AdjustmentError> {
        let adjustment = adjustments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AdjustmentError::NotFound(id))?;

        if adjustment.status != AdjustmentStatus::Draft {
            return Err(AdjustmentError::NotDraft);
        }

        let mut active: adjustments::ActiveModel = adjustment.into();
        active.status = Set(AdjustmentStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());

        let cancelled = active.update(&self.db).await?;
        Ok(cancelled)
    }

    /// Posts a draft adjustment: applies the count deltas, re-bases the
    /// touched balances to the counted cost, and flips the status,
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing, not a draft, a line
    /// would drive a balance negative, or storage fails. On error nothing
    /// is persisted.
    pub async fn post(
        &self,
        id: Uuid,
        acting_user: UserId,
    ) -> Result<PostedAdjustment, AdjustmentError> {
        let mut attempt = 0;
        loop {
            match self.try_post(id, acting_user).await {
                Err(AdjustmentError::Movement(err))
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
    ) -> Result<PostedAdjustment, AdjustmentError> {
        let txn = self.db.begin().await?;

        let adjustment = adjustments::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AdjustmentError::NotFound(id))?;

        if adjustment.status != AdjustmentStatus::Draft {
            return Err(AdjustmentError::NotDraft);
        }

        let lines = adjustment_lines::Entity::find()
            .filter(adjustment_lines::Column::AdjustmentId.eq(id))
            .all(&txn)
            .await?;

        let line_inputs: Vec<AdjustmentLineInput> = lines
            .iter()
            .map(|line| AdjustmentLineInput {
                item_id: ItemId::from_uuid(line.item_id),
                system_quantity: line.system_quantity,
                actual_quantity: line.actual_quantity,
                unit_cost: line.unit_cost,
            })
            .collect();

        let methods = costing_methods(&txn, lines.iter().map(|l| l.item_id)).await?;

        let reference = DocumentRef {
            kind: DocumentKind::Adjustment,
            id,
        };
        let requests = adjustment_requests(
            reference,
            WarehouseId::from_uuid(adjustment.warehouse_id),
            &line_inputs,
            |item| methods.get(&item.into_inner()).copied(),
        )?;

        let movements = MovementRepository::apply_movements_in(&txn, acting_user, &requests).await?;

        let number = adjustment.number.clone();
        let mut active: adjustments::ActiveModel = adjustment.into();
        active.status = Set(AdjustmentStatus::Posted);
        active.posted_by = Set(Some(acting_user.into_inner()));
        active.posted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        let adjustment = active.update(&txn).await?;

        txn.commit().await?;

        info!(number = %number, movements = movements.len(), "posted adjustment");
        Ok(PostedAdjustment {
            adjustment,
            movements,
        })
    }
}
