//! Withdrawal document repository.
//!
//! Withdrawals carry quantities only; posting prices every line at the
//! balance's average cost. A single line failing `InsufficientStock` rolls
//! back the whole document.

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use stokra_core::documents::{withdrawal_requests, RequestError, WithdrawalLineInput};
use stokra_core::inventory::{DocumentKind, DocumentRef};
use stokra_shared::types::{ItemId, UserId, WarehouseId, WithdrawalId};

use crate::entities::{
    sea_orm_active_enums::WithdrawalStatus, stock_movements, warehouses, withdrawal_lines,
    withdrawals,
};
use crate::repositories::document_number::DocumentNumberRepository;
use crate::repositories::item_entry::costing_methods;
use crate::repositories::movement::{MovementError, MovementRepository};

/// Bounded retries for posting races.
const MAX_POST_RETRIES: usize = 3;

/// Error types for withdrawal operations.
#[derive(Debug, thiserror::Error)]
pub enum WithdrawalError {
    /// Document not found.
    #[error("Withdrawal not found: {0}")]
    NotFound(Uuid),

    /// Warehouse not found.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(Uuid),

    /// Only draft documents can be modified, posted, or cancelled.
    #[error("Withdrawal is not a draft")]
    NotDraft,

    /// Invalid document lines.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Movement application failed (including insufficient stock).
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a withdrawal.
#[derive(Debug, Clone)]
pub struct CreateWithdrawalInput {
    /// Issuing warehouse.
    pub warehouse_id: WarehouseId,
    /// Free-text note.
    pub note: Option<String>,
    /// Issued lines.
    pub lines: Vec<WithdrawalLineInput>,
    /// User creating the document.
    pub created_by: UserId,
}

/// A withdrawal with its lines.
#[derive(Debug, Clone)]
pub struct WithdrawalWithLines {
    /// Document header.
    pub withdrawal: withdrawals::Model,
    /// Document lines.
    pub lines: Vec<withdrawal_lines::Model>,
}

/// Result of posting a withdrawal.
#[derive(Debug, Clone)]
pub struct PostedWithdrawal {
    /// The posted header.
    pub withdrawal: withdrawals::Model,
    /// The generated movements, one per line.
    pub movements: Vec<stock_movements::Model>,
}

/// Filter options for listing withdrawals.
#[derive(Debug, Clone, Default)]
pub struct WithdrawalFilter {
    /// Filter by status.
    pub status: Option<WithdrawalStatus>,
    /// Filter by warehouse.
    pub warehouse_id: Option<Uuid>,
}

/// Withdrawal repository.
#[derive(Debug, Clone)]
pub struct WithdrawalRepository {
    db: DatabaseConnection,
}

impl WithdrawalRepository {
    /// Creates a new withdrawal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft withdrawal with a generated number.
    ///
    /// # Errors
    ///
    /// Returns an error if the warehouse is unknown, the lines are
    /// invalid, or the insert fails.
    pub async fn create(
        &self,
        input: CreateWithdrawalInput,
    ) -> Result<WithdrawalWithLines, WithdrawalError> {
        if input.lines.is_empty() {
            return Err(RequestError::EmptyDocument.into());
        }
        for line in &input.lines {
            if line.quantity <= rust_decimal::Decimal::ZERO {
                return Err(RequestError::NonPositiveQuantity {
                    item_id: line.item_id,
                    quantity: line.quantity,
                }
                .into());
            }
        }

        warehouses::Entity::find_by_id(input.warehouse_id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(WithdrawalError::WarehouseNotFound(
                input.warehouse_id.into_inner(),
            ))?;

        let txn = self.db.begin().await?;

        let number = DocumentNumberRepository::next_number_in(
            &txn,
            DocumentKind::Withdrawal,
            Utc::now().year(),
        )
        .await?;

        let now = Utc::now().into();
        let withdrawal_id = WithdrawalId::new().into_inner();

        let withdrawal = withdrawals::ActiveModel {
            id: Set(withdrawal_id),
            number: Set(number.to_string()),
            warehouse_id: Set(input.warehouse_id.into_inner()),
            status: Set(WithdrawalStatus::Draft),
            note: Set(input.note),
            created_by: Set(input.created_by.into_inner()),
            posted_by: Set(None),
            posted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let withdrawal = withdrawal.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let model = withdrawal_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                withdrawal_id: Set(withdrawal_id),
                item_id: Set(line.item_id.into_inner()),
                quantity: Set(line.quantity),
            };
            lines.push(model.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(number = %withdrawal.number, "created withdrawal draft");
        Ok(WithdrawalWithLines { withdrawal, lines })
    }

    /// Gets a withdrawal with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<WithdrawalWithLines, WithdrawalError> {
        let withdrawal = withdrawals::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(WithdrawalError::NotFound(id))?;

        let lines = withdrawal_lines::Entity::find()
            .filter(withdrawal_lines::Column::WithdrawalId.eq(id))
            .all(&self.db)
            .await?;

        Ok(WithdrawalWithLines { withdrawal, lines })
    }

    /// Lists withdrawals with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(
        &self,
        filter: WithdrawalFilter,
    ) -> Result<Vec<withdrawals::Model>, WithdrawalError> {
        let mut query = withdrawals::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(withdrawals::Column::Status.eq(status));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(withdrawals::Column::WarehouseId.eq(warehouse_id));
        }

        let withdrawals = query
            .order_by_desc(withdrawals::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(withdrawals)
    }

    /// Cancels a draft withdrawal.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or not a draft.
    pub async fn cancel(&self, id: Uuid) -> Result<withdrawals::Model, WithdrawalError> {
        let withdrawal = withdrawals::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(WithdrawalError::NotFound(id))?;

        if withdrawal.status != WithdrawalStatus::Draft {
            return Err(WithdrawalError::NotDraft);
        }

        let mut active: withdrawals::ActiveModel = withdrawal.into();
        active.status = Set(WithdrawalStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());

        let cancelled = active.update(&self.db).await?;
        Ok(cancelled)
    }

    /// Posts a draft withdrawal: issues every line at the balance's
    /// average cost and flips the status, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing, not a draft, any line
    /// has insufficient stock, or storage fails. On error nothing is
    /// persisted.
    pub async fn post(
        &self,
        id: Uuid,
        acting_user: UserId,
    ) -> Result<PostedWithdrawal, WithdrawalError> {
        let mut attempt = 0;
        loop {
            match self.try_post(id, acting_user).await {
                Err(WithdrawalError::Movement(err))
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
    ) -> Result<PostedWithdrawal, WithdrawalError> {
        let txn = self.db.begin().await?;

        let withdrawal = withdrawals::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(WithdrawalError::NotFound(id))?;

        if withdrawal.status != WithdrawalStatus::Draft {
            return Err(WithdrawalError::NotDraft);
        }

        let lines = withdrawal_lines::Entity::find()
            .filter(withdrawal_lines::Column::WithdrawalId.eq(id))
            .all(&txn)
            .await?;

        let line_inputs: Vec<WithdrawalLineInput> = lines
            .iter()
            .map(|line| WithdrawalLineInput {
                item_id: ItemId::from_uuid(line.item_id),
                quantity: line.quantity,
            })
            .collect();

        let methods = costing_methods(&txn, lines.iter().map(|l| l.item_id)).await?;

        let reference = DocumentRef {
            kind: DocumentKind::Withdrawal,
            id,
        };
        let requests = withdrawal_requests(
            reference,
            WarehouseId::from_uuid(withdrawal.warehouse_id),
            &line_inputs,
            |item| methods.get(&item.into_inner()).copied(),
        )?;

        let movements = MovementRepository::apply_movements_in(&txn, acting_user, &requests).await?;

        let number = withdrawal.number.clone();
        let mut active: withdrawals::ActiveModel = withdrawal.into();
        active.status = Set(WithdrawalStatus::Posted);
        active.posted_by = Set(Some(acting_user.into_inner()));
        active.posted_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        let withdrawal = active.update(&txn).await?;

        txn.commit().await?;

        info!(number = %number, movements = movements.len(), "posted withdrawal");
        Ok(PostedWithdrawal {
            withdrawal,
            movements,
        })
    }
}
