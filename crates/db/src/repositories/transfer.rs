//! Transfer document repository.
//!
//! Executing a transfer applies the outbound legs at the source (priced at
//! the source average), then the inbound legs at the destination at the
//! same unit costs, all in one transaction: value is conserved across
//! warehouses and no partial transfer is ever observable.

use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use stokra_core::documents::{
    transfer_in_requests, transfer_out_requests, PricedTransferLine, RequestError,
    TransferLineInput,
};
use stokra_core::inventory::{DocumentKind, DocumentRef};
use stokra_shared::types::{ItemId, TransferId, UserId, WarehouseId};

use crate::entities::{
    sea_orm_active_enums::TransferStatus, stock_movements, transfer_lines, transfers, warehouses,
};
use crate::repositories::document_number::DocumentNumberRepository;
use crate::repositories::item_entry::costing_methods;
use crate::repositories::movement::{MovementError, MovementRepository};

/// Bounded retries for execution races.
const MAX_POST_RETRIES: usize = 3;

/// Error types for transfer operations.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Document not found.
    #[error("Transfer not found: {0}")]
    NotFound(Uuid),

    /// Warehouse not found.
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(Uuid),

    /// Source and destination must differ.
    #[error("Transfer source and destination warehouses must differ")]
    SameWarehouse,

    /// Only draft documents can be modified, executed, or cancelled.
    #[error("Transfer is not a draft")]
    NotDraft,

    /// Invalid document lines.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Movement application failed (including insufficient stock at the
    /// source).
    #[error(transparent)]
    Movement(#[from] MovementError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a transfer.
#[derive(Debug, Clone)]
pub struct CreateTransferInput {
    /// Warehouse the stock leaves.
    pub source_warehouse_id: WarehouseId,
    /// Warehouse the stock arrives at.
    pub destination_warehouse_id: WarehouseId,
    /// Free-text note.
    pub note: Option<String>,
    /// Transferred lines.
    pub lines: Vec<TransferLineInput>,
    /// User creating the document.
    pub created_by: UserId,
}

/// A transfer with its lines.
#[derive(Debug, Clone)]
pub struct TransferWithLines {
    /// Document header.
    pub transfer: transfers::Model,
    /// Document lines.
    pub lines: Vec<transfer_lines::Model>,
}

/// Result of executing a transfer.
#[derive(Debug, Clone)]
pub struct CompletedTransfer {
    /// The completed header.
    pub transfer: transfers::Model,
    /// Outbound movements at the source, one per line.
    pub outbound: Vec<stock_movements::Model>,
    /// Inbound movements at the destination, one per line.
    pub inbound: Vec<stock_movements::Model>,
}

/// Filter options for listing transfers.
#[derive(Debug, Clone, Default)]
pub struct TransferFilter {
    /// Filter by status.
    pub status: Option<TransferStatus>,
    /// Filter by source or destination warehouse.
    pub warehouse_id: Option<Uuid>,
}

/// Transfer repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a draft transfer with a generated number.
    ///
    /// # Errors
    ///
    /// Returns an error if a warehouse is unknown, source equals
    /// destination, the lines are invalid, or the insert fails.
    pub async fn create(
        &self,
        input: CreateTransferInput,
    ) -> Result<TransferWithLines, TransferError> {
        if input.source_warehouse_id == input.destination_warehouse_id {
            return Err(TransferError::SameWarehouse);
        }
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

        for warehouse_id in [
            input.source_warehouse_id.into_inner(),
            input.destination_warehouse_id.into_inner(),
        ] {
            warehouses::Entity::find_by_id(warehouse_id)
                .one(&self.db)
                .await?
                .ok_or(TransferError::WarehouseNotFound(warehouse_id))?;
        }

        let txn = self.db.begin().await?;

        let number =
            DocumentNumberRepository::next_number_in(&txn, DocumentKind::Transfer, Utc::now().year())
                .await?;

        let now = Utc::now().into();
        let transfer_id = TransferId::new().into_inner();

        let transfer = transfers::ActiveModel {
            id: Set(transfer_id),
            number: Set(number.to_string()),
            source_warehouse_id: Set(input.source_warehouse_id.into_inner()),
            destination_warehouse_id: Set(input.destination_warehouse_id.into_inner()),
            status: Set(TransferStatus::Draft),
            note: Set(input.note),
            created_by: Set(input.created_by.into_inner()),
            completed_by: Set(None),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let transfer = transfer.insert(&txn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let model = transfer_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                transfer_id: Set(transfer_id),
                item_id: Set(line.item_id.into_inner()),
                quantity: Set(line.quantity),
            };
            lines.push(model.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(number = %transfer.number, "created transfer draft");
        Ok(TransferWithLines { transfer, lines })
    }

    /// Gets a transfer with its lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<TransferWithLines, TransferError> {
        let transfer = transfers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TransferError::NotFound(id))?;

        let lines = transfer_lines::Entity::find()
            .filter(transfer_lines::Column::TransferId.eq(id))
            .all(&self.db)
            .await?;

        Ok(TransferWithLines { transfer, lines })
    }

    /// Lists transfers with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, filter: TransferFilter) -> Result<Vec<transfers::Model>, TransferError> {
        let mut query = transfers::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(transfers::Column::Status.eq(status));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(
                transfers::Column::SourceWarehouseId
                    .eq(warehouse_id)
                    .or(transfers::Column::DestinationWarehouseId.eq(warehouse_id)),
            );
        }

        let transfers = query
            .order_by_desc(transfers::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(transfers)
    }

    /// Cancels a draft transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing or not a draft.
    pub async fn cancel(&self, id: Uuid) -> Result<transfers::Model, TransferError> {
        let transfer = transfers::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(TransferError::NotFound(id))?;

        if transfer.status != TransferStatus::Draft {
            return Err(TransferError::NotDraft);
        }

        let mut active: transfers::ActiveModel = transfer.into();
        active.status = Set(TransferStatus::Cancelled);
        active.updated_at = Set(Utc::now().into());

        let cancelled = active.update(&self.db).await?;
        Ok(cancelled)
    }

    /// Executes a draft transfer: outbound legs at the source, inbound
    /// legs at the destination priced by the outbound results, and the
    /// status flip, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is missing, not a draft, the
    /// source lacks stock, or storage fails. On error nothing is
    /// persisted.
    pub async fn execute(
        &self,
        id: Uuid,
        acting_user: UserId,
    ) -> Result<CompletedTransfer, TransferError> {
        let mut attempt = 0;
        loop {
            match self.try_execute(id, acting_user).await {
                Err(TransferError::Movement(err))
                    if err.is_retryable() && attempt + 1 < MAX_POST_RETRIES =>
                {
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn try_execute(
        &self,
        id: Uuid,
        acting_user: UserId,
    ) -> Result<CompletedTransfer, TransferError> {
        let txn = self.db.begin().await?;

        let transfer = transfers::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(TransferError::NotFound(id))?;

        if transfer.status != TransferStatus::Draft {
            return Err(TransferError::NotDraft);
        }

        let lines = transfer_lines::Entity::find()
            .filter(transfer_lines::Column::TransferId.eq(id))
            .all(&txn)
            .await?;

        let line_inputs: Vec<TransferLineInput> = lines
            .iter()
            .map(|line| TransferLineInput {
                item_id: ItemId::from_uuid(line.item_id),
                quantity: line.quantity,
            })
            .collect();

        let methods = costing_methods(&txn, lines.iter().map(|l| l.item_id)).await?;
        let lookup = |item: ItemId| methods.get(&item.into_inner()).copied();

        let reference = DocumentRef {
            kind: DocumentKind::Transfer,
            id,
        };

        // Outbound first: the out legs decide the unit cost of the in legs.
        let out_requests = transfer_out_requests(
            reference,
            WarehouseId::from_uuid(transfer.source_warehouse_id),
            &line_inputs,
            lookup,
        )?;
        let outbound =
            MovementRepository::apply_movements_in(&txn, acting_user, &out_requests).await?;

        let priced: Vec<PricedTransferLine> = line_inputs
            .iter()
            .zip(outbound.iter())
            .map(|(line, out)| PricedTransferLine {
                item_id: line.item_id,
                quantity: line.quantity,
                unit_cost: out.unit_cost,
            })
            .collect();

        let in_requests = transfer_in_requests(
            reference,
            WarehouseId::from_uuid(transfer.destination_warehouse_id),
            &priced,
            lookup,
        )?;
        let inbound =
            MovementRepository::apply_movements_in(&txn, acting_user, &in_requests).await?;

        let number = transfer.number.clone();
        let mut active: transfers::ActiveModel = transfer.into();
        active.status = Set(TransferStatus::Completed);
        active.completed_by = Set(Some(acting_user.into_inner()));
        active.completed_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        let transfer = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            number = %number,
            outbound = outbound.len(),
            inbound = inbound.len(),
            "executed transfer"
        );
        Ok(CompletedTransfer {
            transfer,
            outbound,
            inbound,
        })
    }
}
