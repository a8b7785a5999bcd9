//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the movement ledger, balance cache,
//!   catalog, and document tables
//! - The transaction coordinator (`repositories::movement`)
//! - Document workflow and catalog repositories
//! - Database migrations

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AdjustmentRepository, DocumentNumberRepository, ItemEntryRepository, ItemRepository,
    MovementRepository, TransferRepository, WarehouseRepository, WithdrawalRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
