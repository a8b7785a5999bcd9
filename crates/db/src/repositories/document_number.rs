//! Atomic document number generation.
//!
//! One counter row per (prefix, year), bumped with a single
//! `INSERT ... ON CONFLICT ... DO UPDATE ... RETURNING` statement. The
//! row lock taken by the upsert serializes concurrent document creation
//! within the same prefix and year, so numbers are unique and gap-free
//! under contention, unlike deriving the next sequence by parsing the
//! highest existing number.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement};

use stokra_core::documents::numbering::{prefix_for, DocumentNumber};
use stokra_core::inventory::DocumentKind;

const NEXT_VALUE_SQL: &str = r"
INSERT INTO document_counters (prefix, year, last_value)
VALUES ($1, $2, 1)
ON CONFLICT (prefix, year)
DO UPDATE SET last_value = document_counters.last_value + 1
RETURNING last_value
";

/// Repository handing out document numbers.
#[derive(Debug, Clone)]
pub struct DocumentNumberRepository {
    db: DatabaseConnection,
}

impl DocumentNumberRepository {
    /// Creates a new document number repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reserves the next number for a document kind and year.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn next_number(
        &self,
        kind: DocumentKind,
        year: i32,
    ) -> Result<DocumentNumber, DbErr> {
        Self::next_number_in(&self.db, kind, year).await
    }

    /// Reserves the next number inside an existing transaction.
    ///
    /// The counter row stays locked until the caller commits, so a rolled
    /// back document creation rolls its number back too.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub async fn next_number_in<C: ConnectionTrait>(
        conn: &C,
        kind: DocumentKind,
        year: i32,
    ) -> Result<DocumentNumber, DbErr> {
        let prefix = prefix_for(kind);

        let row = conn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                NEXT_VALUE_SQL,
                [prefix.into(), year.into()],
            ))
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("document counter upsert returned no row".into()))?;

        let last_value: i64 = row.try_get("", "last_value")?;
        let sequence = u32::try_from(last_value)
            .map_err(|_| DbErr::Custom(format!("document counter overflow: {last_value}")))?;

        Ok(DocumentNumber::new(prefix, year, sequence))
    }
}
