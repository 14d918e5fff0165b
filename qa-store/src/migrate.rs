//! Schema installation from the shared table declarations.

use domain_schema::SCHEMA;
use sqlx::{Postgres, Transaction};
use tracing::info;

use crate::QaStore;
use crate::errors::StoreResult;

/// Creates every table and index that does not exist yet.
pub async fn prepare_database(transaction: &mut Transaction<'_, Postgres>) -> sqlx::Result<()> {
    for statement in SCHEMA.create_statements() {
        sqlx::query(&statement).execute(&mut **transaction).await?;
    }
    Ok(())
}

impl QaStore {
    pub async fn migrate(&self) -> StoreResult<()> {
        let mut transaction = self.pool.begin().await?;
        prepare_database(&mut transaction).await?;
        transaction.commit().await?;
        info!(
            tables = SCHEMA.tables().len(),
            "schema is up to date"
        );
        Ok(())
    }
}
