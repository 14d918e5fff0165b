//! PostgreSQL data access for the Q&A platform.
//!
//! Every multi-row change runs inside one transaction so counters
//! (`votes`, `question_count`) never drift from the rows they summarise.

pub mod answers;
pub mod errors;
pub mod migrate;
pub mod notifications;
pub mod questions;
pub mod sessions;
pub mod tags;
pub mod users;
pub mod votes;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use errors::{StoreError, StoreResult};
pub use migrate::prepare_database;
pub use votes::{VoteOutcome, VoteResult};

#[derive(Debug, Clone)]
pub struct QaStore {
    pool: PgPool,
}

impl QaStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;
        info!(max_connections, "database pool connected");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
