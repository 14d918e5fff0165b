use domain_schema::models::{UpsertUser, User};
use sqlx::PgConnection;
use tracing::debug;

use crate::QaStore;
use crate::errors::{StoreError, StoreResult};

impl QaStore {
    /// Inserts the user or refreshes its profile fields; `created_at` is kept.
    pub async fn upsert_user(&self, user: &UpsertUser) -> StoreResult<User> {
        let query = "
            INSERT INTO users (
                id,
                email,
                first_name,
                last_name,
                profile_image_url
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id)
            DO UPDATE SET
                email             = EXCLUDED.email,
                first_name        = EXCLUDED.first_name,
                last_name         = EXCLUDED.last_name,
                profile_image_url = EXCLUDED.profile_image_url,
                updated_at        = now()
            RETURNING *
        ";

        let row = sqlx::query_as::<_, User>(query)
            .bind(&user.id)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.profile_image_url)
            .fetch_one(&self.pool)
            .await?;

        debug!(user_id = %row.id, "user upserted");
        Ok(row)
    }

    pub async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let mut conn = self.pool.acquire().await?;
        find_user(&mut conn, id).await
    }
}

pub(crate) async fn find_user(conn: &mut PgConnection, id: &str) -> StoreResult<Option<User>> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub(crate) async fn require_user(conn: &mut PgConnection, id: &str) -> StoreResult<User> {
    find_user(conn, id)
        .await?
        .ok_or_else(|| StoreError::not_found("user", id))
}
