use chrono::{NaiveDateTime, Utc};
use domain_schema::models::Session;
use serde_json::Value;
use tracing::debug;

use crate::QaStore;
use crate::errors::StoreResult;

impl QaStore {
    /// Returns the session unless it has expired.
    pub async fn get_session(&self, sid: &str) -> StoreResult<Option<Session>> {
        self.get_session_at(sid, Utc::now().naive_utc()).await
    }

    /// Returns the session if it is still live at `now`.
    ///
    /// `expire` is a zoneless UTC timestamp, so the cutoff is bound from the
    /// caller rather than taken from the server clock and its `TimeZone`.
    pub async fn get_session_at(&self, sid: &str, now: NaiveDateTime) -> StoreResult<Option<Session>> {
        let row = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE sid = $1 AND expire > $2",
        )
        .bind(sid)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn set_session(&self, sid: &str, sess: &Value, expire: NaiveDateTime) -> StoreResult<()> {
        let query = "
            INSERT INTO sessions (sid, sess, expire)
            VALUES ($1, $2, $3)
            ON CONFLICT (sid)
            DO UPDATE SET sess = EXCLUDED.sess, expire = EXCLUDED.expire
        ";
        sqlx::query(query)
            .bind(sid)
            .bind(sess)
            .bind(expire)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn destroy_session(&self, sid: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE sid = $1")
            .bind(sid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deletes every session that expired at or before `now`.
    pub async fn sweep_expired_sessions(&self, now: NaiveDateTime) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expire <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        let swept = result.rows_affected();
        if swept > 0 {
            debug!(swept, "expired sessions removed");
        }
        Ok(swept)
    }
}
