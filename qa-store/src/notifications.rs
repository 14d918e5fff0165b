use domain_schema::models::{
    Answer, InsertNotification, Notification, NotificationWithDetails, Question,
};
use sqlx::PgConnection;
use tracing::debug;

use crate::QaStore;
use crate::errors::{StoreError, StoreResult};
use crate::users::find_user;

impl QaStore {
    pub async fn notify(&self, notification: &InsertNotification) -> StoreResult<Notification> {
        let mut conn = self.pool.acquire().await?;
        insert_notification(&mut conn, notification).await
    }

    /// Newest first, with the referenced question, answer and sender attached.
    pub async fn list_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> StoreResult<Vec<NotificationWithDetails>> {
        let mut conn = self.pool.acquire().await?;
        let query = "
            SELECT * FROM notifications
            WHERE user_id = $1
              AND ($2 = FALSE OR is_read = FALSE)
            ORDER BY created_at DESC, id DESC
        ";
        let rows = sqlx::query_as::<_, Notification>(query)
            .bind(user_id)
            .bind(unread_only)
            .fetch_all(&mut *conn)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for notification in rows {
            out.push(load_details(&mut conn, notification).await?);
        }
        Ok(out)
    }

    pub async fn unread_count(&self, user_id: &str) -> StoreResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Marks one notification read. Other users' notifications count as missing.
    pub async fn mark_read(&self, id: i32, user_id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("notification", id));
        }
        Ok(())
    }

    pub async fn mark_all_read(&self, user_id: &str) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        debug!(user_id, marked = result.rows_affected(), "notifications read");
        Ok(result.rows_affected())
    }
}

pub(crate) async fn insert_notification(
    conn: &mut PgConnection,
    notification: &InsertNotification,
) -> StoreResult<Notification> {
    let query = "
        INSERT INTO notifications (
            user_id,
            type,
            title,
            message,
            question_id,
            answer_id,
            triggered_by_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
    ";
    let row = sqlx::query_as::<_, Notification>(query)
        .bind(&notification.user_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.question_id)
        .bind(notification.answer_id)
        .bind(&notification.triggered_by_id)
        .fetch_one(conn)
        .await?;

    debug!(
        notification_id = row.id,
        user_id = %row.user_id,
        kind = %row.kind,
        "notification stored"
    );
    Ok(row)
}

async fn load_details(
    conn: &mut PgConnection,
    notification: Notification,
) -> StoreResult<NotificationWithDetails> {
    let question = match notification.question_id {
        Some(id) => {
            sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => None,
    };
    let answer = match notification.answer_id {
        Some(id) => {
            sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => None,
    };
    let triggered_by = match notification.triggered_by_id.as_deref() {
        Some(id) => find_user(conn, id).await?,
        None => None,
    };

    Ok(NotificationWithDetails {
        notification,
        question,
        answer,
        triggered_by,
    })
}
