use domain_schema::Insertable;
use domain_schema::models::{InsertTag, Tag};
use domain_schema::tables::DEFAULT_TAG_COLOR;
use serde_json::json;
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::QaStore;
use crate::errors::{StoreError, StoreResult};

/// Tag names are stored trimmed and lower-cased; blank names are dropped.
pub fn normalize_tag_name(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    (!name.is_empty()).then_some(name)
}

impl QaStore {
    pub async fn create_tag(&self, tag: &InsertTag) -> StoreResult<Tag> {
        let name = normalize_tag_name(&tag.name)
            .ok_or_else(|| StoreError::Invariant("tag name is blank".into()))?;

        let query = "
            INSERT INTO tags (name, description, color)
            VALUES ($1, $2, $3)
            RETURNING *
        ";
        let row = sqlx::query_as::<_, Tag>(query)
            .bind(&name)
            .bind(&tag.description)
            .bind(tag.color.as_deref().unwrap_or(DEFAULT_TAG_COLOR))
            .fetch_one(&self.pool)
            .await?;

        info!(tag_id = row.id, name = %row.name, "tag created");
        Ok(row)
    }

    /// Most used first.
    pub async fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let rows = sqlx::query_as::<_, Tag>(
            "SELECT * FROM tags ORDER BY question_count DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_tag_by_name(&self, name: &str) -> StoreResult<Option<Tag>> {
        let Some(name) = normalize_tag_name(name) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Returns `false` when the tag was already attached.
    pub async fn attach_tag(&self, question_id: i32, tag_id: i32) -> StoreResult<bool> {
        let mut transaction = self.pool.begin().await?;
        let attached = link_tag(&mut transaction, question_id, tag_id).await?;
        transaction.commit().await?;
        Ok(attached)
    }

    /// Returns `false` when the tag was not attached.
    pub async fn detach_tag(&self, question_id: i32, tag_id: i32) -> StoreResult<bool> {
        let mut transaction = self.pool.begin().await?;
        let detached = unlink_tag(&mut transaction, question_id, tag_id).await?;
        transaction.commit().await?;
        Ok(detached)
    }

    /// Deleting a tag drops its question links with it.
    pub async fn delete_tag(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("tag", id));
        }
        info!(tag_id = id, "tag deleted");
        Ok(())
    }
}

/// Finds the tag by name or creates it with default presentation.
pub(crate) async fn ensure_tag(conn: &mut PgConnection, raw_name: &str) -> StoreResult<Option<Tag>> {
    let Some(name) = normalize_tag_name(raw_name) else {
        return Ok(None);
    };
    // Length and shape checks come from the tags table declaration.
    InsertTag::from_payload(&json!({ "name": name }))?;

    let query = "
        INSERT INTO tags (name, color)
        VALUES ($1, $2)
        ON CONFLICT (name) DO NOTHING
        RETURNING *
    ";
    let created = sqlx::query_as::<_, Tag>(query)
        .bind(&name)
        .bind(DEFAULT_TAG_COLOR)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(tag) = created {
        debug!(tag_id = tag.id, name = %tag.name, "tag created on first use");
        return Ok(Some(tag));
    }

    let existing = sqlx::query_as::<_, Tag>("SELECT * FROM tags WHERE name = $1")
        .bind(&name)
        .fetch_one(&mut *conn)
        .await?;
    Ok(Some(existing))
}

pub(crate) async fn link_tag(conn: &mut PgConnection, question_id: i32, tag_id: i32) -> StoreResult<bool> {
    let query = "
        INSERT INTO question_tags (question_id, tag_id)
        VALUES ($1, $2)
        ON CONFLICT (question_id, tag_id) DO NOTHING
        RETURNING id
    ";
    let inserted: Option<i32> = sqlx::query_scalar(query)
        .bind(question_id)
        .bind(tag_id)
        .fetch_optional(&mut *conn)
        .await?;
    if inserted.is_none() {
        return Ok(false);
    }
    bump_question_count(conn, tag_id, 1).await?;
    Ok(true)
}

pub(crate) async fn unlink_tag(conn: &mut PgConnection, question_id: i32, tag_id: i32) -> StoreResult<bool> {
    let removed: Option<i32> = sqlx::query_scalar(
        "DELETE FROM question_tags WHERE question_id = $1 AND tag_id = $2 RETURNING id",
    )
    .bind(question_id)
    .bind(tag_id)
    .fetch_optional(&mut *conn)
    .await?;
    if removed.is_none() {
        return Ok(false);
    }
    bump_question_count(conn, tag_id, -1).await?;
    Ok(true)
}

/// Decrements the counter of every tag on the question. The links themselves
/// go with the question's cascade.
pub(crate) async fn release_question_tags(conn: &mut PgConnection, question_id: i32) -> StoreResult<u64> {
    let query = "
        UPDATE tags
        SET question_count = GREATEST(question_count - 1, 0)
        WHERE id IN (SELECT tag_id FROM question_tags WHERE question_id = $1)
    ";
    let result = sqlx::query(query).bind(question_id).execute(conn).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn tags_for_question(conn: &mut PgConnection, question_id: i32) -> StoreResult<Vec<Tag>> {
    let query = "
        SELECT t.*
        FROM tags t
        JOIN question_tags qt ON qt.tag_id = t.id
        WHERE qt.question_id = $1
        ORDER BY t.name
    ";
    let rows = sqlx::query_as::<_, Tag>(query)
        .bind(question_id)
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

async fn bump_question_count(conn: &mut PgConnection, tag_id: i32, delta: i32) -> StoreResult<()> {
    sqlx::query("UPDATE tags SET question_count = GREATEST(question_count + $2, 0) WHERE id = $1")
        .bind(tag_id)
        .bind(delta)
        .execute(conn)
        .await?;
    Ok(())
}
