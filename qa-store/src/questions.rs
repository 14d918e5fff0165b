use domain_schema::Insertable;
use domain_schema::models::{Answer, InsertQuestion, Question, QuestionWithDetails};
use serde_json::json;
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::QaStore;
use crate::errors::{StoreError, StoreResult};
use crate::tags::{ensure_tag, link_tag, release_question_tags, tags_for_question};
use crate::users::require_user;

/// Upper bound for one page of [`QaStore::list_questions`].
pub const MAX_PAGE_SIZE: i64 = 100;

impl QaStore {
    /// Creates the question and attaches `tag_names`, creating unknown tags.
    pub async fn create_question(
        &self,
        question: &InsertQuestion,
        tag_names: &[String],
    ) -> StoreResult<Question> {
        let mut transaction = self.pool.begin().await?;

        let query = "
            INSERT INTO questions (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING *
        ";
        let row = sqlx::query_as::<_, Question>(query)
            .bind(&question.title)
            .bind(&question.content)
            .bind(&question.author_id)
            .fetch_one(&mut *transaction)
            .await?;

        let mut attached = 0usize;
        for name in tag_names {
            if let Some(tag) = ensure_tag(&mut transaction, name).await? {
                if link_tag(&mut transaction, row.id, tag.id).await? {
                    attached += 1;
                }
            }
        }

        transaction.commit().await?;
        info!(
            question_id = row.id,
            author_id = %row.author_id,
            tags = attached,
            "question created"
        );
        Ok(row)
    }

    pub async fn get_question(&self, id: i32) -> StoreResult<Option<Question>> {
        let mut conn = self.pool.acquire().await?;
        find_question(&mut conn, id).await
    }

    /// Details for a page view; counts the view.
    pub async fn view_question(&self, id: i32) -> StoreResult<Option<QuestionWithDetails>> {
        let mut transaction = self.pool.begin().await?;
        let bumped = sqlx::query_as::<_, Question>(
            "UPDATE questions SET views = views + 1 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await?;

        let details = match bumped {
            Some(question) => Some(load_details(&mut transaction, question).await?),
            None => None,
        };
        transaction.commit().await?;
        Ok(details)
    }

    pub async fn question_details(&self, id: i32) -> StoreResult<Option<QuestionWithDetails>> {
        let mut conn = self.pool.acquire().await?;
        match find_question(&mut conn, id).await? {
            Some(question) => Ok(Some(load_details(&mut conn, question).await?)),
            None => Ok(None),
        }
    }

    /// Newest first. `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub async fn list_questions(&self, limit: i64, offset: i64) -> StoreResult<Vec<QuestionWithDetails>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit.clamp(1, MAX_PAGE_SIZE))
        .bind(offset.max(0))
        .fetch_all(&mut *conn)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for question in rows {
            out.push(load_details(&mut conn, question).await?);
        }
        Ok(out)
    }

    /// Only the author may edit; the new text goes through the insert rules.
    pub async fn update_question(
        &self,
        id: i32,
        editor_id: &str,
        title: &str,
        content: &str,
    ) -> StoreResult<Question> {
        InsertQuestion::from_payload(&json!({
            "title": title,
            "content": content,
            "authorId": editor_id,
        }))?;

        let mut transaction = self.pool.begin().await?;
        let current = lock_question(&mut transaction, id).await?;
        if current.author_id != editor_id {
            return Err(StoreError::Forbidden(format!(
                "user {editor_id} is not the author of question {id}"
            )));
        }

        let query = "
            UPDATE questions
            SET title = $2, content = $3, updated_at = now()
            WHERE id = $1
            RETURNING *
        ";
        let row = sqlx::query_as::<_, Question>(query)
            .bind(id)
            .bind(title)
            .bind(content)
            .fetch_one(&mut *transaction)
            .await?;

        transaction.commit().await?;
        debug!(question_id = id, "question updated");
        Ok(row)
    }

    /// Removes the question with its answers, tag links and votes.
    pub async fn delete_question(&self, id: i32, acting_user: &str) -> StoreResult<()> {
        let mut transaction = self.pool.begin().await?;
        let current = lock_question(&mut transaction, id).await?;
        if current.author_id != acting_user {
            return Err(StoreError::Forbidden(format!(
                "user {acting_user} is not the author of question {id}"
            )));
        }

        let released = release_question_tags(&mut transaction, id).await?;

        // Votes reference their target by type and id only, nothing cascades to them.
        let query = "
            DELETE FROM votes
            WHERE (target_type = 'question' AND target_id = $1)
               OR (target_type = 'answer'
                   AND target_id IN (SELECT id FROM answers WHERE question_id = $1))
        ";
        let votes = sqlx::query(query)
            .bind(id)
            .execute(&mut *transaction)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;
        info!(
            question_id = id,
            tags_released = released,
            votes_removed = votes,
            "question deleted"
        );
        Ok(())
    }
}

pub(crate) async fn find_question(conn: &mut PgConnection, id: i32) -> StoreResult<Option<Question>> {
    let row = sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

/// Row-locks the question for the rest of the transaction.
pub(crate) async fn lock_question(conn: &mut PgConnection, id: i32) -> StoreResult<Question> {
    sqlx::query_as::<_, Question>("SELECT * FROM questions WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| StoreError::not_found("question", id))
}

async fn load_details(conn: &mut PgConnection, question: Question) -> StoreResult<QuestionWithDetails> {
    let author = require_user(conn, &question.author_id).await?;
    let tags = tags_for_question(conn, question.id).await?;

    let answer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM answers WHERE question_id = $1")
        .bind(question.id)
        .fetch_one(&mut *conn)
        .await?;

    let accepted_answer = match question.accepted_answer_id {
        Some(answer_id) => {
            sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1")
                .bind(answer_id)
                .fetch_optional(&mut *conn)
                .await?
        }
        None => None,
    };

    Ok(QuestionWithDetails {
        question,
        author,
        tags,
        answer_count,
        accepted_answer,
    })
}
