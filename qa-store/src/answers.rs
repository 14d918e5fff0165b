use domain_schema::models::{
    Answer, AnswerWithDetails, InsertAnswer, InsertNotification, NotificationKind, Question,
};
use sqlx::PgConnection;
use tracing::{debug, info};

use crate::QaStore;
use crate::errors::{StoreError, StoreResult};
use crate::notifications::insert_notification;
use crate::questions::lock_question;
use crate::users::require_user;

impl QaStore {
    /// Stores the answer and tells the question author, unless they answered themselves.
    pub async fn create_answer(&self, answer: &InsertAnswer) -> StoreResult<Answer> {
        let mut transaction = self.pool.begin().await?;
        let question = lock_question(&mut transaction, answer.question_id).await?;

        let query = "
            INSERT INTO answers (content, question_id, author_id)
            VALUES ($1, $2, $3)
            RETURNING *
        ";
        let row = sqlx::query_as::<_, Answer>(query)
            .bind(&answer.content)
            .bind(answer.question_id)
            .bind(&answer.author_id)
            .fetch_one(&mut *transaction)
            .await?;

        if question.author_id != row.author_id {
            let answerer = require_user(&mut transaction, &row.author_id).await?;
            let notification = InsertNotification {
                user_id: question.author_id.clone(),
                kind: NotificationKind::Answer,
                title: "New answer to your question".to_string(),
                message: format!(
                    "{} answered \"{}\"",
                    answerer.display_name(),
                    question.title
                ),
                question_id: Some(question.id),
                answer_id: Some(row.id),
                triggered_by_id: Some(row.author_id.clone()),
            };
            insert_notification(&mut transaction, &notification).await?;
        }

        transaction.commit().await?;
        info!(
            answer_id = row.id,
            question_id = row.question_id,
            "answer created"
        );
        Ok(row)
    }

    pub async fn get_answer(&self, id: i32) -> StoreResult<Option<Answer>> {
        let row = sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Accepted answer first, then by score, then oldest first.
    pub async fn list_answers(&self, question_id: i32) -> StoreResult<Vec<AnswerWithDetails>> {
        let mut conn = self.pool.acquire().await?;
        let query = "
            SELECT * FROM answers
            WHERE question_id = $1
            ORDER BY is_accepted DESC, votes DESC, created_at ASC, id ASC
        ";
        let rows = sqlx::query_as::<_, Answer>(query)
            .bind(question_id)
            .fetch_all(&mut *conn)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for answer in rows {
            let author = require_user(&mut conn, &answer.author_id).await?;
            out.push(AnswerWithDetails { answer, author });
        }
        Ok(out)
    }

    /// Marks `answer_id` as the accepted answer of `question_id`.
    ///
    /// Only the question author may accept, and the answer must belong to the
    /// question. A previously accepted answer loses its flag.
    pub async fn accept_answer(
        &self,
        question_id: i32,
        answer_id: i32,
        acting_user: &str,
    ) -> StoreResult<Answer> {
        let mut transaction = self.pool.begin().await?;
        let question = lock_question(&mut transaction, question_id).await?;
        if question.author_id != acting_user {
            return Err(StoreError::Forbidden(format!(
                "only the author of question {question_id} can accept an answer"
            )));
        }

        let answer = sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1 FOR UPDATE")
            .bind(answer_id)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or_else(|| StoreError::not_found("answer", answer_id))?;
        if answer.question_id != question_id {
            return Err(StoreError::Invariant(format!(
                "answer {answer_id} belongs to question {}, not {question_id}",
                answer.question_id
            )));
        }

        clear_acceptance(&mut transaction, &question).await?;

        let accepted = sqlx::query_as::<_, Answer>(
            "UPDATE answers SET is_accepted = TRUE, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(answer_id)
        .fetch_one(&mut *transaction)
        .await?;

        sqlx::query("UPDATE questions SET accepted_answer_id = $2, updated_at = now() WHERE id = $1")
            .bind(question_id)
            .bind(answer_id)
            .execute(&mut *transaction)
            .await?;

        if accepted.author_id != acting_user {
            let notification = InsertNotification {
                user_id: accepted.author_id.clone(),
                kind: NotificationKind::Accepted,
                title: "Your answer was accepted".to_string(),
                message: format!("Your answer to \"{}\" was accepted", question.title),
                question_id: Some(question_id),
                answer_id: Some(answer_id),
                triggered_by_id: Some(acting_user.to_string()),
            };
            insert_notification(&mut transaction, &notification).await?;
        }

        transaction.commit().await?;
        info!(question_id, answer_id, "answer accepted");
        Ok(accepted)
    }

    /// Only the answer author may delete it. Deleting the accepted answer
    /// leaves the question without one.
    pub async fn delete_answer(&self, id: i32, acting_user: &str) -> StoreResult<()> {
        let mut transaction = self.pool.begin().await?;
        let answer = sqlx::query_as::<_, Answer>("SELECT * FROM answers WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *transaction)
            .await?
            .ok_or_else(|| StoreError::not_found("answer", id))?;
        if answer.author_id != acting_user {
            return Err(StoreError::Forbidden(format!(
                "user {acting_user} is not the author of answer {id}"
            )));
        }

        sqlx::query(
            "UPDATE questions SET accepted_answer_id = NULL WHERE id = $1 AND accepted_answer_id = $2",
        )
        .bind(answer.question_id)
        .bind(id)
        .execute(&mut *transaction)
        .await?;

        sqlx::query("DELETE FROM votes WHERE target_type = 'answer' AND target_id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await?;

        sqlx::query("DELETE FROM answers WHERE id = $1")
            .bind(id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;
        info!(answer_id = id, question_id = answer.question_id, "answer deleted");
        Ok(())
    }
}

async fn clear_acceptance(conn: &mut PgConnection, question: &Question) -> StoreResult<()> {
    let cleared = sqlx::query(
        "UPDATE answers SET is_accepted = FALSE WHERE question_id = $1 AND is_accepted = TRUE",
    )
    .bind(question.id)
    .execute(conn)
    .await?
    .rows_affected();
    if cleared > 0 {
        debug!(question_id = question.id, "previous acceptance cleared");
    }
    Ok(())
}
