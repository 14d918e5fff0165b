use domain_schema::models::{InsertVote, Vote, VoteRow};
use domain_schema::{VoteDirection, VoteTarget};
use serde::Serialize;
use sqlx::PgConnection;
use tracing::info;

use crate::QaStore;
use crate::errors::{StoreError, StoreResult};

/// What a vote request did to the user's standing vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    Cast,
    Switched,
    Retracted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteResult {
    pub outcome: VoteOutcome,
    /// Target score after the change.
    pub score: i32,
}

/// Outcome and net score change of voting `requested` over `existing`.
pub fn resolve(existing: Option<VoteDirection>, requested: VoteDirection) -> (VoteOutcome, i32) {
    match existing {
        None => (VoteOutcome::Cast, requested.delta()),
        Some(previous) if previous == requested => (VoteOutcome::Retracted, -requested.delta()),
        Some(previous) => (VoteOutcome::Switched, requested.delta() - previous.delta()),
    }
}

impl QaStore {
    /// Applies one vote toggle and adjusts the target's `votes` counter.
    pub async fn cast_vote(&self, vote: &InsertVote) -> StoreResult<VoteResult> {
        let mut transaction = self.pool.begin().await?;
        lock_target(&mut transaction, vote.target).await?;

        let query = "
            SELECT vote_type FROM votes
            WHERE user_id = $1 AND target_type = $2 AND target_id = $3
            FOR UPDATE
        ";
        let existing: Option<String> = sqlx::query_scalar(query)
            .bind(&vote.user_id)
            .bind(vote.target.target_type())
            .bind(vote.target.id())
            .fetch_optional(&mut *transaction)
            .await?;
        let existing = existing.map(|s| s.parse::<VoteDirection>()).transpose()?;

        let (outcome, delta) = resolve(existing, vote.direction);
        match outcome {
            VoteOutcome::Cast => {
                sqlx::query(
                    "INSERT INTO votes (user_id, target_type, target_id, vote_type) VALUES ($1, $2, $3, $4)",
                )
                .bind(&vote.user_id)
                .bind(vote.target.target_type())
                .bind(vote.target.id())
                .bind(vote.direction.as_str())
                .execute(&mut *transaction)
                .await?;
            }
            VoteOutcome::Switched => {
                sqlx::query(
                    "UPDATE votes SET vote_type = $4 WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
                )
                .bind(&vote.user_id)
                .bind(vote.target.target_type())
                .bind(vote.target.id())
                .bind(vote.direction.as_str())
                .execute(&mut *transaction)
                .await?;
            }
            VoteOutcome::Retracted => {
                sqlx::query(
                    "DELETE FROM votes WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
                )
                .bind(&vote.user_id)
                .bind(vote.target.target_type())
                .bind(vote.target.id())
                .execute(&mut *transaction)
                .await?;
            }
        }

        let score = adjust_score(&mut transaction, vote.target, delta).await?;
        transaction.commit().await?;

        info!(
            user_id = %vote.user_id,
            target = %vote.target,
            ?outcome,
            score,
            "vote applied"
        );
        Ok(VoteResult { outcome, score })
    }

    pub async fn user_vote(&self, user_id: &str, target: VoteTarget) -> StoreResult<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(
            "SELECT * FROM votes WHERE user_id = $1 AND target_type = $2 AND target_id = $3",
        )
        .bind(user_id)
        .bind(target.target_type())
        .bind(target.id())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Vote::try_from).transpose()?)
    }
}

async fn lock_target(conn: &mut PgConnection, target: VoteTarget) -> StoreResult<()> {
    // `table()` only yields fixed table names.
    let query = format!("SELECT id FROM {} WHERE id = $1 FOR UPDATE", target.table());
    let found: Option<i32> = sqlx::query_scalar(&query)
        .bind(target.id())
        .fetch_optional(conn)
        .await?;
    found
        .map(|_| ())
        .ok_or_else(|| StoreError::not_found(target.target_type(), target.id()))
}

async fn adjust_score(conn: &mut PgConnection, target: VoteTarget, delta: i32) -> StoreResult<i32> {
    let query = format!(
        "UPDATE {} SET votes = votes + $2 WHERE id = $1 RETURNING votes",
        target.table()
    );
    let score: i32 = sqlx::query_scalar(&query)
        .bind(target.id())
        .bind(delta)
        .fetch_one(conn)
        .await?;
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use VoteDirection::{Down, Up};

    #[test]
    fn first_vote_counts_once() {
        assert_eq!(resolve(None, Up), (VoteOutcome::Cast, 1));
        assert_eq!(resolve(None, Down), (VoteOutcome::Cast, -1));
    }

    #[test]
    fn repeating_a_vote_retracts_it() {
        assert_eq!(resolve(Some(Up), Up), (VoteOutcome::Retracted, -1));
        assert_eq!(resolve(Some(Down), Down), (VoteOutcome::Retracted, 1));
    }

    #[test]
    fn opposite_vote_swings_by_two() {
        assert_eq!(resolve(Some(Up), Down), (VoteOutcome::Switched, -2));
        assert_eq!(resolve(Some(Down), Up), (VoteOutcome::Switched, 2));
    }

    #[test]
    fn outcome_serializes_lowercase() {
        let v = serde_json::to_value(VoteResult {
            outcome: VoteOutcome::Switched,
            score: 3,
        })
        .unwrap();
        assert_eq!(v, serde_json::json!({ "outcome": "switched", "score": 3 }));
    }
}
