//! Store behaviour against a live PostgreSQL.
//!
//! Run with `DATABASE_URL` set and `cargo test -p qa-store -- --ignored`.

use chrono::{Duration, Utc};
use domain_schema::Insertable;
use domain_schema::models::{InsertAnswer, InsertQuestion, InsertVote, UpsertUser};
use domain_schema::{VoteDirection, VoteTarget};
use qa_store::{QaStore, StoreError, StoreResult, VoteOutcome, prepare_database};
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

async fn setup(pool: PgPool) -> StoreResult<QaStore> {
    let mut transaction = pool.begin().await?;
    prepare_database(&mut transaction).await?;
    transaction.commit().await?;
    Ok(QaStore::new(pool))
}

async fn user(store: &QaStore, id: &str) -> StoreResult<()> {
    store
        .upsert_user(&UpsertUser {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            first_name: Some(id.to_uppercase()),
            last_name: None,
            profile_image_url: None,
        })
        .await?;
    Ok(())
}

async fn question(store: &QaStore, author: &str, tags: &[&str]) -> StoreResult<i32> {
    let payload = InsertQuestion::from_payload(&json!({
        "title": "Why does the borrow checker reject this?",
        "content": "Minimal example inside.",
        "authorId": author,
    }))?;
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    Ok(store.create_question(&payload, &tags).await?.id)
}

async fn tag_links(store: &QaStore, column: &str, id: i32) -> StoreResult<i64> {
    let query = format!("SELECT COUNT(*) FROM question_tags WHERE {column} = $1");
    let count = sqlx::query_scalar::<_, i64>(&query)
        .bind(id)
        .fetch_one(store.pool())
        .await?;
    Ok(count)
}

async fn answer(store: &QaStore, question_id: i32, author: &str) -> StoreResult<i32> {
    let payload = InsertAnswer {
        content: "Reborrow it.".into(),
        question_id,
        author_id: author.into(),
    };
    Ok(store.create_answer(&payload).await?.id)
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn migrate_is_idempotent(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    store.migrate().await?;
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn upsert_keeps_one_row(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    user(&store, "alice").await?;
    let updated = store
        .upsert_user(&UpsertUser {
            id: "alice".into(),
            email: Some("new@example.com".into()),
            first_name: None,
            last_name: None,
            profile_image_url: None,
        })
        .await?;
    assert_eq!(updated.email.as_deref(), Some("new@example.com"));
    assert!(store.get_user("bob").await?.is_none());
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn question_tags_keep_counts(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    user(&store, "alice").await?;
    let q1 = question(&store, "alice", &["Rust", "rust ", "borrowck"]).await?;
    let q2 = question(&store, "alice", &["rust"]).await?;

    let rust = store.get_tag_by_name("rust").await?.unwrap();
    assert_eq!(rust.question_count, 2);

    let details = store.question_details(q1).await?.unwrap();
    let names: Vec<&str> = details.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["borrowck", "rust"]);

    assert!(!store.attach_tag(q2, rust.id).await?);
    assert!(store.detach_tag(q2, rust.id).await?);
    assert!(!store.detach_tag(q2, rust.id).await?);

    store.delete_question(q1, "alice").await?;
    let rust = store.get_tag_by_name("rust").await?.unwrap();
    assert_eq!(rust.question_count, 0);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn deleting_a_question_cascades(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    user(&store, "alice").await?;
    user(&store, "bob").await?;
    let q = question(&store, "alice", &["rust"]).await?;
    let a = answer(&store, q, "bob").await?;

    let vote = InsertVote {
        user_id: "alice".into(),
        target: VoteTarget::Answer(a),
        direction: VoteDirection::Up,
    };
    store.cast_vote(&vote).await?;

    assert!(matches!(
        store.delete_question(q, "bob").await,
        Err(StoreError::Forbidden(_))
    ));
    store.delete_question(q, "alice").await?;

    assert!(store.get_question(q).await?.is_none());
    assert!(store.get_answer(a).await?.is_none());
    assert!(store.user_vote("alice", VoteTarget::Answer(a)).await?.is_none());
    assert_eq!(tag_links(&store, "question_id", q).await?, 0);
    let rust = store.get_tag_by_name("rust").await?.unwrap();
    assert_eq!(rust.question_count, 0);

    // The answer notification survives with its links cleared.
    let notes = store.list_notifications("alice", false).await?;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].notification.question_id, None);
    assert_eq!(notes[0].notification.answer_id, None);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn deleting_a_tag_keeps_questions(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    user(&store, "alice").await?;
    let q = question(&store, "alice", &["rust", "async"]).await?;
    let rust = store.get_tag_by_name("rust").await?.unwrap();

    store.delete_tag(rust.id).await?;
    assert!(store.get_tag_by_name("rust").await?.is_none());
    assert_eq!(tag_links(&store, "tag_id", rust.id).await?, 0);

    let details = store.question_details(q).await?.unwrap();
    let names: Vec<&str> = details.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["async"]);

    let async_tag = store.get_tag_by_name("async").await?.unwrap();
    store.delete_tag(async_tag.id).await?;
    let details = store.question_details(q).await?.unwrap();
    assert!(details.tags.is_empty());
    assert_eq!(tag_links(&store, "question_id", q).await?, 0);

    assert!(matches!(
        store.delete_tag(rust.id).await,
        Err(StoreError::NotFound { .. })
    ));
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn answers_notify_and_accept(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    user(&store, "alice").await?;
    user(&store, "bob").await?;
    user(&store, "carol").await?;
    let q = question(&store, "alice", &[]).await?;

    answer(&store, q, "alice").await?;
    assert_eq!(store.unread_count("alice").await?, 0);

    let first = answer(&store, q, "bob").await?;
    let second = answer(&store, q, "carol").await?;
    assert_eq!(store.unread_count("alice").await?, 2);

    assert!(matches!(
        store.accept_answer(q, first, "bob").await,
        Err(StoreError::Forbidden(_))
    ));

    store.accept_answer(q, first, "alice").await?;
    store.accept_answer(q, second, "alice").await?;

    let answers = store.list_answers(q).await?;
    let accepted: Vec<i32> = answers
        .iter()
        .filter(|a| a.answer.is_accepted)
        .map(|a| a.answer.id)
        .collect();
    assert_eq!(accepted, [second]);
    assert_eq!(answers[0].answer.id, second);

    let details = store.question_details(q).await?.unwrap();
    assert_eq!(details.question.accepted_answer_id, Some(second));
    assert_eq!(details.answer_count, 3);

    let other = question(&store, "alice", &[]).await?;
    assert!(matches!(
        store.accept_answer(other, first, "alice").await,
        Err(StoreError::Invariant(_))
    ));

    assert_eq!(store.unread_count("bob").await?, 1);
    assert_eq!(store.mark_all_read("alice").await?, 2);
    assert_eq!(store.unread_count("alice").await?, 0);
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn votes_toggle(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    user(&store, "alice").await?;
    user(&store, "bob").await?;
    let q = question(&store, "alice", &[]).await?;

    let mut vote = InsertVote {
        user_id: "bob".into(),
        target: VoteTarget::Question(q),
        direction: VoteDirection::Up,
    };
    let r = store.cast_vote(&vote).await?;
    assert_eq!((r.outcome, r.score), (VoteOutcome::Cast, 1));

    vote.direction = VoteDirection::Down;
    let r = store.cast_vote(&vote).await?;
    assert_eq!((r.outcome, r.score), (VoteOutcome::Switched, -1));

    let r = store.cast_vote(&vote).await?;
    assert_eq!((r.outcome, r.score), (VoteOutcome::Retracted, 0));

    vote.target = VoteTarget::Answer(9999);
    assert!(matches!(
        store.cast_vote(&vote).await,
        Err(StoreError::NotFound { .. })
    ));
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn missing_author_is_reported(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    let err = question(&store, "ghost", &[]).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingReference { .. }));
    Ok(())
}

#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn sessions_expire(pool: PgPool) -> StoreResult<()> {
    let store = setup(pool).await?;
    let now = Utc::now().naive_utc();
    store
        .set_session("live", &json!({ "user": "alice" }), now + Duration::hours(1))
        .await?;
    store
        .set_session("stale", &json!({}), now - Duration::hours(1))
        .await?;

    assert!(store.get_session("live").await?.is_some());
    assert!(store.get_session("stale").await?.is_none());
    assert!(store.get_session_at("live", now + Duration::hours(2)).await?.is_none());
    assert_eq!(store.sweep_expired_sessions(now).await?, 1);
    assert!(store.destroy_session("live").await?);
    assert!(!store.destroy_session("live").await?);
    Ok(())
}

// `expire` is stored as UTC; a connection in a far-off zone must agree with the sweep.
#[sqlx::test(migrations = false)]
#[ignore = "needs DATABASE_URL"]
async fn session_expiry_ignores_connection_time_zone(pool: PgPool) -> StoreResult<()> {
    let options = pool
        .connect_options()
        .as_ref()
        .clone()
        .options([("TimeZone", "Pacific/Kiritimati")]);
    let store = setup(pool).await?;
    let far_east = QaStore::new(
        PgPoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?,
    );

    let now = Utc::now().naive_utc();
    store
        .set_session("soon", &json!({}), now + Duration::minutes(30))
        .await?;

    let live = far_east.get_session("soon").await;
    let swept = far_east.sweep_expired_sessions(now).await;
    far_east.pool().close().await;

    assert!(live?.is_some());
    assert_eq!(swept?, 0);
    Ok(())
}
