//! Table declarations for the Q&A platform.

use crate::descriptor::{Column, ColumnDefault, Index, OnDelete, SqlType, Table};

pub const VOTE_TARGET_TYPES: &[&str] = &["question", "answer"];
pub const VOTE_TYPES: &[&str] = &["up", "down"];
pub const NOTIFICATION_TYPES: &[&str] = &["answer", "comment", "mention", "accepted"];
pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// Authentication session storage, swept by expiry.
pub static SESSIONS: Table = Table {
    name: "sessions",
    columns: &[
        Column::new("sid", SqlType::Varchar(None)).primary_key(),
        Column::new("sess", SqlType::Jsonb).not_null(),
        Column::new("expire", SqlType::Timestamp).not_null(),
    ],
    indexes: &[Index {
        name: "IDX_session_expire",
        columns: &["expire"],
        unique: false,
    }],
};

/// Users are keyed by the identity provider's subject id, so `id` is client-supplied.
pub static USERS: Table = Table {
    name: "users",
    columns: &[
        Column::new("id", SqlType::Varchar(None)).primary_key(),
        Column::new("email", SqlType::Varchar(None)).unique(),
        Column::new("first_name", SqlType::Varchar(None)),
        Column::new("last_name", SqlType::Varchar(None)),
        Column::new("profile_image_url", SqlType::Varchar(None)),
        Column::timestamp_now("created_at"),
        Column::timestamp_now("updated_at"),
    ],
    indexes: &[],
};

pub static QUESTIONS: Table = Table {
    name: "questions",
    columns: &[
        Column::serial_id(),
        Column::new("title", SqlType::Varchar(Some(255))).not_null(),
        Column::new("content", SqlType::Text).not_null(),
        Column::new("author_id", SqlType::Varchar(None))
            .not_null()
            .references("users", "id", OnDelete::NoAction),
        Column::counter("views"),
        Column::counter("votes"),
        // Points at an answer of this question; checked by the store, not by a key.
        Column::new("accepted_answer_id", SqlType::Integer).server_only(),
        Column::timestamp_now("created_at"),
        Column::timestamp_now("updated_at"),
    ],
    indexes: &[Index {
        name: "questions_author_idx",
        columns: &["author_id"],
        unique: false,
    }],
};

pub static ANSWERS: Table = Table {
    name: "answers",
    columns: &[
        Column::serial_id(),
        Column::new("content", SqlType::Text).not_null(),
        Column::new("question_id", SqlType::Integer)
            .not_null()
            .references("questions", "id", OnDelete::Cascade),
        Column::new("author_id", SqlType::Varchar(None))
            .not_null()
            .references("users", "id", OnDelete::NoAction),
        Column::counter("votes"),
        Column::new("is_accepted", SqlType::Boolean)
            .not_null()
            .default(ColumnDefault::Bool(false))
            .server_only(),
        Column::timestamp_now("created_at"),
        Column::timestamp_now("updated_at"),
    ],
    indexes: &[Index {
        name: "answers_question_idx",
        columns: &["question_id"],
        unique: false,
    }],
};

pub static TAGS: Table = Table {
    name: "tags",
    columns: &[
        Column::serial_id(),
        Column::new("name", SqlType::Varchar(Some(50)))
            .not_null()
            .unique(),
        Column::new("description", SqlType::Text),
        Column::new("color", SqlType::Varchar(Some(7)))
            .not_null()
            .default(ColumnDefault::Text(DEFAULT_TAG_COLOR)),
        Column::counter("question_count"),
        Column::timestamp_now("created_at"),
    ],
    indexes: &[],
};

pub static QUESTION_TAGS: Table = Table {
    name: "question_tags",
    columns: &[
        Column::serial_id(),
        Column::new("question_id", SqlType::Integer)
            .not_null()
            .references("questions", "id", OnDelete::Cascade),
        Column::new("tag_id", SqlType::Integer)
            .not_null()
            .references("tags", "id", OnDelete::Cascade),
    ],
    indexes: &[Index {
        name: "question_tags_question_tag_key",
        columns: &["question_id", "tag_id"],
        unique: true,
    }],
};

/// `target_id` is resolved through `target_type`, so it carries no foreign key.
pub static VOTES: Table = Table {
    name: "votes",
    columns: &[
        Column::serial_id(),
        Column::new("user_id", SqlType::Varchar(None))
            .not_null()
            .references("users", "id", OnDelete::NoAction),
        Column::new("target_type", SqlType::Varchar(None))
            .not_null()
            .one_of(VOTE_TARGET_TYPES),
        Column::new("target_id", SqlType::Integer).not_null(),
        Column::new("vote_type", SqlType::Varchar(None))
            .not_null()
            .one_of(VOTE_TYPES),
        Column::timestamp_now("created_at"),
    ],
    indexes: &[Index {
        name: "votes_user_target_key",
        columns: &["user_id", "target_type", "target_id"],
        unique: true,
    }],
};

pub static NOTIFICATIONS: Table = Table {
    name: "notifications",
    columns: &[
        Column::serial_id(),
        Column::new("user_id", SqlType::Varchar(None))
            .not_null()
            .references("users", "id", OnDelete::NoAction),
        Column::new("type", SqlType::Varchar(None))
            .not_null()
            .one_of(NOTIFICATION_TYPES),
        Column::new("title", SqlType::Varchar(None)).not_null(),
        Column::new("message", SqlType::Text).not_null(),
        Column::new("question_id", SqlType::Integer).references(
            "questions",
            "id",
            OnDelete::SetNull,
        ),
        Column::new("answer_id", SqlType::Integer).references("answers", "id", OnDelete::SetNull),
        Column::new("triggered_by_id", SqlType::Varchar(None)).references(
            "users",
            "id",
            OnDelete::NoAction,
        ),
        Column::new("is_read", SqlType::Boolean)
            .not_null()
            .default(ColumnDefault::Bool(false))
            .server_only(),
        Column::timestamp_now("created_at"),
    ],
    indexes: &[Index {
        name: "notifications_user_idx",
        columns: &["user_id", "is_read"],
        unique: false,
    }],
};
