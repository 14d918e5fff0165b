//! Row types read from the store and typed insert payloads.
//!
//! Row structs map column names one-to-one (`sqlx::FromRow`) and serialise with
//! camelCase keys for the API layer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::Table;
use crate::errors::SchemaError;
use crate::tables;
use crate::vote::{VoteDirection, VoteTarget};

/* ------------------------------------------------------------------------- */
/* Rows                                                                      */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    /// "First Last", falling back to whichever part exists, then the email.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if !parts.is_empty() {
            parts.join(" ")
        } else {
            self.email.clone().unwrap_or_else(|| self.id.clone())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub views: i32,
    pub votes: i32,
    pub accepted_answer_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub id: i32,
    pub content: String,
    pub question_id: i32,
    pub author_id: String,
    pub votes: i32,
    pub is_accepted: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub question_count: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTag {
    pub id: i32,
    pub question_id: i32,
    pub tag_id: i32,
}

/// Vote as stored: the target is still an untyped pair.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VoteRow {
    pub id: i32,
    pub user_id: String,
    pub target_type: String,
    pub target_id: i32,
    pub vote_type: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: i32,
    pub user_id: String,
    #[serde(flatten)]
    pub target: VoteTarget,
    #[serde(rename = "voteType")]
    pub direction: VoteDirection,
    pub created_at: NaiveDateTime,
}

impl TryFrom<VoteRow> for Vote {
    type Error = SchemaError;

    fn try_from(row: VoteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            target: VoteTarget::from_parts(&row.target_type, row.target_id)?,
            direction: row.vote_type.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Answer,
    Comment,
    Mention,
    Accepted,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Answer => "answer",
            NotificationKind::Comment => "comment",
            NotificationKind::Mention => "mention",
            NotificationKind::Accepted => "accepted",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "answer" => Ok(NotificationKind::Answer),
            "comment" => Ok(NotificationKind::Comment),
            "mention" => Ok(NotificationKind::Mention),
            "accepted" => Ok(NotificationKind::Accepted),
            other => Err(SchemaError::UnknownNotificationKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i32,
    pub user_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub question_id: Option<i32>,
    pub answer_id: Option<i32>,
    pub triggered_by_id: Option<String>,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl Notification {
    pub fn kind(&self) -> Result<NotificationKind, SchemaError> {
        self.kind.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub sid: String,
    pub sess: Value,
    pub expire: NaiveDateTime,
}

/* ------------------------------------------------------------------------- */
/* Detail views                                                              */
/* ------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithDetails {
    #[serde(flatten)]
    pub question: Question,
    pub author: User,
    pub tags: Vec<Tag>,
    pub answer_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_answer: Option<Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerWithDetails {
    #[serde(flatten)]
    pub answer: Answer,
    pub author: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationWithDetails {
    #[serde(flatten)]
    pub notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<User>,
}

/* ------------------------------------------------------------------------- */
/* Insert payloads                                                           */
/* ------------------------------------------------------------------------- */

/// A typed insert payload backed by one table's derived insert rules.
pub trait Insertable: DeserializeOwned {
    fn table() -> &'static Table;

    /// Validates `payload` against the table's insert rules, then decodes it.
    fn from_payload(payload: &Value) -> Result<Self, SchemaError> {
        let fields = Self::table().insert_rules().validate(payload)?;
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl Insertable for UpsertUser {
    fn table() -> &'static Table {
        &tables::USERS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertQuestion {
    pub title: String,
    pub content: String,
    pub author_id: String,
}

impl Insertable for InsertQuestion {
    fn table() -> &'static Table {
        &tables::QUESTIONS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAnswer {
    pub content: String,
    pub question_id: i32,
    pub author_id: String,
}

impl Insertable for InsertAnswer {
    fn table() -> &'static Table {
        &tables::ANSWERS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTag {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl Insertable for InsertTag {
    fn table() -> &'static Table {
        &tables::TAGS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertQuestionTag {
    pub question_id: i32,
    pub tag_id: i32,
}

impl Insertable for InsertQuestionTag {
    fn table() -> &'static Table {
        &tables::QUESTION_TAGS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertVote {
    pub user_id: String,
    #[serde(flatten)]
    pub target: VoteTarget,
    #[serde(rename = "voteType")]
    pub direction: VoteDirection,
}

impl Insertable for InsertVote {
    fn table() -> &'static Table {
        &tables::VOTES
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertNotification {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub question_id: Option<i32>,
    #[serde(default)]
    pub answer_id: Option<i32>,
    #[serde(default)]
    pub triggered_by_id: Option<String>,
}

impl Insertable for InsertNotification {
    fn table() -> &'static Table {
        &tables::NOTIFICATIONS
    }
}
