//! Client payload validation derived from the table descriptors.
//!
//! Insert payloads may only carry the columns a client is allowed to supply.
//! Server-only columns (ids, counters, flags, timestamps) are rejected outright
//! rather than silently ignored.

use std::fmt;

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::descriptor::{Column, SqlType, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    NotAnObject,
    UnknownField,
    ServerOnlyField,
    Missing,
    Null,
    WrongType { expected: &'static str },
    TooLong { max: u32 },
    NotAllowed { allowed: &'static [&'static str] },
}

/// One problem with one field; `field` is the JSON key (empty for the payload itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::NotAnObject => f.write_str("payload must be a JSON object"),
            IssueKind::UnknownField => write!(f, "{}: unknown field", self.field),
            IssueKind::ServerOnlyField => write!(f, "{}: assigned by the server", self.field),
            IssueKind::Missing => write!(f, "{}: required", self.field),
            IssueKind::Null => write!(f, "{}: must not be null", self.field),
            IssueKind::WrongType { expected } => write!(f, "{}: expected {expected}", self.field),
            IssueKind::TooLong { max } => {
                write!(f, "{}: longer than {max} characters", self.field)
            }
            IssueKind::NotAllowed { allowed } => {
                write!(f, "{}: must be one of {}", self.field, allowed.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {table} payload: {}", render_issues(.issues))]
pub struct ValidationError {
    pub table: &'static str,
    pub issues: Vec<FieldIssue>,
}

fn render_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn has(&self, field: &str, kind: &IssueKind) -> bool {
        self.issues.iter().any(|i| i.field == field && &i.kind == kind)
    }
}

/// Insert rules for one table.
#[derive(Debug, Clone, Copy)]
pub struct InsertRules {
    table: &'static Table,
}

impl InsertRules {
    pub fn new(table: &'static Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static Table {
        self.table
    }

    /// JSON keys accepted on insert.
    pub fn accepted_keys(&self) -> Vec<String> {
        self.table.insert_columns().map(Column::json_key).collect()
    }

    /// Checks `payload` and returns its fields when every rule passes.
    ///
    /// All issues are collected, not just the first one.
    pub fn validate(&self, payload: &Value) -> Result<Map<String, Value>, ValidationError> {
        let Some(obj) = payload.as_object() else {
            return Err(self.error(vec![FieldIssue {
                field: String::new(),
                kind: IssueKind::NotAnObject,
            }]));
        };

        let mut issues = Vec::new();

        for key in obj.keys() {
            match self.table.column_by_json_key(key) {
                None => issues.push(issue(key, IssueKind::UnknownField)),
                Some(c) if c.server_only => issues.push(issue(key, IssueKind::ServerOnlyField)),
                Some(_) => {}
            }
        }

        for column in self.table.insert_columns() {
            let key = column.json_key();
            match obj.get(&key) {
                None if column.required_on_insert() => issues.push(issue(&key, IssueKind::Missing)),
                None => {}
                Some(Value::Null) if column.nullable => {}
                Some(Value::Null) => issues.push(issue(&key, IssueKind::Null)),
                Some(v) => {
                    if let Some(kind) = check_value(column, v) {
                        issues.push(issue(&key, kind));
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(obj.clone())
        } else {
            Err(self.error(issues))
        }
    }

    fn error(&self, issues: Vec<FieldIssue>) -> ValidationError {
        ValidationError {
            table: self.table.name,
            issues,
        }
    }
}

fn issue(field: &str, kind: IssueKind) -> FieldIssue {
    FieldIssue {
        field: field.to_string(),
        kind,
    }
}

fn check_value(column: &Column, v: &Value) -> Option<IssueKind> {
    match column.sql_type {
        SqlType::Serial | SqlType::Integer => match v.as_i64() {
            Some(n) if i32::try_from(n).is_ok() => None,
            _ => Some(IssueKind::WrongType {
                expected: "32-bit integer",
            }),
        },
        SqlType::Boolean => (!v.is_boolean()).then_some(IssueKind::WrongType {
            expected: "boolean",
        }),
        SqlType::Jsonb => None,
        SqlType::Timestamp => match v.as_str() {
            Some(s) if parse_timestamp(s).is_some() => None,
            _ => Some(IssueKind::WrongType {
                expected: "timestamp string",
            }),
        },
        SqlType::Varchar(max) => check_text(column, v, max),
        SqlType::Text => check_text(column, v, None),
    }
}

fn check_text(column: &Column, v: &Value, max: Option<u32>) -> Option<IssueKind> {
    let Some(s) = v.as_str() else {
        return Some(IssueKind::WrongType { expected: "string" });
    };
    if let Some(max) = max {
        if s.chars().count() > max as usize {
            return Some(IssueKind::TooLong { max });
        }
    }
    if !column.allowed.is_empty() && !column.allowed.contains(&s) {
        return Some(IssueKind::NotAllowed {
            allowed: column.allowed,
        });
    }
    None
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS[.f]` timestamp.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables;
    use serde_json::json;

    #[test]
    fn question_payload_accepts_client_fields_only() {
        let rules = tables::QUESTIONS.insert_rules();
        assert_eq!(rules.accepted_keys(), vec!["title", "content", "authorId"]);

        let ok = rules
            .validate(&json!({ "title": "T", "content": "C", "authorId": "u1" }))
            .unwrap();
        assert_eq!(ok.len(), 3);
    }

    #[test]
    fn server_only_fields_are_rejected() {
        let rules = tables::ANSWERS.insert_rules();
        let err = rules
            .validate(&json!({
                "content": "C",
                "questionId": 1,
                "authorId": "u1",
                "id": 99,
                "votes": 1000,
                "isAccepted": true
            }))
            .unwrap_err();
        assert_eq!(err.table, "answers");
        assert!(err.has("id", &IssueKind::ServerOnlyField));
        assert!(err.has("votes", &IssueKind::ServerOnlyField));
        assert!(err.has("isAccepted", &IssueKind::ServerOnlyField));
        assert_eq!(err.issues.len(), 3);
    }

    #[test]
    fn missing_and_unknown_fields_are_collected() {
        let err = tables::QUESTIONS
            .insert_rules()
            .validate(&json!({ "title": "T", "body": "x" }))
            .unwrap_err();
        assert!(err.has("body", &IssueKind::UnknownField));
        assert!(err.has("content", &IssueKind::Missing));
        assert!(err.has("authorId", &IssueKind::Missing));
        // snake_case keys are not accepted aliases.
        let err = tables::QUESTIONS
            .insert_rules()
            .validate(&json!({ "title": "T", "content": "C", "author_id": "u" }))
            .unwrap_err();
        assert!(err.has("author_id", &IssueKind::UnknownField));
    }

    #[test]
    fn type_length_and_enum_checks() {
        let long_title = "x".repeat(256);
        let err = tables::QUESTIONS
            .insert_rules()
            .validate(&json!({ "title": long_title, "content": 5, "authorId": null }))
            .unwrap_err();
        assert!(err.has("title", &IssueKind::TooLong { max: 255 }));
        assert!(err.has("content", &IssueKind::WrongType { expected: "string" }));
        assert!(err.has("authorId", &IssueKind::Null));

        let err = tables::VOTES
            .insert_rules()
            .validate(&json!({
                "userId": "u",
                "targetType": "comment",
                "targetId": 4_000_000_000i64,
                "voteType": "up"
            }))
            .unwrap_err();
        assert!(err.has(
            "targetType",
            &IssueKind::NotAllowed {
                allowed: tables::VOTE_TARGET_TYPES
            }
        ));
        assert!(err.has(
            "targetId",
            &IssueKind::WrongType {
                expected: "32-bit integer"
            }
        ));
    }

    #[test]
    fn nullable_and_defaulted_fields_are_optional() {
        let rules = tables::TAGS.insert_rules();
        rules.validate(&json!({ "name": "rust" })).unwrap();
        rules
            .validate(&json!({ "name": "rust", "description": null, "color": "#000000" }))
            .unwrap();
        let err = rules.validate(&json!({ "name": "rust", "color": null })).unwrap_err();
        assert!(err.has("color", &IssueKind::Null));
    }

    #[test]
    fn non_object_payload() {
        let err = tables::TAGS.insert_rules().validate(&json!(["rust"])).unwrap_err();
        assert_eq!(err.issues[0].kind, IssueKind::NotAnObject);
        assert_eq!(err.to_string(), "invalid tags payload: payload must be a JSON object");
    }

    #[test]
    fn timestamps_parse() {
        assert!(parse_timestamp("2024-05-13T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-13T10:00:00.123").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
