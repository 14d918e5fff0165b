//! Relationship accessors used by the data-access layer to join related rows.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// At most one target row.
    One,
    /// Any number of target rows.
    Many,
}

/// `owner.name` joins `target` on `owner.from_column = target.to_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub owner: &'static str,
    pub name: &'static str,
    pub kind: RelationKind,
    pub target: &'static str,
    pub from_column: &'static str,
    pub to_column: &'static str,
}

const fn one(
    owner: &'static str,
    name: &'static str,
    target: &'static str,
    from_column: &'static str,
) -> Relation {
    Relation {
        owner,
        name,
        kind: RelationKind::One,
        target,
        from_column,
        to_column: "id",
    }
}

const fn many(
    owner: &'static str,
    name: &'static str,
    target: &'static str,
    to_column: &'static str,
) -> Relation {
    Relation {
        owner,
        name,
        kind: RelationKind::Many,
        target,
        from_column: "id",
        to_column,
    }
}

pub static RELATIONS: &[Relation] = &[
    many("users", "questions", "questions", "author_id"),
    many("users", "answers", "answers", "author_id"),
    many("users", "votes", "votes", "user_id"),
    many("users", "notifications", "notifications", "user_id"),
    one("questions", "author", "users", "author_id"),
    many("questions", "answers", "answers", "question_id"),
    many("questions", "tags", "question_tags", "question_id"),
    one("questions", "acceptedAnswer", "answers", "accepted_answer_id"),
    one("answers", "question", "questions", "question_id"),
    one("answers", "author", "users", "author_id"),
    many("tags", "questions", "question_tags", "tag_id"),
    one("question_tags", "question", "questions", "question_id"),
    one("question_tags", "tag", "tags", "tag_id"),
    one("votes", "user", "users", "user_id"),
    one("notifications", "user", "users", "user_id"),
    one("notifications", "question", "questions", "question_id"),
    one("notifications", "answer", "answers", "answer_id"),
    one("notifications", "triggeredBy", "users", "triggered_by_id"),
];
