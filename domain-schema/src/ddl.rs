//! PostgreSQL DDL rendered from the table descriptors.

use std::fmt::Write;

use crate::descriptor::{Column, ColumnDefault, Index, OnDelete, SqlType, Table};

pub fn sql_type(t: SqlType) -> String {
    match t {
        SqlType::Serial => "SERIAL".into(),
        SqlType::Integer => "INTEGER".into(),
        SqlType::Varchar(Some(n)) => format!("VARCHAR({n})"),
        SqlType::Varchar(None) => "VARCHAR".into(),
        SqlType::Text => "TEXT".into(),
        SqlType::Boolean => "BOOLEAN".into(),
        SqlType::Timestamp => "TIMESTAMP".into(),
        SqlType::Jsonb => "JSONB".into(),
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Identifiers with upper-case letters must be quoted to keep their case.
fn ident(name: &str) -> String {
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

fn default_sql(d: ColumnDefault) -> String {
    match d {
        ColumnDefault::Now => "now()".into(),
        ColumnDefault::Int(n) => n.to_string(),
        ColumnDefault::Bool(b) => if b { "TRUE" } else { "FALSE" }.into(),
        ColumnDefault::Text(s) => quote_literal(s),
    }
}

/// One column line of a `CREATE TABLE` body.
pub fn column_definition(c: &Column) -> String {
    let mut out = format!("{} {}", ident(c.name), sql_type(c.sql_type));
    if c.primary_key {
        out.push_str(" PRIMARY KEY");
    } else if !c.nullable {
        out.push_str(" NOT NULL");
    }
    if c.unique {
        out.push_str(" UNIQUE");
    }
    if let Some(d) = c.default {
        let _ = write!(out, " DEFAULT {}", default_sql(d));
    }
    if let Some(fk) = c.references {
        let _ = write!(out, " REFERENCES {} ({})", ident(fk.table), ident(fk.column));
        match fk.on_delete {
            OnDelete::NoAction => {}
            OnDelete::Cascade => out.push_str(" ON DELETE CASCADE"),
            OnDelete::SetNull => out.push_str(" ON DELETE SET NULL"),
        }
    }
    if !c.allowed.is_empty() {
        let values: Vec<String> = c.allowed.iter().map(|v| quote_literal(v)).collect();
        let _ = write!(out, " CHECK ({} IN ({}))", ident(c.name), values.join(", "));
    }
    out
}

pub fn create_table(t: &Table) -> String {
    let body: Vec<String> = t
        .columns
        .iter()
        .map(|c| format!("    {}", column_definition(c)))
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        ident(t.name),
        body.join(",\n")
    )
}

pub fn create_index(t: &Table, idx: &Index) -> String {
    let cols: Vec<String> = idx.columns.iter().map(|c| ident(c)).collect();
    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
        if idx.unique { "UNIQUE " } else { "" },
        ident(idx.name),
        ident(t.name),
        cols.join(", ")
    )
}

/// `CREATE TABLE` followed by its indexes, for each table in order.
pub fn create_statements(tables: &[&Table]) -> Vec<String> {
    let mut out = Vec::new();
    for t in tables {
        out.push(create_table(t));
        out.extend(t.indexes.iter().map(|idx| create_index(t, idx)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables;

    #[test]
    fn answers_table_cascades_from_questions() {
        let sql = create_table(&tables::ANSWERS);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS answers (\n    id SERIAL PRIMARY KEY,"));
        assert!(sql.contains(
            "question_id INTEGER NOT NULL REFERENCES questions (id) ON DELETE CASCADE"
        ));
        assert!(sql.contains("author_id VARCHAR NOT NULL REFERENCES users (id),"));
        assert!(sql.contains("is_accepted BOOLEAN NOT NULL DEFAULT FALSE"));
        assert!(sql.contains("created_at TIMESTAMP NOT NULL DEFAULT now()"));
    }

    #[test]
    fn enumerated_columns_get_checks() {
        let sql = create_table(&tables::VOTES);
        assert!(sql.contains(
            "target_type VARCHAR NOT NULL CHECK (target_type IN ('question', 'answer'))"
        ));
        assert!(sql.contains("vote_type VARCHAR NOT NULL CHECK (vote_type IN ('up', 'down'))"));
    }

    #[test]
    fn tag_color_default_is_quoted() {
        let sql = create_table(&tables::TAGS);
        assert!(sql.contains("name VARCHAR(50) NOT NULL UNIQUE"));
        assert!(sql.contains("color VARCHAR(7) NOT NULL DEFAULT '#3B82F6'"));
    }

    #[test]
    fn indexes_render_with_uniqueness() {
        let q = &tables::QUESTION_TAGS;
        assert_eq!(
            create_index(q, &q.indexes[0]),
            "CREATE UNIQUE INDEX IF NOT EXISTS question_tags_question_tag_key ON question_tags (question_id, tag_id)"
        );
        let s = &tables::SESSIONS;
        assert_eq!(
            create_index(s, &s.indexes[0]),
            "CREATE INDEX IF NOT EXISTS \"IDX_session_expire\" ON sessions (expire)"
        );
    }

    #[test]
    fn notification_type_column_is_plain_identifier() {
        let sql = create_table(&tables::NOTIFICATIONS);
        assert!(sql.contains("    type VARCHAR NOT NULL CHECK (type IN ('answer', 'comment', 'mention', 'accepted'))"));
        assert!(sql.contains("answer_id INTEGER REFERENCES answers (id) ON DELETE SET NULL"));
    }
}
