//! Persistent data model of the Q&A platform.
//!
//! Tables are declared once in [`tables`]; the DDL and the insert validators
//! are both derived from those declarations.

pub mod ddl;
pub mod descriptor;
pub mod errors;
pub mod models;
pub mod relations;
pub mod tables;
pub mod validation;
pub mod vote;

use std::collections::{BTreeSet, VecDeque};

pub use descriptor::{Column, OnDelete, SqlType, Table};
pub use errors::{SchemaError, SchemaResult};
pub use models::Insertable;
pub use relations::{Relation, RelationKind};
pub use validation::{FieldIssue, InsertRules, IssueKind, ValidationError};
pub use vote::{VoteDirection, VoteTarget};

/// All tables plus their relationship accessors.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    tables: &'static [&'static Table],
    relations: &'static [Relation],
}

/// Tables in creation order: every referenced table precedes its referrers.
pub static SCHEMA: Schema = Schema {
    tables: &[
        &tables::SESSIONS,
        &tables::USERS,
        &tables::QUESTIONS,
        &tables::ANSWERS,
        &tables::TAGS,
        &tables::QUESTION_TAGS,
        &tables::VOTES,
        &tables::NOTIFICATIONS,
    ],
    relations: relations::RELATIONS,
};

impl Schema {
    pub fn tables(&self) -> &'static [&'static Table] {
        self.tables
    }

    pub fn table(&self, name: &str) -> SchemaResult<&'static Table> {
        self.tables
            .iter()
            .copied()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaError::UnknownTable(name.to_string()))
    }

    /// `CREATE TABLE` / `CREATE INDEX` statements for the whole schema.
    pub fn create_statements(&self) -> Vec<String> {
        ddl::create_statements(self.tables)
    }

    pub fn relations_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'static Relation> + 'a {
        self.relations.iter().filter(move |r| r.owner == owner)
    }

    /// Tables whose rows go away when a row of `table` is deleted.
    pub fn cascade_closure(&self, table: &str) -> BTreeSet<&'static str> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([table.to_string()]);
        while let Some(parent) = queue.pop_front() {
            for (child, _) in self.referrers(&parent, OnDelete::Cascade) {
                if seen.insert(child.name) {
                    queue.push_back(child.name.to_string());
                }
            }
        }
        seen
    }

    /// `(table, column)` pairs that block deleting a row of `table` while they point at it.
    pub fn restricting_references(&self, table: &str) -> Vec<(&'static str, &'static str)> {
        self.referrers(table, OnDelete::NoAction)
            .map(|(t, c)| (t.name, c.name))
            .collect()
    }

    fn referrers<'a>(
        &'a self,
        parent: &'a str,
        action: OnDelete,
    ) -> impl Iterator<Item = (&'static Table, &'static Column)> + 'a {
        self.tables.iter().flat_map(move |t| {
            t.foreign_keys()
                .filter(move |(_, fk)| fk.table == parent && fk.on_delete == action)
                .map(move |(c, _)| (*t, c))
        })
    }
}
