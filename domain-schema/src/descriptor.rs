//! Entity descriptors: the single description of every persisted table.
//!
//! Both the PostgreSQL DDL ([`crate::ddl`]) and the client-input validators
//! ([`crate::validation`]) are generated from these values.

use crate::validation::InsertRules;

/// Column storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// Auto-incrementing 32-bit integer key.
    Serial,
    Integer,
    /// Variable-length string, optionally bounded (in characters).
    Varchar(Option<u32>),
    Text,
    Boolean,
    Timestamp,
    Jsonb,
}

/// Value a column takes when an insert leaves it out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnDefault {
    Now,
    Int(i64),
    Bool(bool),
    Text(&'static str),
}

/// Referential action applied to the child row when its parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    /// The delete fails while child rows still point at the parent.
    NoAction,
    Cascade,
    SetNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: &'static str,
    pub column: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<ColumnDefault>,
    pub references: Option<ForeignKey>,
    /// Assigned by the server only; never accepted from client payloads.
    pub server_only: bool,
    /// Closed set of accepted values; empty means unrestricted.
    pub allowed: &'static [&'static str],
}

impl Column {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
            references: None,
            server_only: false,
            allowed: &[],
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn default(mut self, value: ColumnDefault) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn references(
        mut self,
        table: &'static str,
        column: &'static str,
        on_delete: OnDelete,
    ) -> Self {
        self.references = Some(ForeignKey {
            table,
            column,
            on_delete,
        });
        self
    }

    pub const fn server_only(mut self) -> Self {
        self.server_only = true;
        self
    }

    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = values;
        self
    }

    /// Serial key plus the usual server-assigned flags.
    pub const fn serial_id() -> Self {
        Self::new("id", SqlType::Serial).primary_key().server_only()
    }

    /// `NOT NULL DEFAULT now()` timestamp assigned by the server.
    pub const fn timestamp_now(name: &'static str) -> Self {
        Self::new(name, SqlType::Timestamp)
            .not_null()
            .default(ColumnDefault::Now)
            .server_only()
    }

    /// `NOT NULL DEFAULT 0` counter maintained by the server.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, SqlType::Integer)
            .not_null()
            .default(ColumnDefault::Int(0))
            .server_only()
    }

    /// Whether a client payload must contain this column.
    pub fn required_on_insert(&self) -> bool {
        !self.server_only && !self.nullable && self.default.is_none()
    }

    /// Key used for this column in JSON payloads (`author_id` → `authorId`).
    pub fn json_key(&self) -> String {
        camel_case(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Index {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub indexes: &'static [Index],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Looks a column up by its JSON key.
    pub fn column_by_json_key(&self, key: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.json_key() == key)
    }

    pub fn primary_key(&self) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.primary_key)
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = (&'static Column, ForeignKey)> {
        self.columns
            .iter()
            .filter_map(|c| c.references.map(|fk| (c, fk)))
    }

    /// Columns a client may supply on insert, in declaration order.
    pub fn insert_columns(&self) -> impl Iterator<Item = &'static Column> {
        self.columns.iter().filter(|c| !c.server_only)
    }

    pub fn server_only_columns(&self) -> impl Iterator<Item = &'static Column> {
        self.columns.iter().filter(|c| c.server_only)
    }

    /// Validation rules for insert payloads, derived from the column list.
    pub fn insert_rules(&'static self) -> InsertRules {
        InsertRules::new(self)
    }
}

/// `snake_case` → `camelCase`.
pub fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
