//! The accumulated statement and its rendered form.

use std::fmt;

use crate::builder::expr::{ColumnBinding, Condition, Ordering};
use crate::builder::value::CqlValue;
use crate::error::Result;
use crate::schema::{Column, Table};
use crate::{expand, render};

/// Operation a statement performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Nothing selected yet; rendering fails.
    #[default]
    None,
    /// `SELECT`
    Read,
    /// `INSERT`, or `UPDATE` when conditions are present.
    Write,
    /// `DELETE`
    Delete,
    /// `UPDATE ... SET c = c + ?` on counter columns.
    CounterUpdate,
}

/// Options that only apply to reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// `SELECT DISTINCT`
    pub distinct: bool,
    /// `LIMIT n`
    pub limit: Option<u32>,
    /// `ORDER BY` entries in call order.
    pub order_by: Vec<Ordering>,
}

/// How the table name is qualified in rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyspaceMode<'a> {
    /// Bare table name.
    Unqualified,
    /// Keyspace configured on the statement context.
    Override(&'a str),
    /// Keyspace declared by the table descriptor.
    Static(&'a str),
}

/// Everything the fluent builder accumulated for one statement.
///
/// A `Statement` is plain data. [`render`](crate::render::render) and
/// [`expand`](crate::expand::expand) are pure functions over it and must
/// agree on the number and order of placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    /// Operation kind.
    pub operation: OperationKind,
    /// Target table.
    pub table: Option<Table>,
    /// Projected (read) or deleted (delete) columns.
    pub columns: Vec<Column>,
    /// SET bindings in declaration order.
    pub bindings: Vec<ColumnBinding>,
    /// WHERE conditions, or HAVING for counter updates.
    pub conditions: Vec<Condition>,
    /// IF conditions.
    pub if_conditions: Vec<Condition>,
    /// Columns returned by a compare-and-swap that was not applied.
    pub cas_bindings: Vec<Column>,
    /// Columns a fetched row is scanned into.
    pub result_bindings: Vec<Column>,
    /// Read options.
    pub read_options: ReadOptions,
    /// Keyspace configured on the statement context.
    pub keyspace: Option<String>,
}

impl Statement {
    /// Creates an empty statement for an operation.
    #[must_use]
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            ..Self::default()
        }
    }

    /// Resolves the keyspace qualification.
    ///
    /// A table-static keyspace wins over the context override, which wins
    /// over no qualification.
    #[must_use]
    pub fn keyspace_mode(&self) -> KeyspaceMode<'_> {
        let table_keyspace = self.table.as_ref().and_then(Table::keyspace);
        match (table_keyspace, self.keyspace.as_deref()) {
            (Some(ks), _) => KeyspaceMode::Static(ks),
            (None, Some(ks)) => KeyspaceMode::Override(ks),
            (None, None) => KeyspaceMode::Unqualified,
        }
    }

    /// Renders the statement and expands its placeholders.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be rendered or a bound value
    /// cannot be expanded.
    pub fn build(&self) -> Result<BuiltStatement> {
        let text = render::render(self)?;
        let placeholders = expand::expand(self)?;
        Ok(BuiltStatement { text, placeholders })
    }
}

/// Rendered statement text with its ordered placeholder values.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    text: String,
    placeholders: Vec<CqlValue>,
}

impl BuiltStatement {
    /// Creates a built statement from parts.
    #[must_use]
    pub const fn new(text: String, placeholders: Vec<CqlValue>) -> Self {
        Self { text, placeholders }
    }

    /// Returns the statement text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the placeholder values, in `?` order.
    #[must_use]
    pub fn placeholders(&self) -> &[CqlValue] {
        &self.placeholders
    }

    /// Splits into text and placeholders.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<CqlValue>) {
        (self.text, self.placeholders)
    }

    /// Returns the text with every `?` replaced by its value as a literal.
    ///
    /// **Warning**: only meant for logging.
    #[must_use]
    pub fn inline(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut values = self.placeholders.iter();
        for ch in self.text.chars() {
            if ch == '?' {
                match values.next() {
                    Some(v) => out.push_str(&v.to_cql_literal()),
                    None => out.push('?'),
                }
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl fmt::Display for BuiltStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
