//! Executor seam.
//!
//! The builder never talks to the network. Terminal operations hand the
//! rendered statement to a [`Session`] supplied by the caller, typically a thin
//! wrapper around a driver session, and pass its errors through untouched.

use crate::builder::value::{CqlValue, FromCqlValue};
use crate::schema::Column;
use crate::statement::BuiltStatement;

/// A fetched row: column names with their values, in result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, CqlValue)>,
}

impl Row {
    /// Creates a row from `(column, value)` pairs.
    #[must_use]
    pub fn new(columns: Vec<(String, CqlValue)>) -> Self {
        Self { columns }
    }

    /// Returns the value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&CqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Returns the value of a column converted to `T`.
    ///
    /// Returns `None` if the column is absent or holds another type.
    #[must_use]
    pub fn get_as<T: FromCqlValue>(&self, column: &str) -> Option<T> {
        self.get(column).and_then(T::from_cql_value)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Keeps only the given columns, in the given order.
    ///
    /// Columns missing from the row are skipped. An empty selection keeps the
    /// row as is.
    #[must_use]
    pub fn project(self, columns: &[Column]) -> Self {
        if columns.is_empty() {
            return self;
        }
        let mut source = self.columns;
        let mut projected = Vec::with_capacity(columns.len());
        for col in columns {
            if let Some(pos) = source.iter().position(|(name, _)| name == col.name()) {
                projected.push(source.swap_remove(pos));
            }
        }
        Self { columns: projected }
    }
}

/// Result of a compare-and-swap.
#[derive(Debug, Clone, PartialEq)]
pub struct CasOutcome {
    /// Whether the write was applied.
    pub applied: bool,
    /// The existing row when the write was not applied, projected onto the
    /// CAS bindings. Empty when applied.
    pub existing: Row,
}

/// Executes rendered statements against the store.
///
/// Implementations own timeouts, retries, paging and cancellation.
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Error reported by the underlying driver.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes a statement that returns no rows.
    async fn execute(&self, stmt: &BuiltStatement) -> Result<(), Self::Error>;

    /// Executes a statement and returns all rows.
    async fn query(&self, stmt: &BuiltStatement) -> Result<Vec<Row>, Self::Error>;

    /// Executes a conditional write.
    ///
    /// Returns whether it was applied and, if not, the current row.
    async fn execute_cas(&self, stmt: &BuiltStatement) -> Result<(bool, Row), Self::Error>;
}

/// Collects statements for atomic submission.
pub trait BatchCollector {
    /// Adds a rendered statement.
    fn add(&mut self, stmt: BuiltStatement);
}

impl BatchCollector for Vec<BuiltStatement> {
    fn add(&mut self, stmt: BuiltStatement) {
        self.push(stmt);
    }
}

/// Kind of a CQL batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchKind {
    /// `BEGIN BATCH`
    #[default]
    Logged,
    /// `BEGIN UNLOGGED BATCH`
    Unlogged,
    /// `BEGIN COUNTER BATCH`
    Counter,
}

/// A batch of independently rendered statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    kind: BatchKind,
    statements: Vec<BuiltStatement>,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub const fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            statements: Vec::new(),
        }
    }

    /// Returns the batch kind.
    #[must_use]
    pub const fn kind(&self) -> BatchKind {
        self.kind
    }

    /// Returns the statements in submission order.
    #[must_use]
    pub fn statements(&self) -> &[BuiltStatement] {
        &self.statements
    }

    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Folds the batch into a single statement.
    ///
    /// For drivers that only accept plain query strings. Placeholders are
    /// concatenated in statement order.
    #[must_use]
    pub fn to_statement(&self) -> BuiltStatement {
        let header = match self.kind {
            BatchKind::Logged => "BEGIN BATCH",
            BatchKind::Unlogged => "BEGIN UNLOGGED BATCH",
            BatchKind::Counter => "BEGIN COUNTER BATCH",
        };
        let mut text = String::from(header);
        let mut placeholders = Vec::new();
        for stmt in &self.statements {
            text.push_str("\n  ");
            text.push_str(stmt.text());
            text.push(';');
            placeholders.extend_from_slice(stmt.placeholders());
        }
        text.push_str("\nAPPLY BATCH");
        BuiltStatement::new(text, placeholders)
    }
}

impl BatchCollector for Batch {
    fn add(&mut self, stmt: BuiltStatement) {
        self.statements.push(stmt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(vec![
            (String::from("id"), CqlValue::Text(String::from("a"))),
            (String::from("n"), CqlValue::Int(1)),
            (String::from("x"), CqlValue::Boolean(true)),
        ])
    }

    #[test]
    fn test_row_get_as() {
        let row = row();
        assert_eq!(row.get_as::<String>("id"), Some(String::from("a")));
        assert_eq!(row.get_as::<i32>("n"), Some(1));
        assert_eq!(row.get_as::<i32>("id"), None);
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_row_project_follows_binding_order() {
        let projected = row().project(&[Column::new("x"), Column::new("missing"), Column::new("id")]);
        let names: Vec<&str> = projected.column_names().collect();
        assert_eq!(names, vec!["x", "id"]);
    }

    #[test]
    fn test_batch_to_statement() {
        let mut batch = Batch::new(BatchKind::Unlogged);
        batch.add(BuiltStatement::new(
            String::from("INSERT INTO foo (id) VALUES (?)"),
            vec![CqlValue::Int(1)],
        ));
        batch.add(BuiltStatement::new(
            String::from("DELETE FROM foo WHERE id = ?"),
            vec![CqlValue::Int(2)],
        ));
        let stmt = batch.to_statement();
        assert_eq!(
            stmt.text(),
            "BEGIN UNLOGGED BATCH\n  INSERT INTO foo (id) VALUES (?);\n  DELETE FROM foo WHERE id = ?;\nAPPLY BATCH"
        );
        assert_eq!(stmt.placeholders(), &[CqlValue::Int(1), CqlValue::Int(2)]);
    }
}
