//! `SELECT` steps.

use std::marker::PhantomData;

use crate::error::{CqlError, Result};
use crate::schema::{Columns, Table};
use crate::session::{Row, Session};
use crate::statement::{BuiltStatement, Statement};

use super::context::Draft;
use super::expr::{Condition, Ordering, TableBinding};

// Typestate markers

/// Marker: no table specified yet.
pub struct NoFrom;
/// Marker: table has been specified.
pub struct HasFrom;

/// A `SELECT` under construction.
///
/// Conditions, ordering, limits, result bindings and the fetch operations are
/// only available once the table is known.
pub struct SelectBuilder<From = NoFrom> {
    draft: Draft,
    _state: PhantomData<From>,
}

impl SelectBuilder<NoFrom> {
    pub(crate) const fn new(draft: Draft) -> Self {
        Self {
            draft,
            _state: PhantomData,
        }
    }

    /// Specifies the table to select from.
    #[must_use]
    pub fn from(mut self, table: &Table) -> SelectBuilder<HasFrom> {
        self.draft.stmt.table = Some(table.clone());
        SelectBuilder {
            draft: self.draft,
            _state: PhantomData,
        }
    }
}

impl SelectBuilder<HasFrom> {
    /// Adds WHERE conditions, joined with `AND`.
    #[must_use]
    pub fn where_clause(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.draft.stmt.conditions.extend(conditions);
        self
    }

    /// Adds `ORDER BY` entries in call order.
    #[must_use]
    pub fn order_by(mut self, orderings: impl IntoIterator<Item = Ordering>) -> Self {
        self.draft.stmt.read_options.order_by.extend(orderings);
        self
    }

    /// Sets the `LIMIT`.
    #[must_use]
    pub const fn limit(mut self, n: u32) -> Self {
        self.draft.stmt.read_options.limit = Some(n);
        self
    }

    /// Registers the columns a fetched row is scanned into.
    #[must_use]
    pub fn bind(mut self, cols: impl Columns) -> Self {
        self.draft.stmt.result_bindings = cols.into_columns();
        self
    }

    /// Scans the fetched row into the columns of a table binding.
    #[must_use]
    pub fn into_binding(mut self, binding: &TableBinding) -> Self {
        self.draft.stmt.table = Some(binding.table.clone());
        self.draft.stmt.result_bindings = binding.column_descriptors();
        self
    }

    /// Returns the statement accumulated so far.
    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.draft.stmt
    }

    /// Renders the statement and expands its placeholders.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be rendered or a bound value
    /// cannot be expanded.
    pub fn build(self) -> Result<BuiltStatement> {
        self.draft.finish()
    }

    /// Executes the query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns a build error, or the executor's error unchanged.
    pub async fn fetch<S: Session>(self, session: &S) -> Result<Vec<Row>> {
        let built = self.draft.finish()?;
        session.query(&built).await.map_err(CqlError::execution)
    }

    /// Executes the query and returns the first row, if any.
    ///
    /// The row is projected onto the bound result columns when some were
    /// registered with [`bind`](Self::bind) or
    /// [`into_binding`](Self::into_binding).
    ///
    /// # Errors
    ///
    /// Returns a build error, or the executor's error unchanged.
    pub async fn fetch_one<S: Session>(self, session: &S) -> Result<Option<Row>> {
        let result_columns = self.draft.stmt.result_bindings.clone();
        let built = self.draft.finish()?;
        let rows = session.query(&built).await.map_err(CqlError::execution)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|row| row.project(&result_columns)))
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::{Table, TypedColumn};
    use crate::StatementContext;

    fn foo() -> Table {
        Table::new("foo")
    }

    #[test]
    fn test_select_with_ordering_and_limit() {
        let bar = TypedColumn::<String>::new("bar").partition_key();
        let quux = TypedColumn::<i32>::new("quux").clustering_key();
        let stmt = StatementContext::new()
            .select((&bar, &quux))
            .from(&foo())
            .where_clause([bar.eq("x")])
            .order_by([quux.desc()])
            .limit(99)
            .build()
            .unwrap();
        assert_eq!(
            stmt.text(),
            "SELECT bar, quux FROM foo WHERE bar = ? ORDER BY quux DESC LIMIT 99"
        );
    }

    #[test]
    fn test_multiple_orderings_keep_call_order() {
        let a = TypedColumn::<i32>::new("a");
        let b = TypedColumn::<i32>::new("b");
        let stmt = StatementContext::new()
            .select(&a)
            .from(&foo())
            .order_by([b.asc()])
            .order_by([a.desc()])
            .build()
            .unwrap();
        assert_eq!(stmt.text(), "SELECT a FROM foo ORDER BY b, a DESC");
    }

    #[test]
    fn test_select_distinct() {
        let bar = TypedColumn::<String>::new("bar").partition_key();
        let stmt = StatementContext::new()
            .select_distinct(&bar)
            .from(&foo())
            .build()
            .unwrap();
        assert_eq!(stmt.text(), "SELECT DISTINCT bar FROM foo");
    }

    #[test]
    fn test_bind_records_result_columns() {
        let bar = TypedColumn::<String>::new("bar");
        let builder = StatementContext::new().select(()).from(&foo()).bind(&bar);
        assert_eq!(builder.statement().result_bindings.len(), 1);
        assert_eq!(builder.statement().result_bindings[0].name(), "bar");
    }
}
