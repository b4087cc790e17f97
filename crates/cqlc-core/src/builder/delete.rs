//! `DELETE` steps.

use std::marker::PhantomData;

use crate::schema::Table;

use super::context::{impl_executable, Draft};
use super::expr::Condition;
use super::select::{HasFrom, NoFrom};

/// A `DELETE` under construction.
pub struct DeleteBuilder<From = NoFrom> {
    draft: Draft,
    _state: PhantomData<From>,
}

impl DeleteBuilder<NoFrom> {
    pub(crate) const fn new(draft: Draft) -> Self {
        Self {
            draft,
            _state: PhantomData,
        }
    }

    /// Specifies the table to delete from.
    #[must_use]
    pub fn from(mut self, table: &Table) -> DeleteBuilder<HasFrom> {
        self.draft.stmt.table = Some(table.clone());
        DeleteBuilder {
            draft: self.draft,
            _state: PhantomData,
        }
    }
}

impl DeleteBuilder<HasFrom> {
    /// Adds WHERE conditions, joined with `AND`.
    #[must_use]
    pub fn where_clause(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.draft.stmt.conditions.extend(conditions);
        self
    }

    /// Adds IF conditions; the delete only applies when they all hold.
    #[must_use]
    pub fn if_clause(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.draft.stmt.if_conditions.extend(conditions);
        self
    }
}

impl_executable!(DeleteBuilder<HasFrom>);

#[cfg(test)]
mod tests {
    use crate::builder::value::CqlValue;
    use crate::schema::{Table, TypedColumn};
    use crate::StatementContext;

    #[test]
    fn test_delete_row_with_if_clause() {
        let id = TypedColumn::<String>::new("id").partition_key();
        let age = TypedColumn::<i32>::new("age");
        let stmt = StatementContext::new()
            .delete(())
            .from(&Table::new("foo"))
            .where_clause([id.eq("x")])
            .if_clause([age.eq(28)])
            .build()
            .unwrap();
        assert_eq!(stmt.text(), "DELETE FROM foo WHERE id = ? IF age = ?");
        assert_eq!(
            stmt.placeholders(),
            &[CqlValue::Text(String::from("x")), CqlValue::Int(28)]
        );
    }

    #[test]
    fn test_delete_columns() {
        let id = TypedColumn::<String>::new("id");
        let bar = TypedColumn::<String>::new("bar");
        let quux = TypedColumn::<i32>::new("quux");
        let stmt = StatementContext::with_keyspace("ks")
            .delete((&bar, &quux))
            .from(&Table::new("foo"))
            .where_clause([id.eq("x")])
            .build()
            .unwrap();
        assert_eq!(stmt.text(), "DELETE bar, quux FROM ks.foo WHERE id = ?");
    }
}
