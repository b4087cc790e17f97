//! Write steps: `INSERT`, `UPDATE` and compare-and-swap.
//!
//! A write without conditions renders as `INSERT`. Adding WHERE conditions
//! turns it into an `UPDATE`, which is also the only form that can express
//! collection mutations.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{BindingError, CqlError, Result};
use crate::schema::{Columns, TypedColumn};
use crate::session::{CasOutcome, Row, Session};
use crate::statement::{BuiltStatement, Statement};

use super::context::{impl_executable, Draft};
use super::expr::{CollectionOp, ColumnBinding, Condition};
use super::value::{CqlValue, ToCqlValue};

fn list_value<T: ToCqlValue>(values: impl IntoIterator<Item = impl Into<T>>) -> CqlValue {
    CqlValue::List(
        values
            .into_iter()
            .map(|v| v.into().to_cql_value())
            .collect(),
    )
}

/// A write under construction.
pub struct UpsertBuilder {
    draft: Draft,
}

impl UpsertBuilder {
    pub(crate) const fn new(draft: Draft) -> Self {
        Self { draft }
    }

    fn push(mut self, binding: ColumnBinding) -> Self {
        self.draft.stmt.bindings.push(binding);
        self
    }

    /// Binds a value to a column (`col = ?`).
    #[must_use]
    pub fn set<T: ToCqlValue>(self, col: &TypedColumn<T>, value: impl Into<T>) -> Self {
        self.push(ColumnBinding::new(col, value.into()))
    }

    /// Appends elements to a list (`col = col + ?`).
    #[must_use]
    pub fn append_list<T: ToCqlValue>(
        self,
        col: &TypedColumn<Vec<T>>,
        values: impl IntoIterator<Item = impl Into<T>>,
    ) -> Self {
        let binding = ColumnBinding::new(col, list_value(values)).with_op(CollectionOp::Append);
        self.push(binding)
    }

    /// Prepends elements to a list (`col = ? + col`).
    #[must_use]
    pub fn prepend_list<T: ToCqlValue>(
        self,
        col: &TypedColumn<Vec<T>>,
        values: impl IntoIterator<Item = impl Into<T>>,
    ) -> Self {
        let binding = ColumnBinding::new(col, list_value(values)).with_op(CollectionOp::Prepend);
        self.push(binding)
    }

    /// Removes every occurrence of the given elements from a list
    /// (`col = col - ?`).
    #[must_use]
    pub fn remove_list_values<T: ToCqlValue>(
        self,
        col: &TypedColumn<Vec<T>>,
        values: impl IntoIterator<Item = impl Into<T>>,
    ) -> Self {
        let binding =
            ColumnBinding::new(col, list_value(values)).with_op(CollectionOp::RemoveByValue);
        self.push(binding)
    }

    /// Adds elements to a set (`col = col + ?`).
    #[must_use]
    pub fn add_set_values<T: ToCqlValue>(
        self,
        col: &TypedColumn<BTreeSet<T>>,
        values: impl IntoIterator<Item = impl Into<T>>,
    ) -> Self {
        let binding = ColumnBinding::new(col, list_value(values)).with_op(CollectionOp::Append);
        self.push(binding)
    }

    /// Removes elements from a set (`col = col - ?`).
    #[must_use]
    pub fn remove_set_values<T: ToCqlValue>(
        self,
        col: &TypedColumn<BTreeSet<T>>,
        values: impl IntoIterator<Item = impl Into<T>>,
    ) -> Self {
        let binding =
            ColumnBinding::new(col, list_value(values)).with_op(CollectionOp::RemoveByValue);
        self.push(binding)
    }

    /// Sets one map entry (`col[?] = ?`).
    #[must_use]
    pub fn set_map_value(
        self,
        col: &TypedColumn<BTreeMap<String, String>>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let mut entry = BTreeMap::new();
        entry.insert(key.into(), value.into());
        self.push(ColumnBinding::new(col, entry).with_op(CollectionOp::SetByKey))
    }

    /// Removes map entries by key (`col = col - ?`).
    #[must_use]
    pub fn remove_map_keys(
        self,
        col: &TypedColumn<BTreeMap<String, String>>,
        keys: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let binding =
            ColumnBinding::new(col, list_value::<String>(keys)).with_op(CollectionOp::RemoveByKey);
        self.push(binding)
    }

    /// Appends pre-built bindings in order.
    ///
    /// Collection tags are checked against the column shape when the
    /// statement is built.
    #[must_use]
    pub fn apply(mut self, bindings: impl IntoIterator<Item = ColumnBinding>) -> Self {
        self.draft.stmt.bindings.extend(bindings);
        self
    }

    /// Makes the write conditional on the row not existing yet.
    ///
    /// When the write is not applied, the current values of `cols` are
    /// returned by [`CasBuilder::swap`].
    #[must_use]
    pub fn if_exists(mut self, cols: impl Columns) -> CasBuilder {
        self.draft.stmt.cas_bindings = cols.into_columns();
        CasBuilder { draft: self.draft }
    }

    /// Adds WHERE conditions, turning the write into an `UPDATE`.
    #[must_use]
    pub fn where_clause(mut self, conditions: impl IntoIterator<Item = Condition>) -> UpdateBuilder {
        self.draft.stmt.conditions.extend(conditions);
        UpdateBuilder { draft: self.draft }
    }
}

/// An `UPDATE` under construction.
pub struct UpdateBuilder {
    draft: Draft,
}

impl UpdateBuilder {
    /// Adds more WHERE conditions.
    #[must_use]
    pub fn where_clause(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.draft.stmt.conditions.extend(conditions);
        self
    }
}

impl_executable!(UpsertBuilder, UpdateBuilder);

/// A conditional `INSERT ... IF NOT EXISTS`.
pub struct CasBuilder {
    draft: Draft,
}

impl CasBuilder {
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

    /// Executes the conditional write.
    ///
    /// A write that is not applied is not an error: the outcome carries the
    /// existing values of the CAS bindings.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::MissingCasBindings`] when no CAS bindings were
    /// given, a build error, or the executor's error unchanged.
    pub async fn swap<S: Session>(self, session: &S) -> Result<CasOutcome> {
        if self.draft.stmt.cas_bindings.is_empty() {
            return Err(BindingError::MissingCasBindings.into());
        }
        let cas_columns = self.draft.stmt.cas_bindings.clone();
        let built = self.draft.finish()?;
        let (applied, row) = session
            .execute_cas(&built)
            .await
            .map_err(CqlError::execution)?;
        let existing = if applied {
            Row::default()
        } else {
            row.project(&cas_columns)
        };
        Ok(CasOutcome { applied, existing })
    }
}
