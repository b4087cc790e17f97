//! Conditions, bindings and orderings.

use crate::schema::{Column, ColumnRef, Counter, Table, TypedColumn};

use super::value::{CqlValue, ToCqlValue};

/// Comparison used by a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `IN (...)`
    In,
}

impl PredicateKind {
    /// Returns the CQL operator token.
    #[must_use]
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::In => "IN",
        }
    }
}

/// Mutation applied to a collection column instead of replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionOp {
    /// `col = col + ?`
    Append,
    /// `col = ? + col`
    Prepend,
    /// `col = col - ?`
    RemoveByValue,
    /// `col = col - ?` with a sequence of map keys.
    RemoveByKey,
    /// `col[?] = ?`
    SetByKey,
}

impl CollectionOp {
    /// Returns a short description used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::RemoveByValue => "remove values",
            Self::RemoveByKey => "remove keys",
            Self::SetByKey => "set map value",
        }
    }
}

/// A value bound to a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBinding {
    /// Target column.
    pub column: Column,
    /// Bound value.
    pub value: CqlValue,
    /// Collection mutation, if any.
    pub op: Option<CollectionOp>,
}

impl ColumnBinding {
    /// Creates a plain binding.
    #[must_use]
    pub fn new(column: &impl ColumnRef, value: impl ToCqlValue) -> Self {
        Self {
            column: column.column().clone(),
            value: value.to_cql_value(),
            op: None,
        }
    }

    /// Tags the binding with a collection mutation.
    #[must_use]
    pub const fn with_op(mut self, op: CollectionOp) -> Self {
        self.op = Some(op);
        self
    }
}

/// A restriction on a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column and value.
    pub binding: ColumnBinding,
    /// Comparison.
    pub predicate: PredicateKind,
}

impl Condition {
    /// Creates a condition on an untyped column.
    #[must_use]
    pub fn new(column: &impl ColumnRef, predicate: PredicateKind, value: impl ToCqlValue) -> Self {
        Self {
            binding: ColumnBinding::new(column, value),
            predicate,
        }
    }

    /// Returns the restricted column.
    #[must_use]
    pub const fn column(&self) -> &Column {
        &self.binding.column
    }

    /// Returns the bound value.
    #[must_use]
    pub const fn value(&self) -> &CqlValue {
        &self.binding.value
    }
}

/// One `ORDER BY` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    /// Clustering column name.
    pub column: String,
    /// Whether to sort descending.
    pub descending: bool,
}

impl<T: ToCqlValue> TypedColumn<T> {
    fn condition(&self, predicate: PredicateKind, value: T) -> Condition {
        Condition::new(self, predicate, value)
    }

    /// Creates an equality condition.
    #[must_use]
    pub fn eq(&self, value: impl Into<T>) -> Condition {
        self.condition(PredicateKind::Eq, value.into())
    }

    /// Creates a greater-than condition.
    #[must_use]
    pub fn gt(&self, value: impl Into<T>) -> Condition {
        self.condition(PredicateKind::Gt, value.into())
    }

    /// Creates a greater-than-or-equal condition.
    #[must_use]
    pub fn ge(&self, value: impl Into<T>) -> Condition {
        self.condition(PredicateKind::Ge, value.into())
    }

    /// Creates a less-than condition.
    #[must_use]
    pub fn lt(&self, value: impl Into<T>) -> Condition {
        self.condition(PredicateKind::Lt, value.into())
    }

    /// Creates a less-than-or-equal condition.
    #[must_use]
    pub fn le(&self, value: impl Into<T>) -> Condition {
        self.condition(PredicateKind::Le, value.into())
    }

    /// Creates an `IN` condition. Element order is preserved.
    #[must_use]
    pub fn in_list<I>(&self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        let items = values
            .into_iter()
            .map(|v| v.into().to_cql_value())
            .collect();
        Condition::new(self, PredicateKind::In, CqlValue::List(items))
    }
}

impl<T> TypedColumn<T> {
    /// Orders ascending by this column.
    #[must_use]
    pub fn asc(&self) -> Ordering {
        Ordering {
            column: self.name().to_string(),
            descending: false,
        }
    }

    /// Orders descending by this column.
    #[must_use]
    pub fn desc(&self) -> Ordering {
        Ordering {
            column: self.name().to_string(),
            descending: true,
        }
    }
}

/// A full row of bindings for one table.
///
/// Used to store a row in one call, to split it into counter increments and
/// key restrictions, or to name the columns a fetched row is scanned into.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBinding {
    /// Target table.
    pub table: Table,
    /// Bindings in declaration order.
    pub columns: Vec<ColumnBinding>,
}

impl TableBinding {
    /// Creates an empty binding set for a table.
    #[must_use]
    pub fn new(table: &Table) -> Self {
        Self {
            table: table.clone(),
            columns: vec![],
        }
    }

    /// Binds a value to a column.
    #[must_use]
    pub fn with<T: ToCqlValue>(mut self, col: &TypedColumn<T>, value: impl Into<T>) -> Self {
        self.columns.push(ColumnBinding::new(col, value.into()));
        self
    }

    /// Binds an increment to a counter column.
    #[must_use]
    pub fn with_counter(mut self, col: &TypedColumn<Counter>, delta: i64) -> Self {
        self.columns.push(ColumnBinding::new(col, delta));
        self
    }

    /// Returns the bound column descriptors.
    #[must_use]
    pub fn column_descriptors(&self) -> Vec<Column> {
        self.columns.iter().map(|b| b.column.clone()).collect()
    }
}
