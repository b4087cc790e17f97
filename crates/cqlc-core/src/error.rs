//! Error types for statement building.

use thiserror::Error;

use crate::statement::OperationKind;

/// A bound value could not be turned into placeholders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A compare-and-swap was attempted without result bindings.
    #[error("missing CAS bindings")]
    MissingCasBindings,

    /// A value is neither a scalar, a fixed-width identifier nor a sequence.
    #[error("cannot bind component: {value} (kind: {kind})")]
    CannotBindComponent {
        /// The offending value, rendered as a CQL literal.
        value: String,
        /// Its observed kind.
        kind: &'static str,
    },

    /// A collection operation disagrees with the column or value shape.
    #[error("cannot {operation} on column '{column}': expected {expected}, found {found}")]
    CollectionShape {
        /// Column name.
        column: String,
        /// The collection operation.
        operation: &'static str,
        /// The shape the operation requires.
        expected: &'static str,
        /// The shape that was bound.
        found: String,
    },

    /// A collection operation on a write without WHERE conditions.
    #[error("cannot {operation} on column '{column}' in an INSERT; add a WHERE clause")]
    CollectionOpInInsert {
        /// Column name.
        column: String,
        /// The collection operation.
        operation: &'static str,
    },

    /// A write or counter update with nothing to assign.
    #[error("nothing to assign in write to '{table}'")]
    EmptyAssignment {
        /// Qualified table name.
        table: String,
    },

    /// `SELECT DISTINCT` on a column outside the partition key.
    #[error("SELECT DISTINCT requires a partition key column, '{column}' is not one")]
    NotPartitionKey {
        /// Column name.
        column: String,
    },
}

/// Errors returned by the builder and its terminal operations.
#[derive(Debug, Error)]
pub enum CqlError {
    /// Placeholder binding failed.
    #[error("binding error: {0}")]
    Binding(#[from] BindingError),

    /// The statement has no operation kind.
    #[error("unknown operation type: {0:?}")]
    UnknownOperation(OperationKind),

    /// The statement has no target table.
    #[error("statement has no target table")]
    MissingTable,

    /// IF conditions on an operation that does not support them.
    #[error("IF conditions are not supported on {0:?} statements")]
    UnsupportedIfClause(OperationKind),

    /// Failure reported by the executor, passed through untouched.
    #[error(transparent)]
    Execution(Box<dyn std::error::Error + Send + Sync>),
}

impl CqlError {
    /// Wraps an executor error.
    pub fn execution<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Execution(Box::new(err))
    }
}

/// Result type alias for statement building.
pub type Result<T> = std::result::Result<T, CqlError>;
