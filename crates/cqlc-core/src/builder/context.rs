//! The statement context: configuration plus the entry points of every
//! statement kind.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{BindingError, CqlError, Result};
use crate::render::render_truncate;
use crate::schema::{ColumnRef, Columns, Table, TypedColumn};
use crate::session::{BatchCollector, Session};
use crate::statement::{BuiltStatement, OperationKind, Statement};

use super::counter::CounterBuilder;
use super::delete::DeleteBuilder;
use super::expr::TableBinding;
use super::select::SelectBuilder;
use super::upsert::UpsertBuilder;

/// Context configuration.
///
/// Deserializable so it can live in the caller's configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextOptions {
    /// Keyspace used to qualify tables that do not declare their own.
    pub keyspace: Option<String>,
    /// Log every statement with its placeholders inlined.
    pub debug: bool,
}

/// Entry point of the fluent statement builder.
///
/// Each call starts a new statement that owns its accumulated state; terminal
/// operations consume it. The context itself only holds configuration and
/// can be reused for any number of statements.
///
/// # Example
///
/// ```rust
/// use cqlc_core::{StatementContext, Table, TypedColumn};
///
/// let id = TypedColumn::<String>::new("id").partition_key();
/// let bar = TypedColumn::<String>::new("bar");
/// let foo = Table::new("foo").column(&id).column(&bar);
///
/// let ctx = StatementContext::new();
/// let stmt = ctx.select(&bar).from(&foo).where_clause([id.eq("x")]).build().unwrap();
///
/// assert_eq!(stmt.text(), "SELECT bar FROM foo WHERE id = ?");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatementContext {
    options: ContextOptions,
}

impl StatementContext {
    /// Creates a context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from options.
    #[must_use]
    pub const fn with_options(options: ContextOptions) -> Self {
        Self { options }
    }

    /// Creates a context that qualifies tables with a keyspace.
    ///
    /// Tables that declare their own keyspace keep it.
    #[must_use]
    pub fn with_keyspace(keyspace: impl Into<String>) -> Self {
        Self::with_options(ContextOptions {
            keyspace: Some(keyspace.into()),
            ..ContextOptions::default()
        })
    }

    /// Returns the options.
    #[must_use]
    pub const fn options(&self) -> &ContextOptions {
        &self.options
    }

    fn draft(&self, operation: OperationKind) -> Draft {
        Draft {
            stmt: Statement {
                keyspace: self.options.keyspace.clone(),
                ..Statement::new(operation)
            },
            debug: self.options.debug,
            pending: None,
        }
    }

    /// Starts a `SELECT`. `()` selects every declared column of the table.
    #[must_use]
    pub fn select(&self, cols: impl Columns) -> SelectBuilder {
        let mut draft = self.draft(OperationKind::Read);
        draft.stmt.columns = cols.into_columns();
        SelectBuilder::new(draft)
    }

    /// Starts a `SELECT DISTINCT` on a partition key column.
    ///
    /// A column outside the partition key fails when the statement is built.
    #[must_use]
    pub fn select_distinct<T>(&self, col: &TypedColumn<T>) -> SelectBuilder {
        let mut draft = self.draft(OperationKind::Read);
        let column = col.column().clone();
        if !column.is_partitioned() {
            draft.fail(BindingError::NotPartitionKey {
                column: column.name().to_string(),
            });
        }
        draft.stmt.columns = vec![column];
        draft.stmt.read_options.distinct = true;
        SelectBuilder::new(draft)
    }

    /// Starts an `INSERT`, or an `UPDATE` once conditions are added.
    #[must_use]
    pub fn upsert(&self, table: &Table) -> UpsertBuilder {
        let mut draft = self.draft(OperationKind::Write);
        draft.stmt.table = Some(table.clone());
        UpsertBuilder::new(draft)
    }

    /// Starts a write with every binding supplied up front.
    #[must_use]
    pub fn store(&self, binding: TableBinding) -> UpsertBuilder {
        let mut draft = self.draft(OperationKind::Write);
        draft.stmt.table = Some(binding.table);
        draft.stmt.bindings = binding.columns;
        UpsertBuilder::new(draft)
    }

    /// Starts a `DELETE`. `()` deletes the whole row.
    #[must_use]
    pub fn delete(&self, cols: impl Columns) -> DeleteBuilder {
        let mut draft = self.draft(OperationKind::Delete);
        draft.stmt.columns = cols.into_columns();
        DeleteBuilder::new(draft)
    }

    /// Starts a counter update.
    #[must_use]
    pub fn update_counter(&self, table: &Table) -> CounterBuilder {
        let mut draft = self.draft(OperationKind::CounterUpdate);
        draft.stmt.table = Some(table.clone());
        CounterBuilder::new(draft)
    }

    /// Starts a counter update from a full row of bindings.
    ///
    /// Bindings on counter columns become increments, every other binding
    /// becomes an equality restriction.
    #[must_use]
    pub fn add(&self, binding: TableBinding) -> CounterBuilder {
        let mut draft = self.draft(OperationKind::CounterUpdate);
        let (increments, keys): (Vec<_>, Vec<_>) = binding
            .columns
            .into_iter()
            .partition(|b| b.column.is_counter());
        draft.stmt.table = Some(binding.table);
        draft.stmt.bindings = increments;
        draft.stmt.conditions = keys
            .into_iter()
            .map(|b| super::expr::Condition {
                binding: b,
                predicate: super::expr::PredicateKind::Eq,
            })
            .collect();
        CounterBuilder::new(draft)
    }

    /// Renders a `TRUNCATE` for a table.
    #[must_use]
    pub fn truncate_statement(&self, table: &Table) -> BuiltStatement {
        BuiltStatement::new(
            render_truncate(table, self.options.keyspace.as_deref()),
            vec![],
        )
    }

    /// Truncates a table.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn truncate<S: Session>(&self, table: &Table, session: &S) -> Result<()> {
        let stmt = self.truncate_statement(table);
        debug!(cql = stmt.text(), "executing statement");
        session.execute(&stmt).await.map_err(CqlError::execution)
    }
}

/// A statement under construction.
#[derive(Debug)]
pub(crate) struct Draft {
    pub(crate) stmt: Statement,
    debug: bool,
    pending: Option<BindingError>,
}

impl Draft {
    /// Records a misuse that is reported when the statement is built.
    pub(crate) fn fail(&mut self, err: BindingError) {
        self.pending.get_or_insert(err);
    }

    /// Renders and expands, consuming the draft.
    pub(crate) fn finish(self) -> Result<BuiltStatement> {
        if let Some(err) = self.pending {
            return Err(err.into());
        }
        let built = self.stmt.build()?;
        debug!(
            cql = built.text(),
            placeholders = built.placeholders().len(),
            "built statement"
        );
        if self.debug {
            info!("CQL: {}", built.inline());
        }
        Ok(built)
    }

    pub(crate) async fn exec<S: Session>(self, session: &S) -> Result<()> {
        let built = self.finish()?;
        session.execute(&built).await.map_err(CqlError::execution)
    }

    pub(crate) fn batch<B: BatchCollector>(self, collector: &mut B) -> Result<()> {
        collector.add(self.finish()?);
        Ok(())
    }
}

/// Implements the terminal operations shared by every write-like step.
macro_rules! impl_executable {
    ($($builder:ty),+ $(,)?) => {
        $(
            impl $builder {
                /// Returns the statement accumulated so far.
                #[must_use]
                pub const fn statement(&self) -> &$crate::statement::Statement {
                    &self.draft.stmt
                }

                /// Renders the statement and expands its placeholders.
                ///
                /// # Errors
                ///
                /// Returns an error if the statement cannot be rendered or a
                /// bound value cannot be expanded.
                pub fn build(self) -> $crate::error::Result<$crate::statement::BuiltStatement> {
                    self.draft.finish()
                }

                /// Builds and executes the statement.
                ///
                /// # Errors
                ///
                /// Returns a build error, or the executor's error unchanged.
                pub async fn exec<S: $crate::session::Session>(
                    self,
                    session: &S,
                ) -> $crate::error::Result<()> {
                    self.draft.exec(session).await
                }

                /// Builds the statement and adds it to a batch.
                ///
                /// # Errors
                ///
                /// Returns a build error; nothing is added in that case.
                pub fn batch<B: $crate::session::BatchCollector>(
                    self,
                    collector: &mut B,
                ) -> $crate::error::Result<()> {
                    self.draft.batch(collector)
                }
            }
        )+
    };
}

pub(crate) use impl_executable;
