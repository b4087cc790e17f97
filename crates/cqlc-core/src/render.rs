//! Statement text rendering.
//!
//! Every `?` emitted here must have a counterpart, in the same order, in
//! [`expand`](crate::expand::expand).

use tracing::debug;

use crate::builder::expr::{CollectionOp, ColumnBinding, Condition, PredicateKind};
use crate::error::{BindingError, CqlError, Result};
use crate::expand::in_cardinality;
use crate::schema::{Column, Table};
use crate::statement::{KeyspaceMode, OperationKind, Statement};

/// Renders the statement text.
///
/// # Errors
///
/// Returns [`CqlError::UnknownOperation`] when no operation is set,
/// [`CqlError::MissingTable`] without a target table, and a binding error when
/// an `IN` operand is not a sequence, a write has nothing to assign, or a
/// collection operation cannot be expressed by the chosen statement form.
pub fn render(stmt: &Statement) -> Result<String> {
    if stmt.operation == OperationKind::None {
        return Err(CqlError::UnknownOperation(stmt.operation));
    }
    if !stmt.if_conditions.is_empty() && stmt.operation != OperationKind::Delete {
        return Err(CqlError::UnsupportedIfClause(stmt.operation));
    }
    let table = stmt.table.as_ref().ok_or(CqlError::MissingTable)?;
    let table_name = qualified_name(stmt, table);

    let mut cql = String::new();
    match stmt.operation {
        OperationKind::Read => render_select(stmt, table, &table_name, &mut cql)?,
        OperationKind::Write => {
            if stmt.conditions.is_empty() {
                render_insert(stmt, &table_name, &mut cql)?;
            } else {
                render_update(stmt, &table_name, false, &mut cql)?;
            }
            render_cas(stmt, &mut cql);
        }
        OperationKind::CounterUpdate => render_update(stmt, &table_name, true, &mut cql)?,
        OperationKind::Delete => render_delete(stmt, &table_name, &mut cql)?,
        OperationKind::None => return Err(CqlError::UnknownOperation(stmt.operation)),
    }
    Ok(cql)
}

/// Renders `TRUNCATE` for a table, honoring keyspace precedence.
#[must_use]
pub fn render_truncate(table: &Table, keyspace: Option<&str>) -> String {
    let stmt = Statement {
        table: Some(table.clone()),
        keyspace: keyspace.map(String::from),
        ..Statement::default()
    };
    format!("TRUNCATE {}", qualified_name(&stmt, table))
}

fn qualified_name(stmt: &Statement, table: &Table) -> String {
    match stmt.keyspace_mode() {
        KeyspaceMode::Unqualified => table.name().to_string(),
        KeyspaceMode::Override(ks) => format!("{ks}.{}", table.name()),
        KeyspaceMode::Static(ks) => {
            if let Some(shadowed) = stmt.keyspace.as_deref() {
                debug!(
                    table = table.name(),
                    keyspace = ks,
                    shadowed,
                    "table keyspace takes precedence over context keyspace"
                );
            }
            format!("{ks}.{}", table.name())
        }
    }
}

fn column_clause(cols: &[Column]) -> String {
    let names: Vec<&str> = cols.iter().map(Column::name).collect();
    names.join(", ")
}

fn render_select(stmt: &Statement, table: &Table, table_name: &str, cql: &mut String) -> Result<()> {
    cql.push_str("SELECT ");

    if stmt.read_options.distinct {
        cql.push_str("DISTINCT ");
    }

    let cols = if stmt.columns.is_empty() {
        table.columns()
    } else {
        stmt.columns.as_slice()
    };
    if cols.is_empty() {
        cql.push('*');
    } else {
        cql.push_str(&column_clause(cols));
    }

    cql.push_str(" FROM ");
    cql.push_str(table_name);

    if !stmt.conditions.is_empty() {
        cql.push_str(" WHERE ");
        cql.push_str(&condition_clause(&stmt.conditions)?);
    }

    if !stmt.read_options.order_by.is_empty() {
        let orders: Vec<String> = stmt
            .read_options
            .order_by
            .iter()
            .map(|o| {
                if o.descending {
                    format!("{} DESC", o.column)
                } else {
                    o.column.clone()
                }
            })
            .collect();
        cql.push_str(" ORDER BY ");
        cql.push_str(&orders.join(", "));
    }

    if let Some(n) = stmt.read_options.limit {
        cql.push_str(&format!(" LIMIT {n}"));
    }

    Ok(())
}

fn ensure_assignments(stmt: &Statement, table_name: &str) -> Result<()> {
    if stmt.bindings.is_empty() {
        return Err(BindingError::EmptyAssignment {
            table: table_name.to_string(),
        }
        .into());
    }
    Ok(())
}

fn render_insert(stmt: &Statement, table_name: &str, cql: &mut String) -> Result<()> {
    ensure_assignments(stmt, table_name)?;
    if let Some(binding) = stmt.bindings.iter().find(|b| b.op.is_some()) {
        return Err(BindingError::CollectionOpInInsert {
            column: binding.column.name().to_string(),
            operation: binding.op.map_or("", CollectionOp::as_str),
        }
        .into());
    }

    let names: Vec<&str> = stmt.bindings.iter().map(|b| b.column.name()).collect();
    let placeholders: Vec<&str> = stmt.bindings.iter().map(|_| "?").collect();

    cql.push_str("INSERT INTO ");
    cql.push_str(table_name);
    cql.push_str(&format!(" ({}) VALUES ({})", names.join(", "), placeholders.join(",")));
    Ok(())
}

fn render_update(stmt: &Statement, table_name: &str, counter: bool, cql: &mut String) -> Result<()> {
    ensure_assignments(stmt, table_name)?;
    let assignments: Vec<String> = stmt
        .bindings
        .iter()
        .map(|b| assignment(b, counter))
        .collect();

    cql.push_str("UPDATE ");
    cql.push_str(table_name);
    cql.push_str(" SET ");
    cql.push_str(&assignments.join(", "));

    if !stmt.conditions.is_empty() {
        cql.push_str(" WHERE ");
        cql.push_str(&condition_clause(&stmt.conditions)?);
    }
    Ok(())
}

fn assignment(binding: &ColumnBinding, counter: bool) -> String {
    let col = binding.column.name();
    // Counters only take signed deltas, whatever the binding says.
    if counter {
        return format!("{col} = {col} + ?");
    }
    match binding.op {
        None => format!("{col} = ?"),
        Some(CollectionOp::Append) => format!("{col} = {col} + ?"),
        Some(CollectionOp::Prepend) => format!("{col} = ? + {col}"),
        Some(CollectionOp::RemoveByValue | CollectionOp::RemoveByKey) => {
            format!("{col} = {col} - ?")
        }
        Some(CollectionOp::SetByKey) => format!("{col}[?] = ?"),
    }
}

fn render_cas(stmt: &Statement, cql: &mut String) {
    if stmt.cas_bindings.is_empty() {
        return;
    }
    if stmt.conditions.is_empty() {
        cql.push_str(" IF NOT EXISTS");
    } else {
        cql.push_str(" IF EXISTS");
    }
}

fn render_delete(stmt: &Statement, table_name: &str, cql: &mut String) -> Result<()> {
    cql.push_str("DELETE ");

    if !stmt.columns.is_empty() {
        cql.push_str(&column_clause(&stmt.columns));
        cql.push(' ');
    }

    cql.push_str("FROM ");
    cql.push_str(table_name);

    if !stmt.conditions.is_empty() {
        cql.push_str(" WHERE ");
        cql.push_str(&condition_clause(&stmt.conditions)?);
    }

    if !stmt.if_conditions.is_empty() {
        cql.push_str(" IF ");
        cql.push_str(&condition_clause(&stmt.if_conditions)?);
    }
    Ok(())
}

fn condition_clause(conditions: &[Condition]) -> Result<String> {
    let fragments = conditions
        .iter()
        .map(condition_fragment)
        .collect::<Result<Vec<_>>>()?;
    Ok(fragments.join(" AND "))
}

fn condition_fragment(cond: &Condition) -> Result<String> {
    let col = cond.column().name();
    if cond.predicate == PredicateKind::In {
        let n = in_cardinality(cond)?;
        let placeholders = vec!["?"; n].join(",");
        Ok(format!("{col} IN ({placeholders})"))
    } else {
        Ok(format!("{col} {} ?", cond.predicate.operator()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::value::CqlValue;

    fn foo() -> Table {
        Table::new("foo")
    }

    fn read(table: Table) -> Statement {
        Statement {
            table: Some(table),
            ..Statement::new(OperationKind::Read)
        }
    }

    #[test]
    fn test_unknown_operation() {
        let stmt = Statement {
            table: Some(foo()),
            ..Statement::default()
        };
        assert!(matches!(
            render(&stmt),
            Err(CqlError::UnknownOperation(OperationKind::None))
        ));
    }

    #[test]
    fn test_missing_table() {
        let stmt = Statement::new(OperationKind::Read);
        assert!(matches!(render(&stmt), Err(CqlError::MissingTable)));
    }

    #[test]
    fn test_select_defaults_to_table_columns() {
        let table = foo().column(&Column::new("bar")).column(&Column::new("baz"));
        assert_eq!(render(&read(table)).unwrap(), "SELECT bar, baz FROM foo");
    }

    #[test]
    fn test_select_star_without_declared_columns() {
        assert_eq!(render(&read(foo())).unwrap(), "SELECT * FROM foo");
    }

    #[test]
    fn test_each_predicate_operator() {
        let id = Column::new("id");
        for (pred, op) in [
            (PredicateKind::Eq, "="),
            (PredicateKind::Gt, ">"),
            (PredicateKind::Ge, ">="),
            (PredicateKind::Lt, "<"),
            (PredicateKind::Le, "<="),
        ] {
            let mut stmt = read(foo());
            stmt.columns = vec![Column::new("bar")];
            stmt.conditions = vec![Condition::new(&id, pred, "x")];
            assert_eq!(
                render(&stmt).unwrap(),
                format!("SELECT bar FROM foo WHERE id {op} ?")
            );
        }
    }

    #[test]
    fn test_in_requires_sequence() {
        let mut stmt = read(foo());
        stmt.conditions = vec![Condition::new(&Column::new("id"), PredicateKind::In, "x")];
        assert!(matches!(
            render(&stmt),
            Err(CqlError::Binding(BindingError::CannotBindComponent { kind: "text", .. }))
        ));
    }

    #[test]
    fn test_in_with_empty_sequence() {
        let mut stmt = read(foo());
        stmt.conditions = vec![Condition::new(
            &Column::new("id"),
            PredicateKind::In,
            CqlValue::List(vec![]),
        )];
        assert_eq!(render(&stmt).unwrap(), "SELECT * FROM foo WHERE id IN ()");
    }

    #[test]
    fn test_cas_on_update_uses_if_exists() {
        let id = Column::new("id");
        let bar = Column::new("bar");
        let stmt = Statement {
            table: Some(foo()),
            bindings: vec![ColumnBinding::new(&bar, "baz")],
            conditions: vec![Condition::new(&id, PredicateKind::Eq, "x")],
            cas_bindings: vec![bar.clone()],
            ..Statement::new(OperationKind::Write)
        };
        assert_eq!(
            render(&stmt).unwrap(),
            "UPDATE foo SET bar = ? WHERE id = ? IF EXISTS"
        );
    }

    #[test]
    fn test_collection_op_in_insert_is_rejected() {
        let list = Column::new("l");
        let stmt = Statement {
            table: Some(foo()),
            bindings: vec![ColumnBinding::new(&list, vec![1_i32]).with_op(CollectionOp::Append)],
            ..Statement::new(OperationKind::Write)
        };
        assert!(matches!(
            render(&stmt),
            Err(CqlError::Binding(BindingError::CollectionOpInInsert { .. }))
        ));
    }

    #[test]
    fn test_if_conditions_only_on_delete() {
        let stmt = Statement {
            table: Some(foo()),
            if_conditions: vec![Condition::new(&Column::new("age"), PredicateKind::Eq, 28_i32)],
            ..Statement::new(OperationKind::Read)
        };
        assert!(matches!(
            render(&stmt),
            Err(CqlError::UnsupportedIfClause(OperationKind::Read))
        ));
    }

    #[test]
    fn test_unknown_operation_wins_over_if_conditions() {
        let stmt = Statement {
            table: Some(foo()),
            if_conditions: vec![Condition::new(&Column::new("age"), PredicateKind::Eq, 28_i32)],
            ..Statement::default()
        };
        assert!(matches!(
            render(&stmt),
            Err(CqlError::UnknownOperation(OperationKind::None))
        ));
    }

    #[test]
    fn test_write_without_bindings_is_rejected() {
        let insert = Statement {
            table: Some(foo()),
            ..Statement::new(OperationKind::Write)
        };
        assert!(matches!(
            render(&insert),
            Err(CqlError::Binding(BindingError::EmptyAssignment { ref table })) if table == "foo"
        ));

        let counter = Statement {
            table: Some(foo().in_keyspace("ks")),
            conditions: vec![Condition::new(&Column::new("id"), PredicateKind::Eq, "x")],
            ..Statement::new(OperationKind::CounterUpdate)
        };
        assert_eq!(
            render(&counter).unwrap_err().to_string(),
            "binding error: nothing to assign in write to 'ks.foo'"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(render_truncate(&foo(), None), "TRUNCATE foo");
        assert_eq!(render_truncate(&foo(), Some("ks")), "TRUNCATE ks.foo");
        assert_eq!(
            render_truncate(&foo().in_keyspace("static"), Some("ks")),
            "TRUNCATE static.foo"
        );
    }
}
