//! Placeholder expansion.
//!
//! Flattens the bound values of a statement into the positional list that
//! matches the `?` tokens produced by [`render`](crate::render::render):
//! SET bindings first, then WHERE conditions, then IF conditions.

use crate::builder::expr::{CollectionOp, ColumnBinding, Condition, PredicateKind};
use crate::builder::value::{CqlValue, ValueShape};
use crate::error::{BindingError, CqlError, Result};
use crate::schema::CollectionKind;
use crate::statement::{OperationKind, Statement};

/// Expands the statement's bound values into placeholders.
///
/// # Errors
///
/// Returns [`CqlError::UnknownOperation`] when no operation is set, a binding
/// error when a value cannot be bound in its position, and
/// [`CqlError::UnsupportedIfClause`] for IF conditions outside of a delete.
pub fn expand(stmt: &Statement) -> Result<Vec<CqlValue>> {
    if stmt.operation == OperationKind::None {
        return Err(CqlError::UnknownOperation(stmt.operation));
    }
    if !stmt.if_conditions.is_empty() && stmt.operation != OperationKind::Delete {
        return Err(CqlError::UnsupportedIfClause(stmt.operation));
    }

    let mut placeholders = Vec::new();

    // Read and delete statements have no SET clause.
    if matches!(stmt.operation, OperationKind::Write | OperationKind::CounterUpdate) {
        let counter = stmt.operation == OperationKind::CounterUpdate;
        for binding in &stmt.bindings {
            expand_binding(binding, counter, &mut placeholders)?;
        }
    }

    for cond in stmt.conditions.iter().chain(&stmt.if_conditions) {
        expand_condition(cond, &mut placeholders)?;
    }

    Ok(placeholders)
}

/// Returns the number of placeholders an `IN` condition expands to.
pub(crate) fn in_cardinality(cond: &Condition) -> Result<usize> {
    match cond.value() {
        CqlValue::List(items) => Ok(items.len()),
        other => Err(cannot_bind(other).into()),
    }
}

fn cannot_bind(value: &CqlValue) -> BindingError {
    BindingError::CannotBindComponent {
        value: value.to_cql_literal(),
        kind: value.kind(),
    }
}

fn expand_binding(binding: &ColumnBinding, counter: bool, out: &mut Vec<CqlValue>) -> Result<()> {
    if counter {
        out.push(binding.value.clone());
        return Ok(());
    }

    let Some(op) = binding.op else {
        out.push(binding.value.clone());
        return Ok(());
    };

    check_collection_binding(binding, op)?;

    if op == CollectionOp::SetByKey {
        if let CqlValue::Map(entries) = &binding.value {
            for (key, value) in entries {
                out.push(CqlValue::Text(key.clone()));
                out.push(CqlValue::Text(value.clone()));
            }
        }
    } else {
        out.push(binding.value.clone());
    }
    Ok(())
}

/// Checks that a collection operation fits both the column and the value.
fn check_collection_binding(binding: &ColumnBinding, op: CollectionOp) -> Result<()> {
    let shape_error = |expected: &'static str, found: String| BindingError::CollectionShape {
        column: binding.column.name().to_string(),
        operation: op.as_str(),
        expected,
        found,
    };

    let column_ok = match (op, binding.column.collection()) {
        (CollectionOp::Append | CollectionOp::RemoveByValue, Some(kind)) => {
            kind != CollectionKind::Map
        }
        (CollectionOp::Prepend, Some(kind)) => kind == CollectionKind::List,
        (CollectionOp::RemoveByKey | CollectionOp::SetByKey, Some(kind)) => {
            kind == CollectionKind::Map
        }
        (_, None) => false,
    };
    if !column_ok {
        let expected = match op {
            CollectionOp::Append | CollectionOp::RemoveByValue => "a list or set column",
            CollectionOp::Prepend => "a list column",
            CollectionOp::RemoveByKey | CollectionOp::SetByKey => "a map column",
        };
        let found = binding
            .column
            .collection()
            .map_or_else(|| String::from("a non-collection column"), |k| format!("a {} column", k.as_str()));
        return Err(shape_error(expected, found).into());
    }

    let value_ok = match (op, &binding.value) {
        (CollectionOp::SetByKey, CqlValue::Map(entries)) => entries.len() == 1,
        (CollectionOp::SetByKey, _) => false,
        (_, value) => value.shape() == ValueShape::Sequence,
    };
    if !value_ok {
        let expected = if op == CollectionOp::SetByKey {
            "a single key/value pair"
        } else {
            "a sequence of elements"
        };
        let found = match &binding.value {
            CqlValue::Map(entries) => format!("a map with {} entries", entries.len()),
            other => format!("a {} value", other.kind()),
        };
        return Err(shape_error(expected, found).into());
    }
    Ok(())
}

fn expand_condition(cond: &Condition, out: &mut Vec<CqlValue>) -> Result<()> {
    let value = cond.value();

    if cond.predicate == PredicateKind::In {
        let CqlValue::List(items) = value else {
            return Err(cannot_bind(value).into());
        };
        for item in items {
            match item.shape() {
                ValueShape::Scalar | ValueShape::FixedIdentifier => out.push(item.clone()),
                ValueShape::Sequence | ValueShape::Mapping => return Err(cannot_bind(item).into()),
            }
        }
        return Ok(());
    }

    match value.shape() {
        ValueShape::Scalar | ValueShape::FixedIdentifier | ValueShape::Sequence => {
            out.push(value.clone());
            Ok(())
        }
        ValueShape::Mapping => Err(cannot_bind(value).into()),
    }
}
