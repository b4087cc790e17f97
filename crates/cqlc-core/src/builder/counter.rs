//! Counter update steps.

use crate::schema::{Counter, TypedColumn};

use super::context::{impl_executable, Draft};
use super::expr::{ColumnBinding, Condition};

/// A counter `UPDATE` under construction.
///
/// Every binding renders as `col = col + ?`; decrements are negative deltas.
pub struct CounterBuilder {
    draft: Draft,
}

impl CounterBuilder {
    pub(crate) const fn new(draft: Draft) -> Self {
        Self { draft }
    }

    /// Adds `delta` to a counter column.
    #[must_use]
    pub fn increment(mut self, col: &TypedColumn<Counter>, delta: i64) -> Self {
        self.draft.stmt.bindings.push(ColumnBinding::new(col, delta));
        self
    }

    /// Adds the conditions identifying the counter row.
    #[must_use]
    pub fn having(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.draft.stmt.conditions.extend(conditions);
        self
    }
}

impl_executable!(CounterBuilder);

#[cfg(test)]
mod tests {
    use crate::builder::expr::TableBinding;
    use crate::builder::value::CqlValue;
    use crate::schema::{Counter, Table, TypedColumn};
    use crate::StatementContext;

    #[test]
    fn test_negative_delta_keeps_plus_operator() {
        let id = TypedColumn::<String>::new("id").partition_key();
        let hits = TypedColumn::<Counter>::new("hits");
        let stmt = StatementContext::new()
            .update_counter(&Table::new("counters"))
            .increment(&hits, -3)
            .having([id.eq("page")])
            .build()
            .unwrap();
        assert_eq!(stmt.text(), "UPDATE counters SET hits = hits + ? WHERE id = ?");
        assert_eq!(
            stmt.placeholders(),
            &[CqlValue::BigInt(-3), CqlValue::Text(String::from("page"))]
        );
    }

    #[test]
    fn test_add_splits_counters_from_keys() {
        let id = TypedColumn::<String>::new("id").partition_key();
        let hits = TypedColumn::<Counter>::new("hits");
        let misses = TypedColumn::<Counter>::new("misses");
        let table = Table::new("counters").column(&id).column(&hits).column(&misses);
        let binding = TableBinding::new(&table)
            .with(&id, "page")
            .with_counter(&hits, 2)
            .with_counter(&misses, 1);
        let stmt = StatementContext::new().add(binding).build().unwrap();
        assert_eq!(
            stmt.text(),
            "UPDATE counters SET hits = hits + ?, misses = misses + ? WHERE id = ?"
        );
        assert_eq!(
            stmt.placeholders(),
            &[
                CqlValue::BigInt(2),
                CqlValue::BigInt(1),
                CqlValue::Text(String::from("page")),
            ]
        );
    }
}
