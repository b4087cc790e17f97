#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use cqlc_core::{BuiltStatement, Counter, CqlValue, Row, Session, Table, TypedColumn};

/// Typed columns of the `foo` fixture table.
pub struct Foo {
    pub table: Table,
    pub id: TypedColumn<String>,
    pub bar: TypedColumn<String>,
    pub quux: TypedColumn<i32>,
    pub age: TypedColumn<i32>,
    pub ts: TypedColumn<i64>,
    pub tags: TypedColumn<Vec<String>>,
    pub m: TypedColumn<BTreeMap<String, String>>,
}

pub fn foo() -> Foo {
    let id = TypedColumn::<String>::new("id").partition_key();
    let bar = TypedColumn::<String>::new("bar");
    let quux = TypedColumn::<i32>::new("quux");
    let age = TypedColumn::<i32>::new("age");
    let ts = TypedColumn::<i64>::new("ts").clustering_key().last_component();
    let tags = TypedColumn::<Vec<String>>::new("tags");
    let m = TypedColumn::<BTreeMap<String, String>>::new("m");
    let table = Table::new("foo")
        .column(&id)
        .column(&bar)
        .column(&quux)
        .column(&age)
        .column(&ts)
        .column(&tags)
        .column(&m);
    Foo {
        table,
        id,
        bar,
        quux,
        age,
        ts,
        tags,
        m,
    }
}

/// Typed columns of the `page_views` counter table.
pub struct PageViews {
    pub table: Table,
    pub page: TypedColumn<String>,
    pub hits: TypedColumn<Counter>,
}

pub fn page_views() -> PageViews {
    let page = TypedColumn::<String>::new("page").partition_key();
    let hits = TypedColumn::<Counter>::new("hits");
    let table = Table::new("page_views").column(&page).column(&hits);
    PageViews { table, page, hits }
}

pub fn text(s: &str) -> CqlValue {
    CqlValue::Text(String::from(s))
}

pub fn row(columns: &[(&str, CqlValue)]) -> Row {
    Row::new(
        columns
            .iter()
            .map(|(name, value)| (String::from(*name), value.clone()))
            .collect(),
    )
}

#[derive(Debug, thiserror::Error)]
#[error("driver unavailable")]
pub struct DriverError;

/// In-memory session that records every statement it receives.
#[derive(Default)]
pub struct RecordingSession {
    pub executed: Mutex<Vec<BuiltStatement>>,
    pub rows: Vec<Row>,
    pub cas_result: Option<(bool, Row)>,
    pub fail: bool,
}

impl RecordingSession {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_cas_result(applied: bool, existing: Row) -> Self {
        Self {
            cas_result: Some((applied, existing)),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn executed(&self) -> Vec<BuiltStatement> {
        self.executed.lock().unwrap().clone()
    }

    fn record(&self, stmt: &BuiltStatement) -> Result<(), DriverError> {
        if self.fail {
            return Err(DriverError);
        }
        self.executed.lock().unwrap().push(stmt.clone());
        Ok(())
    }
}

impl Session for RecordingSession {
    type Error = DriverError;

    async fn execute(&self, stmt: &BuiltStatement) -> Result<(), DriverError> {
        self.record(stmt)
    }

    async fn query(&self, stmt: &BuiltStatement) -> Result<Vec<Row>, DriverError> {
        self.record(stmt)?;
        Ok(self.rows.clone())
    }

    async fn execute_cas(&self, stmt: &BuiltStatement) -> Result<(bool, Row), DriverError> {
        self.record(stmt)?;
        Ok(self.cas_result.clone().unwrap_or((true, Row::default())))
    }
}
