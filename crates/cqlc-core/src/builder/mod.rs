//! Fluent statement builder
//!
//! Every statement starts from a [`StatementContext`] and moves through
//! typestate steps. Clauses that do not apply to a step are not offered, and
//! every terminal operation consumes the step it is called on.
//!
//! # Example
//!
//! ```rust
//! use cqlc_core::builder::StatementContext;
//! use cqlc_core::schema::{Table, TypedColumn};
//!
//! let id = TypedColumn::<String>::new("id").partition_key();
//! let bar = TypedColumn::<String>::new("bar");
//! let quux = TypedColumn::<i32>::new("quux");
//! let foo = Table::new("foo");
//!
//! let stmt = StatementContext::new()
//!     .upsert(&foo)
//!     .set(&bar, "baz")
//!     .set(&quux, 10)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(stmt.text(), "INSERT INTO foo (bar, quux) VALUES (?,?)");
//! ```

mod context;
mod counter;
mod delete;
pub mod expr;
mod select;
mod upsert;
pub mod value;

pub use context::{ContextOptions, StatementContext};
pub use counter::CounterBuilder;
pub use delete::DeleteBuilder;
pub use expr::{CollectionOp, ColumnBinding, Condition, Ordering, PredicateKind, TableBinding};
pub use select::{HasFrom, NoFrom, SelectBuilder};
pub use upsert::{CasBuilder, UpdateBuilder, UpsertBuilder};
pub use value::{CqlDecimal, CqlValue, CqlVarint, FromCqlValue, ToCqlValue, ValueShape};
