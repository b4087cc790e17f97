//! # cqlc-core
//!
//! A typed statement builder for CQL.
//!
//! This crate provides:
//! - Table and column descriptors whose Rust value types are checked at
//!   compile time
//! - A fluent builder using the typestate pattern
//! - A renderer and a placeholder expander that always agree on the number
//!   and order of `?` tokens
//! - A [`Session`] seam that hands rendered statements to a driver
//!
//! ## Building statements
//!
//! ```rust
//! use cqlc_core::{CqlValue, StatementContext, Table, TypedColumn};
//!
//! let id = TypedColumn::<String>::new("id").partition_key();
//! let bar = TypedColumn::<String>::new("bar");
//! let foo = Table::new("foo");
//!
//! let stmt = StatementContext::new()
//!     .select(&bar)
//!     .from(&foo)
//!     .where_clause([id.in_list(["x", "y", "z"])])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(stmt.text(), "SELECT bar FROM foo WHERE id IN (?,?,?)");
//! assert_eq!(stmt.placeholders().len(), 3);
//! assert_eq!(stmt.placeholders()[0], CqlValue::Text(String::from("x")));
//! ```
//!
//! Values are never interpolated into the statement text; they travel as
//! positional placeholders.

pub mod builder;
pub mod error;
pub mod expand;
pub mod render;
pub mod schema;
pub mod session;
pub mod statement;

pub use builder::{
    ColumnBinding, Condition, ContextOptions, CqlValue, FromCqlValue, StatementContext,
    TableBinding, ToCqlValue,
};
pub use error::{BindingError, CqlError, Result};
pub use schema::{Column, Columns, Counter, Table, TypedColumn};
pub use session::{Batch, BatchCollector, BatchKind, CasOutcome, Row, Session};
pub use statement::{BuiltStatement, OperationKind, Statement};
