//! Table and column descriptors.
//!
//! Descriptors are normally produced by schema introspection or code
//! generation outside this crate. They carry just enough information for the
//! builder to render statements: names, an optional keyspace, and the
//! capability tags of each column.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::builder::value::{CqlDecimal, CqlVarint};

/// Shape of a collection column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// `list<T>`
    List,
    /// `set<T>`
    Set,
    /// `map<K, V>`
    Map,
}

impl CollectionKind {
    /// Returns the CQL name of the collection shape.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
        }
    }
}

/// Capability tags of a column.
///
/// The builder reads `partitioned`, `counter` and `collection`. The key and
/// index tags are carried for callers and the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ColumnTags {
    /// Part of the partition key.
    pub partitioned: bool,
    /// Part of the clustering key.
    pub clustered: bool,
    /// Last component of its key, the only one that accepts `IN`.
    pub last_component: bool,
    /// Covered by a secondary index.
    pub secondary_indexed: bool,
    /// Counter column, increment only.
    pub counter: bool,
    /// Collection shape, if any.
    pub collection: Option<CollectionKind>,
}

/// A column descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    name: String,
    tags: ColumnTags,
}

impl Column {
    /// Creates an untagged column descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: ColumnTags::default(),
        }
    }

    /// Creates a column descriptor with explicit tags.
    #[must_use]
    pub fn with_tags(name: impl Into<String>, tags: ColumnTags) -> Self {
        Self {
            name: name.into(),
            tags,
        }
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the capability tags.
    #[must_use]
    pub const fn tags(&self) -> &ColumnTags {
        &self.tags
    }

    /// Returns the collection shape, if the column is a collection.
    #[must_use]
    pub const fn collection(&self) -> Option<CollectionKind> {
        self.tags.collection
    }

    /// Returns true for counter columns.
    #[must_use]
    pub const fn is_counter(&self) -> bool {
        self.tags.counter
    }

    /// Returns true for partition key columns.
    #[must_use]
    pub const fn is_partitioned(&self) -> bool {
        self.tags.partitioned
    }
}

/// A table descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    keyspace: Option<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table descriptor without a keyspace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyspace: None,
            columns: vec![],
        }
    }

    /// Pins the table to a keyspace.
    ///
    /// A table-static keyspace takes precedence over the keyspace configured
    /// on a [`StatementContext`](crate::StatementContext).
    #[must_use]
    pub fn in_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    /// Appends a column to the table definition.
    #[must_use]
    pub fn column(mut self, col: &impl ColumnRef) -> Self {
        self.columns.push(col.column().clone());
        self
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the table-static keyspace.
    #[must_use]
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    /// Returns the declared columns in definition order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns true if any declared column is a counter.
    #[must_use]
    pub fn is_counter_table(&self) -> bool {
        self.columns.iter().any(Column::is_counter)
    }
}

/// Anything that refers to a column descriptor.
pub trait ColumnRef {
    /// Returns the underlying descriptor.
    fn column(&self) -> &Column;
}

impl ColumnRef for Column {
    fn column(&self) -> &Column {
        self
    }
}

impl<T: ColumnRef + ?Sized> ColumnRef for &T {
    fn column(&self) -> &Column {
        (**self).column()
    }
}

/// Marker for counter columns.
///
/// A `TypedColumn<Counter>` accepts only signed increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter;

/// Rust types that can back a typed column.
pub trait ColumnType {
    /// Collection shape implied by the type.
    const COLLECTION: Option<CollectionKind> = None;
    /// Whether the type denotes a counter.
    const COUNTER: bool = false;
}

macro_rules! impl_scalar_column_type {
    ($($ty:ty),+ $(,)?) => {
        $(impl ColumnType for $ty {})+
    };
}

impl_scalar_column_type!(
    String,
    i32,
    i64,
    f32,
    f64,
    bool,
    Uuid,
    DateTime<Utc>,
    Vec<u8>,
    CqlDecimal,
    CqlVarint,
);

impl ColumnType for Counter {
    const COUNTER: bool = true;
}

macro_rules! impl_collection_column_type {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ColumnType for Vec<$ty> {
                const COLLECTION: Option<CollectionKind> = Some(CollectionKind::List);
            }

            impl ColumnType for BTreeSet<$ty> {
                const COLLECTION: Option<CollectionKind> = Some(CollectionKind::Set);
            }
        )+
    };
}

impl_collection_column_type!(String, i32, i64, f64, bool, Uuid, DateTime<Utc>);

impl ColumnType for BTreeMap<String, String> {
    const COLLECTION: Option<CollectionKind> = Some(CollectionKind::Map);
}

impl ColumnType for HashMap<String, String> {
    const COLLECTION: Option<CollectionKind> = Some(CollectionKind::Map);
}

/// A column descriptor tied to the Rust type of its values.
///
/// Predicates, setters and orderings are only offered with values of type
/// `T`, so binding a string to an integer column does not compile.
#[derive(Debug)]
pub struct TypedColumn<T> {
    column: Column,
    _type: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedColumn<T> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            _type: PhantomData,
        }
    }
}

impl<T: ColumnType> TypedColumn<T> {
    /// Creates a typed column. Collection and counter tags follow from `T`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let tags = ColumnTags {
            counter: T::COUNTER,
            collection: T::COLLECTION,
            ..ColumnTags::default()
        };
        Self {
            column: Column::with_tags(name, tags),
            _type: PhantomData,
        }
    }
}

impl<T> TypedColumn<T> {
    /// Tags the column as part of the partition key.
    #[must_use]
    pub fn partition_key(mut self) -> Self {
        self.column.tags.partitioned = true;
        self
    }

    /// Tags the column as part of the clustering key.
    #[must_use]
    pub fn clustering_key(mut self) -> Self {
        self.column.tags.clustered = true;
        self
    }

    /// Tags the column as the last component of its key.
    #[must_use]
    pub fn last_component(mut self) -> Self {
        self.column.tags.last_component = true;
        self
    }

    /// Tags the column as covered by a secondary index.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.column.tags.secondary_indexed = true;
        self
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.column.name()
    }
}

impl<T> ColumnRef for TypedColumn<T> {
    fn column(&self) -> &Column {
        &self.column
    }
}

/// A selection of columns.
///
/// Implemented for `()` (no explicit columns), single column references,
/// tuples of column references, and slices or vectors of descriptors.
pub trait Columns {
    /// Returns the selected descriptors in order.
    fn into_columns(self) -> Vec<Column>;
}

impl Columns for () {
    fn into_columns(self) -> Vec<Column> {
        vec![]
    }
}

impl Columns for Vec<Column> {
    fn into_columns(self) -> Vec<Column> {
        self
    }
}

impl Columns for &[Column] {
    fn into_columns(self) -> Vec<Column> {
        self.to_vec()
    }
}

impl Columns for &Column {
    fn into_columns(self) -> Vec<Column> {
        vec![self.clone()]
    }
}

impl<T> Columns for &TypedColumn<T> {
    fn into_columns(self) -> Vec<Column> {
        vec![self.column.clone()]
    }
}

macro_rules! impl_columns_tuple {
    ($($name:ident),+) => {
        impl<$($name: ColumnRef),+> Columns for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_columns(self) -> Vec<Column> {
                let ($($name,)+) = self;
                vec![$($name.column().clone()),+]
            }
        }
    };
}

impl_columns_tuple!(C0);
impl_columns_tuple!(C0, C1);
impl_columns_tuple!(C0, C1, C2);
impl_columns_tuple!(C0, C1, C2, C3);
impl_columns_tuple!(C0, C1, C2, C3, C4);
impl_columns_tuple!(C0, C1, C2, C3, C4, C5);
impl_columns_tuple!(C0, C1, C2, C3, C4, C5, C6);
impl_columns_tuple!(C0, C1, C2, C3, C4, C5, C6, C7);
impl_columns_tuple!(C0, C1, C2, C3, C4, C5, C6, C7, C8);
impl_columns_tuple!(C0, C1, C2, C3, C4, C5, C6, C7, C8, C9);
impl_columns_tuple!(C0, C1, C2, C3, C4, C5, C6, C7, C8, C9, C10);
impl_columns_tuple!(C0, C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11);
