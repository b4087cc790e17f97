//! CQL values and placeholder binding.
//!
//! Every bound value is tagged with its variant when it enters the builder,
//! so rendering and placeholder expansion never have to inspect Rust types.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An arbitrary-precision decimal in CQL wire form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CqlDecimal {
    unscaled: CqlVarint,
    scale: i32,
}

impl CqlDecimal {
    /// Creates a decimal `unscaled * 10^-scale`.
    #[must_use]
    pub const fn new(unscaled: CqlVarint, scale: i32) -> Self {
        Self { unscaled, scale }
    }

    /// Returns the unscaled value.
    #[must_use]
    pub const fn unscaled(&self) -> &CqlVarint {
        &self.unscaled
    }

    /// Returns the scale.
    #[must_use]
    pub const fn scale(&self) -> i32 {
        self.scale
    }
}

impl fmt::Display for CqlDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}E{}", self.unscaled, -i64::from(self.scale))
    }
}

/// An arbitrary-precision integer as big-endian two's complement bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CqlVarint(Vec<u8>);

impl CqlVarint {
    /// Wraps big-endian two's complement bytes.
    #[must_use]
    pub const fn from_be_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the big-endian two's complement bytes.
    #[must_use]
    pub fn as_be_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<i64> for CqlVarint {
    fn from(n: i64) -> Self {
        let bytes = n.to_be_bytes();
        // Drop redundant sign bytes, keeping at least one.
        let mut start = 0;
        while start < bytes.len() - 1 {
            let (cur, next) = (bytes[start], bytes[start + 1]);
            let redundant = (cur == 0x00 && next & 0x80 == 0) || (cur == 0xFF && next & 0x80 != 0);
            if !redundant {
                break;
            }
            start += 1;
        }
        Self(bytes[start..].to_vec())
    }
}

impl fmt::Display for CqlVarint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() <= 16 {
            let negative = self.0.first().is_some_and(|b| b & 0x80 != 0);
            let mut n: i128 = if negative { -1 } else { 0 };
            for byte in &self.0 {
                n = (n << 8) | i128::from(*byte);
            }
            write!(f, "{n}")
        } else {
            f.write_str("0x")?;
            for byte in &self.0 {
                write!(f, "{byte:02x}")?;
            }
            Ok(())
        }
    }
}

/// Coarse shape of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    /// A single scalar.
    Scalar,
    /// A fixed-width 128-bit identifier.
    FixedIdentifier,
    /// An ordered sequence.
    Sequence,
    /// A string-keyed string-valued mapping.
    Mapping,
}

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum CqlValue {
    /// NULL value.
    Null,
    /// `text` / `ascii` / `varchar`
    Text(String),
    /// `int`
    Int(i32),
    /// `bigint`
    BigInt(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `timestamp`
    Timestamp(DateTime<Utc>),
    /// `uuid` / `timeuuid`
    Uuid(Uuid),
    /// `boolean`
    Boolean(bool),
    /// `blob`
    Blob(Vec<u8>),
    /// `decimal`
    Decimal(CqlDecimal),
    /// `varint`
    Varint(CqlVarint),
    /// `list<T>` / `set<T>`, also the operand of `IN`.
    List(Vec<CqlValue>),
    /// `map<text, text>`
    Map(BTreeMap<String, String>),
}

impl CqlValue {
    /// Returns the shape used by placeholder expansion.
    #[must_use]
    pub const fn shape(&self) -> ValueShape {
        match self {
            Self::Uuid(_) => ValueShape::FixedIdentifier,
            Self::List(_) => ValueShape::Sequence,
            Self::Map(_) => ValueShape::Mapping,
            _ => ValueShape::Scalar,
        }
    }

    /// Returns the CQL type name of the value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Int(_) => "int",
            Self::BigInt(_) => "bigint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Timestamp(_) => "timestamp",
            Self::Uuid(_) => "uuid",
            Self::Boolean(_) => "boolean",
            Self::Blob(_) => "blob",
            Self::Decimal(_) => "decimal",
            Self::Varint(_) => "varint",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns the CQL literal representation of the value.
    ///
    /// **Warning**: only meant for logging. Statements are always executed
    /// with placeholders.
    #[must_use]
    pub fn to_cql_literal(&self) -> String {
        match self {
            Self::Null => String::from("null"),
            Self::Text(s) => {
                // Escape single quotes by doubling them
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Int(n) => n.to_string(),
            Self::BigInt(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Double(n) => n.to_string(),
            Self::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            Self::Uuid(id) => id.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
                format!("0x{hex}")
            }
            Self::Decimal(d) => d.to_string(),
            Self::Varint(v) => v.to_string(),
            Self::List(items) => {
                let items: Vec<String> = items.iter().map(Self::to_cql_literal).collect();
                format!("[{}]", items.join(", "))
            }
            Self::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}: {}",
                            Self::Text(k.clone()).to_cql_literal(),
                            Self::Text(v.clone()).to_cql_literal()
                        )
                    })
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

impl fmt::Display for CqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cql_literal())
    }
}

/// Trait for types that can be converted to CQL values.
pub trait ToCqlValue {
    /// Converts the value to a `CqlValue`.
    fn to_cql_value(self) -> CqlValue;
}

impl ToCqlValue for CqlValue {
    fn to_cql_value(self) -> CqlValue {
        self
    }
}

macro_rules! impl_to_cql_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ToCqlValue for $ty {
                fn to_cql_value(self) -> CqlValue {
                    CqlValue::$variant(self)
                }
            }
        )+
    };
}

impl_to_cql_value!(
    String => Text,
    i32 => Int,
    i64 => BigInt,
    f32 => Float,
    f64 => Double,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
    bool => Boolean,
    Vec<u8> => Blob,
    CqlDecimal => Decimal,
    CqlVarint => Varint,
    BTreeMap<String, String> => Map,
);

impl ToCqlValue for &str {
    fn to_cql_value(self) -> CqlValue {
        CqlValue::Text(String::from(self))
    }
}

impl ToCqlValue for &[u8] {
    fn to_cql_value(self) -> CqlValue {
        CqlValue::Blob(self.to_vec())
    }
}

impl ToCqlValue for HashMap<String, String> {
    fn to_cql_value(self) -> CqlValue {
        CqlValue::Map(self.into_iter().collect())
    }
}

impl<T: ToCqlValue> ToCqlValue for Option<T> {
    fn to_cql_value(self) -> CqlValue {
        match self {
            Some(v) => v.to_cql_value(),
            None => CqlValue::Null,
        }
    }
}

macro_rules! impl_to_cql_collection {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToCqlValue for Vec<$ty> {
                fn to_cql_value(self) -> CqlValue {
                    CqlValue::List(self.into_iter().map(ToCqlValue::to_cql_value).collect())
                }
            }

            impl ToCqlValue for BTreeSet<$ty> {
                fn to_cql_value(self) -> CqlValue {
                    CqlValue::List(self.into_iter().map(ToCqlValue::to_cql_value).collect())
                }
            }
        )+
    };
}

impl_to_cql_collection!(String, i32, i64, f64, bool, Uuid, DateTime<Utc>);

/// Trait for types that can be read back from fetched CQL values.
pub trait FromCqlValue: Sized {
    /// Converts the value, returning `None` on a type mismatch.
    fn from_cql_value(value: &CqlValue) -> Option<Self>;
}

macro_rules! impl_from_cql_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl FromCqlValue for $ty {
                fn from_cql_value(value: &CqlValue) -> Option<Self> {
                    match value {
                        CqlValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_from_cql_value!(
    String => Text,
    i32 => Int,
    f32 => Float,
    f64 => Double,
    DateTime<Utc> => Timestamp,
    Uuid => Uuid,
    bool => Boolean,
    Vec<u8> => Blob,
    CqlDecimal => Decimal,
    CqlVarint => Varint,
    BTreeMap<String, String> => Map,
);

// Counter columns come back as bigint.
impl FromCqlValue for i64 {
    fn from_cql_value(value: &CqlValue) -> Option<Self> {
        match value {
            CqlValue::BigInt(v) => Some(*v),
            CqlValue::Int(v) => Some(Self::from(*v)),
            _ => None,
        }
    }
}

impl<T: FromCqlValue> FromCqlValue for Option<T> {
    fn from_cql_value(value: &CqlValue) -> Option<Self> {
        match value {
            CqlValue::Null => Some(None),
            other => T::from_cql_value(other).map(Some),
        }
    }
}

macro_rules! impl_from_cql_collection {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromCqlValue for Vec<$ty> {
                fn from_cql_value(value: &CqlValue) -> Option<Self> {
                    match value {
                        CqlValue::List(items) => items.iter().map(<$ty>::from_cql_value).collect(),
                        _ => None,
                    }
                }
            }

            impl FromCqlValue for BTreeSet<$ty> {
                fn from_cql_value(value: &CqlValue) -> Option<Self> {
                    match value {
                        CqlValue::List(items) => items.iter().map(<$ty>::from_cql_value).collect(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_from_cql_collection!(String, i32, i64, bool, Uuid, DateTime<Utc>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes() {
        assert_eq!(CqlValue::Text(String::from("x")).shape(), ValueShape::Scalar);
        assert_eq!(CqlValue::Uuid(Uuid::nil()).shape(), ValueShape::FixedIdentifier);
        assert_eq!(CqlValue::List(vec![]).shape(), ValueShape::Sequence);
        assert_eq!(CqlValue::Map(BTreeMap::new()).shape(), ValueShape::Mapping);
        assert_eq!(CqlValue::Null.shape(), ValueShape::Scalar);
    }

    #[test]
    fn test_literal_text_escaping() {
        assert_eq!(
            CqlValue::Text(String::from("O'Brien")).to_cql_literal(),
            "'O''Brien'"
        );
    }

    #[test]
    fn test_literal_collections() {
        let list = vec![1_i32, 2, 3].to_cql_value();
        assert_eq!(list.to_cql_literal(), "[1, 2, 3]");

        let mut map = BTreeMap::new();
        map.insert(String::from("k1"), String::from("v2"));
        assert_eq!(map.to_cql_value().to_cql_literal(), "{'k1': 'v2'}");
    }

    #[test]
    fn test_literal_blob() {
        assert_eq!(
            CqlValue::Blob(vec![0xCA, 0xFE]).to_cql_literal(),
            "0xcafe"
        );
    }

    #[test]
    fn test_varint_from_i64() {
        assert_eq!(CqlVarint::from(0).as_be_bytes(), &[0x00]);
        assert_eq!(CqlVarint::from(127).as_be_bytes(), &[0x7F]);
        assert_eq!(CqlVarint::from(128).as_be_bytes(), &[0x00, 0x80]);
        assert_eq!(CqlVarint::from(-1).as_be_bytes(), &[0xFF]);
        assert_eq!(CqlVarint::from(-129).as_be_bytes(), &[0xFF, 0x7F]);
        assert_eq!(CqlVarint::from(-129).to_string(), "-129");
        assert_eq!(CqlVarint::from(65_536).to_string(), "65536");
    }

    #[test]
    fn test_decimal_display() {
        let d = CqlDecimal::new(CqlVarint::from(12_345), 2);
        assert_eq!(d.to_string(), "12345E-2");
    }

    #[test]
    fn test_decimal_display_extreme_scale() {
        let d = CqlDecimal::new(CqlVarint::from(1), i32::MIN);
        assert_eq!(d.to_string(), "1E2147483648");
        assert_eq!(
            CqlValue::Decimal(CqlDecimal::new(CqlVarint::from(-7), i32::MAX)).to_cql_literal(),
            "-7E-2147483647"
        );
    }

    #[test]
    fn test_to_cql_value_conversions() {
        assert_eq!(true.to_cql_value(), CqlValue::Boolean(true));
        assert_eq!(42_i32.to_cql_value(), CqlValue::Int(42));
        assert_eq!(42_i64.to_cql_value(), CqlValue::BigInt(42));
        assert_eq!("hello".to_cql_value(), CqlValue::Text(String::from("hello")));
        assert_eq!(None::<i32>.to_cql_value(), CqlValue::Null);
        assert_eq!(
            vec![0x01_u8, 0x02].to_cql_value(),
            CqlValue::Blob(vec![0x01, 0x02])
        );
    }

    #[test]
    fn test_from_cql_value() {
        assert_eq!(i64::from_cql_value(&CqlValue::BigInt(7)), Some(7));
        assert_eq!(i64::from_cql_value(&CqlValue::Int(7)), Some(7));
        assert_eq!(String::from_cql_value(&CqlValue::Int(7)), None);
        assert_eq!(Option::<i32>::from_cql_value(&CqlValue::Null), Some(None));
        assert_eq!(
            Vec::<i32>::from_cql_value(&CqlValue::List(vec![CqlValue::Int(1), CqlValue::Int(2)])),
            Some(vec![1, 2])
        );
    }
}
