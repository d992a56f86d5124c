//! SQL values and bind parameters.
//!
//! Values supplied by callers never reach SQL text directly: the generator
//! turns every [`SqlValue`] into a [`BindValue`] and emits a placeholder in
//! its place. The only inline rendering is [`escape_string`], used for schema
//! literals (defaults, enum checks, catalog lookups).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A SQL value that can be used as a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Date without time.
    Date(NaiveDate),
    /// Date and time.
    DateTime(NaiveDateTime),
    /// Time of day.
    Time(NaiveTime),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the wire type a driver would infer for this value when no
    /// column definition is known.
    #[must_use]
    pub const fn inferred_wire_type(&self) -> WireType {
        match self {
            Self::Null => WireType::Null,
            Self::Bool(_) => WireType::Bool,
            Self::Int(_) => WireType::BigInt,
            Self::Float(_) => WireType::Double,
            Self::Text(_) => WireType::Text,
            Self::Blob(_) => WireType::Binary,
            Self::Date(_) => WireType::Date,
            Self::DateTime(_) => WireType::DateTime,
            Self::Time(_) => WireType::Time,
        }
    }
}

/// Escapes a string as a single-quoted SQL literal.
///
/// Single quotes are doubled; this is the only place text is spliced into SQL.
#[must_use]
pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// The driver-level type of a bind parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireType {
    /// Untyped NULL.
    Null,
    /// Native boolean.
    Bool,
    /// Single bit (SQL Server `BIT`).
    Bit,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    BigInt,
    /// Single-precision float.
    Real,
    /// Double-precision float.
    Double,
    /// Exact numeric.
    Decimal,
    /// Single-byte character data.
    VarChar,
    /// Unicode character data.
    NVarChar,
    /// Unbounded text.
    Text,
    /// Binary data.
    Binary,
    /// Calendar date.
    Date,
    /// Date and time.
    DateTime,
    /// Time of day.
    Time,
    /// Native UUID.
    Uuid,
}

/// Direction of a bind parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BindDirection {
    /// Value sent to the server.
    #[default]
    In,
    /// Value written by the statement (PL/SQL OUT binds).
    Out,
}

/// A bind parameter: the value plus the type it travels as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindValue {
    /// The value.
    pub value: SqlValue,
    /// Wire type.
    pub wire: WireType,
    /// Direction.
    #[serde(default)]
    pub direction: BindDirection,
}

impl BindValue {
    /// Creates an input bind.
    #[must_use]
    pub const fn new(value: SqlValue, wire: WireType) -> Self {
        Self {
            value,
            wire,
            direction: BindDirection::In,
        }
    }

    /// Creates an output bind of the given type.
    #[must_use]
    pub const fn output(wire: WireType) -> Self {
        Self {
            value: SqlValue::Null,
            wire,
            direction: BindDirection::Out,
        }
    }

    /// Creates an input bind whose wire type is inferred from the value.
    #[must_use]
    pub fn inferred(value: SqlValue) -> Self {
        let wire = value.inferred_wire_type();
        Self::new(value, wire)
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Date(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self)
    }
}

impl ToSqlValue for NaiveTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Time(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "'hello'");
        assert_eq!(escape_string("O'Brien"), "'O''Brien'");
        assert_eq!(
            escape_string("'; DROP TABLE users; --"),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!("hello".to_sql_value(), SqlValue::Text(String::from("hello")));
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }

    #[test]
    fn test_inferred_bind() {
        let bind = BindValue::inferred(SqlValue::Text("a".into()));
        assert_eq!(bind.wire, WireType::Text);
        assert_eq!(bind.direction, BindDirection::In);

        let out = BindValue::output(WireType::Int);
        assert_eq!(out.direction, BindDirection::Out);
        assert!(out.value.is_null());
    }
}
