//! Bound values and conversions between Rust types and SQLite storage classes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::borrow::Cow;
use std::collections::HashMap;
use thiserror::Error;

/// A value bound to a `?` placeholder or read back from a result column.
///
/// The variants mirror SQLite's storage classes.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// A free-form row destination: column name to value.
pub type ValueMap = HashMap<String, Value>;

impl Value {
    /// Whether this is the zero value of its storage class.
    ///
    /// Blank primary-key and has-default fields are bound as NULL on insert so
    /// that the engine generates them.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Integer(v) => *v == 0,
            Value::Real(v) => *v == 0.0,
            Value::Text(s) => s.is_empty(),
            Value::Blob(b) => b.is_empty(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Storage class name, used in conversion error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Real(_) => "REAL",
            Value::Text(_) => "TEXT",
            Value::Blob(_) => "BLOB",
        }
    }
}

/// Failure to convert a [`Value`] into a Rust type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValueConversionError {
    message: Cow<'static, str>,
}

impl ValueConversionError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn mismatch(expected: &'static str, got: &Value) -> Self {
        Self::new(format!("cannot convert {} to {expected}", got.type_name()))
    }
}

/// Conversion from a result column value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError>;
}

/// Conversion into a bound argument.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

// ==================== FromValue ====================

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Integer(v) => Ok(*v),
            Value::Text(text) => text
                .parse::<i64>()
                .map_err(|_| ValueConversionError::new(format!("failed to parse integer from {text:?}"))),
            Value::Null => Err(ValueConversionError::new("unexpected NULL for integer")),
            other => Err(ValueConversionError::mismatch("integer", other)),
        }
    }
}

macro_rules! from_value_narrow_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
                    let wide = <i64 as FromValue>::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| {
                        ValueConversionError::new(format!(
                            "integer {wide} out of range for {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

from_value_narrow_int!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Real(v) => Ok(*v),
            Value::Integer(v) => Ok(*v as f64),
            Value::Null => Err(ValueConversionError::new("unexpected NULL for real")),
            other => Err(ValueConversionError::mismatch("real", other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        <f64 as FromValue>::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Integer(v) => Ok(*v != 0),
            Value::Null => Err(ValueConversionError::new("unexpected NULL for boolean")),
            other => Err(ValueConversionError::mismatch("boolean", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Text(text) => Ok(text.clone()),
            Value::Integer(v) => Ok(v.to_string()),
            Value::Real(v) => Ok(v.to_string()),
            Value::Blob(bytes) => String::from_utf8(bytes.clone())
                .map_err(|_| ValueConversionError::new("blob is not valid UTF-8")),
            Value::Null => Err(ValueConversionError::new("unexpected NULL for text")),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Blob(bytes) => Ok(bytes.clone()),
            Value::Text(text) => Ok(text.as_bytes().to_vec()),
            Value::Null => Err(ValueConversionError::new("unexpected NULL for blob")),
            other => Err(ValueConversionError::mismatch("blob", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .or_else(|_| {
                    NaiveDateTime::parse_from_str(text, NAIVE_DATETIME_FORMAT)
                        .map(|naive| naive.and_utc())
                })
                .map_err(|e| ValueConversionError::new(format!("invalid timestamp {text:?}: {e}"))),
            Value::Integer(secs) => DateTime::from_timestamp(*secs, 0)
                .ok_or_else(|| ValueConversionError::new(format!("timestamp {secs} out of range"))),
            other => Err(ValueConversionError::mismatch("timestamp", other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Text(text) => NaiveDateTime::parse_from_str(text, NAIVE_DATETIME_FORMAT)
                .map_err(|e| ValueConversionError::new(format!("invalid datetime {text:?}: {e}"))),
            other => Err(ValueConversionError::mismatch("datetime", other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Text(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|e| ValueConversionError::new(format!("invalid date {text:?}: {e}"))),
            other => Err(ValueConversionError::mismatch("date", other)),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Text(text) => uuid::Uuid::parse_str(text)
                .map_err(|e| ValueConversionError::new(format!("invalid uuid {text:?}: {e}"))),
            Value::Blob(bytes) => uuid::Uuid::from_slice(bytes)
                .map_err(|e| ValueConversionError::new(format!("invalid uuid blob: {e}"))),
            other => Err(ValueConversionError::mismatch("uuid", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self, ValueConversionError> {
        match value {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Integer(v) => Ok(serde_json::Value::from(*v)),
            Value::Real(v) => Ok(serde_json::Value::from(*v)),
            Value::Text(text) => serde_json::from_str(text)
                .map_err(|e| ValueConversionError::new(format!("invalid JSON: {e}"))),
            Value::Blob(bytes) => serde_json::from_slice(bytes)
                .map_err(|e| ValueConversionError::new(format!("invalid JSON: {e}"))),
        }
    }
}

const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ==================== ToValue ====================

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

macro_rules! to_value_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }
            }
        )*
    };
}

to_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToValue for [u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl ToValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Text(self.to_rfc3339())
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Text(self.format(NAIVE_DATETIME_FORMAT).to_string())
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Text(self.format("%Y-%m-%d").to_string())
    }
}

impl ToValue for uuid::Uuid {
    fn to_value(&self) -> Value {
        Value::Text(self.hyphenated().to_string())
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        match self {
            serde_json::Value::Null => Value::Null,
            other => Value::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values() {
        assert!(Value::Null.is_blank());
        assert!(Value::Integer(0).is_blank());
        assert!(Value::Text(String::new()).is_blank());
        assert!(!Value::Integer(7).is_blank());
        assert!(!Value::Text("x".into()).is_blank());
    }

    #[test]
    fn narrow_int_out_of_range() {
        let err = i8::from_value(&Value::Integer(300)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn option_maps_null_to_none() {
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(&Value::Integer(3)).unwrap(), Some(3));
    }

    #[test]
    fn text_is_not_an_integer() {
        assert!(i64::from_value(&Value::Text("abc".into())).is_err());
        assert_eq!(i64::from_value(&Value::Text("42".into())).unwrap(), 42);
    }

    #[test]
    fn uuid_text_roundtrip() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(uuid::Uuid::from_value(&id.to_value()).unwrap(), id);
    }

    #[test]
    fn json_is_stored_as_text() {
        let v = serde_json::json!({"k": [1, 2]});
        let stored = v.to_value();
        assert!(matches!(stored, Value::Text(_)));
        assert_eq!(serde_json::Value::from_value(&stored).unwrap(), v);
    }
}
