//! Dynamic field values and fallible typed extraction.
//!
//! Every field read from a driver cursor is normalized into a [`Value`]
//! during materialization. Callers extract static types through
//! [`FromValue`], which fails with `AccessError::Cast` instead of
//! truncating or substituting a default.

use bytes::Bytes;

use crate::error::AccessError;

/// A single field value inside a materialized row.
///
/// Database NULLs are represented as `Value::Null`; driver-specific null
/// sentinels never appear here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// BOOLEAN.
    Bool(bool),
    /// Any integer type, widened to 64 bits by the driver.
    Int(i64),
    /// Any floating-point type, widened to 64 bits by the driver.
    Float(f64),
    /// Character data.
    Text(String),
    /// Binary data.
    Bytes(Bytes),
}

impl Value {
    /// SQL-ish name of the stored type, used in cast error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOLEAN",
            Value::Int(_) => "BIGINT",
            Value::Float(_) => "DOUBLE",
            Value::Text(_) => "TEXT",
            Value::Bytes(_) => "BINARY",
        }
    }

    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// Fallible conversion from a dynamic [`Value`] to a static type.
///
/// Integer conversions are range-checked: a stored `BIGINT` that does not
/// fit the requested width is a cast error, never a silent truncation.
/// `Option<T>` lifts SQL NULL to `None`; any non-`Option` target fails on
/// NULL.
pub trait FromValue: Sized {
    /// Convert a borrowed value, failing with `AccessError::Cast` when the
    /// stored type or range does not match.
    fn from_value(value: &Value) -> Result<Self, AccessError>;
}

fn cast_error(value: &Value, to: &'static str) -> AccessError {
    AccessError::Cast {
        from: value.type_name(),
        to,
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(cast_error(other, "bool")),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Int(i) => Ok(*i),
            other => Err(cast_error(other, "i64")),
        }
    }
}

macro_rules! int_from_value {
    ($($ty:ty),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, AccessError> {
                    match value {
                        Value::Int(i) => <$ty>::try_from(*i)
                            .map_err(|_| cast_error(value, stringify!($ty))),
                        other => Err(cast_error(other, stringify!($ty))),
                    }
                }
            }
        )+
    };
}

int_from_value!(i8, i16, i32, u8, u16, u32, u64);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Float(f) => Ok(*f),
            other => Err(cast_error(other, "f64")),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            // Narrowing a DOUBLE rounds; floats carry no exactness contract.
            Value::Float(f) => Ok(*f as f32),
            other => Err(cast_error(other, "f32")),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(cast_error(other, "String")),
        }
    }
}

impl FromValue for Bytes {
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(cast_error(other, "Bytes")),
        }
    }
}

impl<T> FromValue for Option<T>
where
    T: FromValue,
{
    fn from_value(value: &Value) -> Result<Self, AccessError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_extraction() {
        assert_eq!(i64::from_value(&Value::Int(42)).unwrap(), 42);
        assert_eq!(i32::from_value(&Value::Int(42)).unwrap(), 42);
        assert_eq!(u8::from_value(&Value::Int(200)).unwrap(), 200);
    }

    #[test]
    fn test_int_extraction_out_of_range() {
        // 300 does not fit u8; must be a cast error, not a truncation to 44
        let err = u8::from_value(&Value::Int(300)).unwrap_err();
        assert!(matches!(err, AccessError::Cast { to: "u8", .. }));
    }

    #[test]
    fn test_negative_int_to_unsigned_fails() {
        let err = u64::from_value(&Value::Int(-1)).unwrap_err();
        assert!(matches!(err, AccessError::Cast { to: "u64", .. }));
    }

    #[test]
    fn test_text_to_int_fails() {
        let err = i64::from_value(&Value::Text("42".into())).unwrap_err();
        assert!(matches!(
            err,
            AccessError::Cast {
                from: "TEXT",
                to: "i64",
            }
        ));
    }

    #[test]
    fn test_float_extraction() {
        assert_eq!(f64::from_value(&Value::Float(1.5)).unwrap(), 1.5);
        assert_eq!(f32::from_value(&Value::Float(1.5)).unwrap(), 1.5f32);
    }

    #[test]
    fn test_int_to_float_fails() {
        // No implicit BIGINT -> DOUBLE widening; i64 above 2^53 would lose digits
        assert!(f64::from_value(&Value::Int(7)).is_err());
    }

    #[test]
    fn test_string_extraction() {
        assert_eq!(
            String::from_value(&Value::Text("markus".into())).unwrap(),
            "markus"
        );
    }

    #[test]
    fn test_bool_extraction() {
        assert!(bool::from_value(&Value::Bool(true)).unwrap());
        assert!(bool::from_value(&Value::Int(1)).is_err());
    }

    #[test]
    fn test_bytes_extraction() {
        let payload = Bytes::from_static(b"\x01\x02");
        assert_eq!(
            Bytes::from_value(&Value::Bytes(payload.clone())).unwrap(),
            payload
        );
    }

    #[test]
    fn test_null_to_option_is_none() {
        assert_eq!(Option::<i64>::from_value(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_null_to_non_option_fails() {
        let err = i64::from_value(&Value::Null).unwrap_err();
        assert!(matches!(err, AccessError::Cast { from: "NULL", .. }));
    }

    #[test]
    fn test_option_wraps_present_value() {
        assert_eq!(
            Option::<String>::from_value(&Value::Text("x".into())).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn test_value_from_option() {
        assert_eq!(Value::from(Some(5i32)), Value::Int(5));
        assert_eq!(Value::from(Option::<i32>::None), Value::Null);
    }
}
