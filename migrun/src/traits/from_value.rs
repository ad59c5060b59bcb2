//! FromValue trait for converting database values to Rust types

use crate::error::{Error, Result};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Trait for types that can be constructed from a database value.
pub trait FromValue: Sized {
    /// Convert a database value to this type.
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(expected: &'static str, value: &Value) -> Error {
    Error::TypeConversion {
        expected,
        actual: value.type_name().to_string(),
    }
}

// MySQL reports most integer columns as i64 or u64 regardless of declared
// width, so every integer target accepts both and range-checks.
macro_rules! from_value_int {
    ($($ty:ident),+) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Int(v) => $ty::try_from(v).map_err(|_| Error::TypeConversion {
                            expected: stringify!($ty),
                            actual: format!("int({}) out of range", v),
                        }),
                        Value::UInt(v) => $ty::try_from(v).map_err(|_| Error::TypeConversion {
                            expected: stringify!($ty),
                            actual: format!("uint({}) out of range", v),
                        }),
                        Value::Text(ref s) => s.trim().parse().map_err(|_| Error::TypeConversion {
                            expected: stringify!($ty),
                            actual: format!("text({})", s),
                        }),
                        other => Err(mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )+
    };
}

from_value_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::UInt(v) => Ok(v != 0),
            // information_schema reports flags like IS_NULLABLE as text
            Value::Text(ref s) => match s.as_str() {
                "YES" | "1" | "true" => Ok(true),
                "NO" | "0" | "false" => Ok(false),
                _ => Err(mismatch("bool", &value)),
            },
            other => Err(mismatch("bool", &other)),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(v) => Ok(v as f64),
            Value::UInt(v) => Ok(v as f64),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(v) => Ok(v),
            Value::Bytes(v) => String::from_utf8(v).map_err(|e| Error::TypeConversion {
                expected: "utf8 string",
                actual: format!("invalid utf8: {}", e),
            }),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(v) => Ok(v),
            Value::Text(v) => Ok(v.into_bytes()),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(v) => Ok(v),
            Value::DateTime(v) => Ok(v.date()),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            Value::Date(v) => Ok(v.and_time(NaiveTime::MIN)),
            other => Err(mismatch("datetime", &other)),
        }
    }
}

impl FromValue for NaiveTime {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(v) => Ok(v),
            Value::DateTime(v) => Ok(v.time()),
            other => Err(mismatch("time", &other)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}
