//! Reply value model and typed conversions.
//!
//! [`Value`] mirrors the RESP reply taxonomy: simple strings, errors,
//! integers, bulk strings, arrays, and nil. [`FromValue`] converts a
//! reply into the Rust type a command naturally produces, so callers
//! write `let n: i64 = client.raw(cmd).await?` instead of matching on
//! reply variants by hand.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

// ============================================================================
// Value
// ============================================================================

/// A single decoded reply frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Simple string reply (`+OK`).
    Simple(String),
    /// Error reply (`-ERR ...`). Carried as data; transports decide
    /// whether to surface it as a failure.
    Error(String),
    /// Integer reply (`:42`).
    Integer(i64),
    /// Bulk string reply. Binary-safe.
    Bulk(Vec<u8>),
    /// Array reply, possibly nested.
    Array(Vec<Value>),
    /// Nil bulk string (`$-1`) or nil array (`*-1`).
    Null,
}

impl Value {
    /// Short name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Simple(_) => "simple string",
            Value::Error(_) => "error",
            Value::Integer(_) => "integer",
            Value::Bulk(_) => "bulk string",
            Value::Array(_) => "array",
            Value::Null => "nil",
        }
    }

    /// Returns `true` for the nil reply.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrows the textual content of simple or bulk string replies.
    ///
    /// Returns `None` for non-string variants or non-UTF-8 bulk payloads.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Simple(s) => Some(s),
            Value::Bulk(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Borrows the raw bytes of simple or bulk string replies.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Simple(s) => Some(s.as_bytes()),
            Value::Bulk(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the integer payload, coercing numeric strings.
    ///
    /// Servers reply `:n` for most counters but some deployments proxy
    /// integers through bulk strings; both are accepted.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Simple(s) => s.parse().ok(),
            Value::Bulk(b) => std::str::from_utf8(b).ok()?.parse().ok(),
            _ => None,
        }
    }

    /// Consumes an array reply into its elements.
    pub fn into_array(self) -> Result<Vec<Value>> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(Error::TypeMismatch {
                expected: "array",
                actual: other.type_name(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Simple(s) => write!(f, "{s}"),
            Value::Error(e) => write!(f, "(error) {e}"),
            Value::Integer(i) => write!(f, "(integer) {i}"),
            Value::Bulk(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "{s:?}"),
                Err(_) => write!(f, "(binary, {} bytes)", b.len()),
            },
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {item}", i + 1)?;
                }
                if items.is_empty() {
                    write!(f, "(empty array)")?;
                }
                Ok(())
            }
            Value::Null => write!(f, "(nil)"),
        }
    }
}

// ============================================================================
// FromValue
// ============================================================================

/// Conversion from a decoded reply into a concrete Rust type.
pub trait FromValue: Sized {
    /// Converts the reply, failing with [`Error::TypeMismatch`] when the
    /// wire carried something else.
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for () {
    /// Accepts any non-error reply. Used for commands whose reply is a
    /// bare acknowledgement (`SET`, `RENAME`, `LTRIM`, ...).
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Error(_) => Err(Error::TypeMismatch {
                expected: "acknowledgement",
                actual: "error",
            }),
            _ => Ok(()),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Simple(s) => Ok(s),
            Value::Bulk(b) => String::from_utf8(b).map_err(|_| Error::NotUtf8),
            Value::Integer(i) => Ok(i.to_string()),
            other => Err(Error::TypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Simple(s) => Ok(s.into_bytes()),
            Value::Bulk(b) => Ok(b),
            other => Err(Error::TypeMismatch {
                expected: "bytes",
                actual: other.type_name(),
            }),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        let actual = value.type_name();
        value.as_integer().ok_or(Error::TypeMismatch {
            expected: "integer",
            actual,
        })
    }
}

impl FromValue for bool {
    /// Integer replies 0/1, as `EXISTS`, `EXPIRE`, and `HEXISTS` produce.
    fn from_value(value: Value) -> Result<Self> {
        let actual = value.type_name();
        match value.as_integer() {
            Some(i) => Ok(i != 0),
            None => Err(Error::TypeMismatch {
                expected: "integer (0/1)",
                actual,
            }),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        value
            .into_array()?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

impl FromValue for HashMap<String, String> {
    /// Flat field/value pair array, as `HGETALL` produces.
    fn from_value(value: Value) -> Result<Self> {
        let items = value.into_array()?;
        let mut map = HashMap::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let Some(field) = iter.next() {
            let Some(val) = iter.next() else {
                return Err(Error::TypeMismatch {
                    expected: "field/value pairs",
                    actual: "odd-length array",
                });
            };
            map.insert(String::from_value(field)?, String::from_value(val)?);
        }
        Ok(map)
    }
}

// ============================================================================
// Tests
// ============================================================================
