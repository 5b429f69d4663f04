//! Value and argument types shared across the execution core.

use bytes::Bytes;
use std::fmt;

/// A reply value produced by a node for one command.
///
/// This core never decodes wire data itself; connections hand it already
/// decoded values and it forwards them per node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value (simple or bulk).
    String(Bytes),

    /// An integer value.
    Integer(i64),

    /// An array of values.
    Array(Vec<Value>),

    /// A null value.
    Nil,

    /// A status/OK reply (e.g. `+OK`).
    Status(String),
}

impl Value {
    /// Returns the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(b) => std::str::from_utf8(b).ok(),
            Value::Status(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns `true` if the value is nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(b) => match std::str::from_utf8(b) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "<binary {} bytes>", b.len()),
            },
            Value::Integer(n) => write!(f, "(integer) {}", n),
            Value::Array(arr) => {
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {}", i + 1, val)?;
                }
                Ok(())
            }
            Value::Nil => write!(f, "(nil)"),
            Value::Status(s) => write!(f, "{}", s),
        }
    }
}

/// Trait for types that can be converted into command arguments.
pub trait ToArg {
    /// Encode this value as a command argument.
    fn to_arg(&self) -> Bytes;
}

impl ToArg for &str {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for &String {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self.as_bytes())
    }
}

impl ToArg for Bytes {
    fn to_arg(&self) -> Bytes {
        self.clone()
    }
}

impl ToArg for &[u8] {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for Vec<u8> {
    fn to_arg(&self) -> Bytes {
        Bytes::copy_from_slice(self)
    }
}

impl ToArg for i64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for u64 {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}

impl ToArg for usize {
    fn to_arg(&self) -> Bytes {
        Bytes::from(self.to_string())
    }
}
