//! Scalar cell values and their primitive types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The primitive type of a cell or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// 64-bit signed integers
    #[serde(alias = "integer", alias = "int64")]
    Int,
    /// 64-bit floating point numbers
    #[serde(alias = "double", alias = "float64")]
    Float,
    /// UTF-8 text
    #[serde(alias = "string", alias = "str", alias = "utf8")]
    Text,
}

impl ValueType {
    /// Returns true for `Int` and `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int | ValueType::Float)
    }

    /// Returns the lowercase name used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Text => "text",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An owned scalar value.
///
/// Serialized untagged, so `150` and `"US"` appear in reports as plain JSON
/// scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// The marker for an absent cell. Missing cells are `NaN` floats in every
    /// column kind, so a text column with gaps is stored as `Mixed`.
    pub fn missing() -> Self {
        Value::Float(f64::NAN)
    }

    pub fn is_missing(&self) -> bool {
        self.as_value_ref().is_missing()
    }

    /// Returns the primitive type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Float(_) => ValueType::Float,
            Value::Text(_) => ValueType::Text,
        }
    }

    /// Borrows this value as a [`ValueRef`].
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Int(v) => ValueRef::Int(*v),
            Value::Float(v) => ValueRef::Float(*v),
            Value::Text(v) => ValueRef::Text(v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_value_ref().fmt(f)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
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

/// A borrowed view of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    Int(i64),
    Float(f64),
    Text(&'a str),
}

impl<'a> ValueRef<'a> {
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueRef::Int(_) => ValueType::Int,
            ValueRef::Float(_) => ValueType::Float,
            ValueRef::Text(_) => ValueType::Text,
        }
    }

    /// Numeric view of the cell; `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ValueRef::Int(v) => Some(*v as f64),
            ValueRef::Float(v) => Some(*v),
            ValueRef::Text(_) => None,
        }
    }

    /// Whether the cell is the missing marker (`NaN`).
    pub fn is_missing(&self) -> bool {
        matches!(self, ValueRef::Float(f) if f.is_nan())
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            ValueRef::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ValueRef::Int(v) => Value::Int(*v),
            ValueRef::Float(v) => Value::Float(*v),
            ValueRef::Text(v) => Value::Text((*v).to_string()),
        }
    }

    /// Whether this cell equals `other`, comparing ints and floats numerically.
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (ValueRef::Text(a), Value::Text(b)) => *a == b.as_str(),
            (ValueRef::Text(_), _) | (_, Value::Text(_)) => false,
            (ValueRef::Int(a), Value::Int(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_value_ref().as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Int(v) => write!(f, "{v}"),
            ValueRef::Float(v) => write!(f, "{v}"),
            ValueRef::Text(v) => write!(f, "\"{v}\""),
        }
    }
}
