//! Typed values carried by attribute nodes and data objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    StringArray(Vec<String>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view used by range checks. Strings are parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_string_array(&self) -> Option<&[String]> {
        match self {
            Value::StringArray(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is a string that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::StringArray(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::StringArray(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::StringArray(items.into_iter().map(String::from).collect())
    }
}

/// The declared value type of a field or attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    String,
    Int,
    Long,
    Double,
    Boolean,
    StringArray,
}

impl ValueKind {
    /// Coerce `value` into this kind.
    ///
    /// Strings are parsed; numbers widen or narrow where lossless; a comma
    /// separated string becomes a string array.
    pub fn coerce(self, value: Value) -> Result<Value> {
        let invalid = |v: &Value| Error::InvalidValue {
            kind: self.to_string(),
            input: v.to_string(),
        };
        match (self, value) {
            (ValueKind::String, Value::StringArray(items)) => Ok(Value::String(items.join(","))),
            (ValueKind::String, v) => Ok(Value::String(v.to_string())),
            (ValueKind::Int, Value::Int(i)) => {
                i32::try_from(i).map_err(|_| invalid(&Value::Int(i)))?;
                Ok(Value::Int(i))
            }
            (ValueKind::Long, Value::Int(i)) => Ok(Value::Int(i)),
            (ValueKind::Int | ValueKind::Long, Value::String(s)) => self.parse(&s),
            (ValueKind::Double, Value::Float(x)) => Ok(Value::Float(x)),
            (ValueKind::Double, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (ValueKind::Double, Value::String(s)) => self.parse(&s),
            (ValueKind::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
            (ValueKind::Boolean, Value::String(s)) => self.parse(&s),
            (ValueKind::StringArray, Value::StringArray(items)) => Ok(Value::StringArray(items)),
            (ValueKind::StringArray, Value::String(s)) => self.parse(&s),
            (_, v) => Err(invalid(&v)),
        }
    }

    /// Parse textual input into this kind.
    pub fn parse(self, input: &str) -> Result<Value> {
        let invalid = || Error::InvalidValue {
            kind: self.to_string(),
            input: input.to_string(),
        };
        let trimmed = input.trim();
        match self {
            ValueKind::String => Ok(Value::String(input.to_string())),
            ValueKind::Int => trimmed
                .parse::<i32>()
                .map(|i| Value::Int(i64::from(i)))
                .map_err(|_| invalid()),
            ValueKind::Long => trimmed.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
            ValueKind::Double => trimmed.parse::<f64>().map(Value::Float).map_err(|_| invalid()),
            ValueKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            ValueKind::StringArray => Ok(Value::StringArray(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Long => "long",
            ValueKind::Double => "double",
            ValueKind::Boolean => "boolean",
            ValueKind::StringArray => "stringArray",
        };
        f.write_str(name)
    }
}

impl FromStr for ValueKind {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueKind::String),
            "int" => Ok(ValueKind::Int),
            "long" => Ok(ValueKind::Long),
            "double" => Ok(ValueKind::Double),
            "boolean" => Ok(ValueKind::Boolean),
            "stringArray" => Ok(ValueKind::StringArray),
            _ => Err(Error::InvalidValue {
                kind: "value kind".into(),
                input: s.to_string(),
            }),
        }
    }
}
