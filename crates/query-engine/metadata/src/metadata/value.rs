//! Literal values, as they appear in plans and as they are bound to parameters.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::database::ScalarType;

/// A literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Uuid(Uuid),
    DateTime(NaiveDateTime),
    DateTimeOffset(DateTime<FixedOffset>),
    Date(NaiveDate),
    Time(NaiveTime),
    Array(Vec<Literal>),
}

impl Literal {
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// The scalar type of the value, `None` for null.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        Some(match self {
            Literal::Null => return None,
            Literal::Bool(_) => ScalarType::Boolean,
            Literal::Int(_) => ScalarType::Integer,
            Literal::UInt(_) => ScalarType::UnsignedInteger,
            Literal::Float(_) => ScalarType::Float,
            Literal::String(_) => ScalarType::String,
            Literal::Uuid(_) => ScalarType::Uuid,
            Literal::DateTime(_) => ScalarType::DateTime,
            Literal::DateTimeOffset(_) => ScalarType::DateTimeOffset,
            Literal::Date(_) => ScalarType::Date,
            Literal::Time(_) => ScalarType::Time,
            Literal::Array(_) => ScalarType::Array,
        })
    }

    /// The value as text, without quoting. Arrays have no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Literal::Null => Some(String::new()),
            Literal::Bool(b) => Some(b.to_string()),
            Literal::Int(i) => Some(i.to_string()),
            Literal::UInt(u) => Some(u.to_string()),
            Literal::Float(f) => Some(f.to_string()),
            Literal::String(s) => Some(s.clone()),
            Literal::Uuid(u) => Some(u.to_string()),
            Literal::DateTime(d) => Some(d.to_string()),
            Literal::DateTimeOffset(d) => Some(d.to_rfc3339()),
            Literal::Date(d) => Some(d.to_string()),
            Literal::Time(t) => Some(t.to_string()),
            Literal::Array(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::String(s) => write!(f, "{s:?}"),
            Literal::Array(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            other => write!(f, "{}", other.to_text().unwrap_or_default()),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Bool(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Int(value.into())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<u64> for Literal {
    fn from(value: u64) -> Self {
        Literal::UInt(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(value)
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<Uuid> for Literal {
    fn from(value: Uuid) -> Self {
        Literal::Uuid(value)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(value: NaiveDateTime) -> Self {
        Literal::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for Literal {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Literal::DateTimeOffset(value)
    }
}

impl From<NaiveDate> for Literal {
    fn from(value: NaiveDate) -> Self {
        Literal::Date(value)
    }
}

impl From<NaiveTime> for Literal {
    fn from(value: NaiveTime) -> Self {
        Literal::Time(value)
    }
}

impl<T: Into<Literal>> From<Option<T>> for Literal {
    fn from(value: Option<T>) -> Self {
        value.map_or(Literal::Null, Into::into)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(value: Vec<T>) -> Self {
        Literal::Array(value.into_iter().map(Into::into).collect())
    }
}
