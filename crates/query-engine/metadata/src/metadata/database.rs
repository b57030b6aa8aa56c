//! Metadata information regarding the shape of the rows a base query returns.

use std::fmt;

use enum_iterator::Sequence;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The kinds of values a field of a row can hold.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Sequence,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Boolean,
    Integer,
    UnsignedInteger,
    Float,
    Decimal,
    String,
    Enum,
    Uuid,
    DateTime,
    DateTimeOffset,
    Date,
    Time,
    Json,
    Object,
    Array,
}

impl ScalarType {
    /// Whether a field of this type maps onto exactly one selectable column.
    /// Composite values never do.
    pub fn is_simple(self) -> bool {
        !matches!(self, ScalarType::Json | ScalarType::Object | ScalarType::Array)
    }

    /// Every type that can be narrowed to by a projection.
    pub fn simple_types() -> impl Iterator<Item = ScalarType> {
        enum_iterator::all::<ScalarType>().filter(|scalar_type| scalar_type.is_simple())
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Integer => "integer",
            ScalarType::UnsignedInteger => "unsigned_integer",
            ScalarType::Float => "float",
            ScalarType::Decimal => "decimal",
            ScalarType::String => "string",
            ScalarType::Enum => "enum",
            ScalarType::Uuid => "uuid",
            ScalarType::DateTime => "date_time",
            ScalarType::DateTimeOffset => "date_time_offset",
            ScalarType::Date => "date",
            ScalarType::Time => "time",
            ScalarType::Json => "json",
            ScalarType::Object => "object",
            ScalarType::Array => "array",
        };
        write!(f, "{name}")
    }
}

/// Information about a field of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldInfo {
    pub r#type: ScalarType,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldInfo {
    pub fn new(r#type: ScalarType) -> Self {
        FieldInfo {
            r#type,
            nullable: false,
            description: None,
        }
    }
}

/// The declared fields of the rows a base query returns, in declaration order.
///
/// An empty record places no restriction on field references: every referenced
/// field is treated as a simple column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RecordInfo(pub IndexMap<String, FieldInfo>);

impl RecordInfo {
    pub fn empty() -> Self {
        RecordInfo(IndexMap::new())
    }

    /// Declare a field, replacing an earlier declaration with the same name.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, info: FieldInfo) -> Self {
        self.0.insert(name.into(), info);
        self
    }

    pub fn is_declared(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&FieldInfo> {
        self.0.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_types_are_not_simple() {
        let simple: Vec<ScalarType> = ScalarType::simple_types().collect();
        assert!(simple.contains(&ScalarType::Uuid));
        assert!(simple.contains(&ScalarType::DateTimeOffset));
        assert!(simple.contains(&ScalarType::Date));
        assert!(!simple.contains(&ScalarType::Object));
        assert!(!simple.contains(&ScalarType::Json));
        assert!(!simple.contains(&ScalarType::Array));
    }

    #[test]
    fn record_info_keeps_declaration_order() {
        let record = RecordInfo::empty()
            .with_field("Name", FieldInfo::new(ScalarType::String))
            .with_field("Id", FieldInfo::new(ScalarType::Integer));
        similar_asserts::assert_eq!(record.field_names().collect::<Vec<_>>(), vec!["Name", "Id"]);
    }
}
