//! Renames from logical field names to physical columns.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a logical field lives in the base query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnMapping {
    /// A column name, quoted unless it is already quoted or qualified.
    Column(String),
    /// A SQL fragment emitted verbatim, such as `CONCAT(a.first, a.last)`.
    Raw(String),
}

/// Column renames, in the order they were declared.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ColumnMappings(pub IndexMap<String, ColumnMapping>);

impl ColumnMappings {
    pub fn empty() -> Self {
        ColumnMappings(IndexMap::new())
    }

    /// Install a mapping. A later mapping for the same field replaces the earlier one.
    pub fn insert(&mut self, field: impl Into<String>, mapping: ColumnMapping) {
        self.0.insert(field.into(), mapping);
    }

    pub fn get(&self, field: &str) -> Option<&ColumnMapping> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ColumnMapping)> {
        self.0.iter()
    }
}
