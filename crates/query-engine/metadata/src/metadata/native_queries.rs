//! Metadata information regarding native queries: caller authored base SQL
//! fragments that plans are compiled on top of.

use super::commands::CommandLocale;
use super::database::RecordInfo;
use super::mappings::ColumnMappings;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct NativeQueries(pub BTreeMap<String, NativeQueryInfo>);

impl NativeQueries {
    pub fn empty() -> Self {
        NativeQueries(BTreeMap::new())
    }

    pub fn lookup(&self, name: &str) -> Option<&NativeQueryInfo> {
        self.0.get(name)
    }
}

/// Information about a Native Query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NativeQueryInfo {
    /// SQL the plan is compiled on top of, such as `SELECT * FROM orders o JOIN customers c ON ...`.
    /// It is never parsed, only concatenated with the compiled clauses.
    pub sql: NativeQuerySql,
    /// Fields of the rows returned by the Native Query
    #[serde(default)]
    pub fields: RecordInfo,
    /// Where each logical field lives in the SQL above
    #[serde(default, skip_serializing_if = "ColumnMappings::is_empty")]
    pub column_mappings: ColumnMappings,
    /// Re-select every mapped column and filter with WHERE instead of HAVING
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ensure_all_columns_mapped: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_commands: Vec<CommandLocale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The SQL of a Native Query, either inline or stored in a file next to the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum NativeQuerySql {
    Inline(String),
    FromFile {
        file: PathBuf,
        /// Filled in when the configuration is parsed.
        #[serde(skip)]
        sql: Option<String>,
    },
}

impl NativeQuerySql {
    /// Extract the native query sql.
    /// If this happens before the file was read, it will fail with an error.
    pub fn sql(&self) -> Result<&str, String> {
        match self {
            NativeQuerySql::Inline(sql) | NativeQuerySql::FromFile { sql: Some(sql), .. } => {
                Ok(sql.as_str())
            }
            NativeQuerySql::FromFile { file, sql: None } => Err(format!(
                "native query sql file {} was not read during parsing",
                file.display()
            )),
        }
    }
}

impl From<&str> for NativeQuerySql {
    fn from(value: &str) -> Self {
        NativeQuerySql::Inline(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_sql_is_a_plain_string() {
        let info: NativeQueryInfo =
            serde_json::from_str(r#"{ "sql": "SELECT * FROM `fake`" }"#).unwrap();
        assert_eq!(info.sql.sql(), Ok("SELECT * FROM `fake`"));
        assert!(!info.ensure_all_columns_mapped);
    }

    #[test]
    fn unread_sql_file_is_an_error() {
        let info: NativeQueryInfo =
            serde_json::from_str(r#"{ "sql": { "file": "orders.sql" } }"#).unwrap();
        assert!(info.sql.sql().is_err());
    }
}
