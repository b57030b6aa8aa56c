//! Caller supplied SQL inserted at fixed points of the assembled statement.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a command is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CommandRegion {
    /// Before the statement, as a statement of its own.
    Header,
    /// Before the HAVING clause (or whatever clause comes next), usually a `GROUP BY`.
    BeforeGroupingOrHaving,
    /// After the generated select list.
    AfterSelectionColumns,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandLocale {
    pub region: CommandRegion,
    pub sql: String,
}

impl CommandLocale {
    pub fn new(region: CommandRegion, sql: impl Into<String>) -> Self {
        CommandLocale {
            region,
            sql: sql.into(),
        }
    }
}
