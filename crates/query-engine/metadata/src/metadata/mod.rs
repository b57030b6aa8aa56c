//! Metadata information regarding the base queries and their declared row shapes.

pub mod commands;
pub mod database;
pub mod mappings;
pub mod native_queries;
pub mod value;

// re-export without modules
pub use commands::*;
pub use database::*;
pub use mappings::*;
pub use native_queries::*;
pub use value::*;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata information.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub native_queries: NativeQueries,
}

impl Metadata {
    pub fn empty() -> Self {
        Metadata {
            native_queries: NativeQueries::empty(),
        }
    }
}
