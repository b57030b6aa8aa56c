//! Configuration for the query engine.

use query_engine_metadata::metadata;
use schemars::{gen::SchemaSettings, schema::RootSchema};

use crate::values::PoolSettings;
use crate::version1::ParsedConfiguration;

/// The 'Configuration' type collects all the information necessary to compile and run
/// plans at runtime.
///
/// 'ParsedConfiguration' is the serialized format, with secrets still unresolved. Values
/// of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration'.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub metadata: metadata::Metadata,
    pub pool_settings: PoolSettings,
    pub connection_uri: String,
}

impl Configuration {
    /// The configured base query with the given name.
    pub fn native_query(&self, name: &str) -> Option<&metadata::NativeQueryInfo> {
        self.metadata.native_queries.lookup(name)
    }
}

/// The JSON schema of `configuration.json`.
pub fn configuration_jsonschema() -> RootSchema {
    SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<ParsedConfiguration>()
}
