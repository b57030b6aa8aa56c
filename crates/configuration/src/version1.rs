//! The version 1 configuration format: a connection, pool settings and the named base
//! queries plans are compiled on top of.

use std::path::Path;

use query_engine_metadata::metadata;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::environment::Variable;
use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};
use crate::values::{ConnectionUri, PoolSettings, Secret};

pub const CURRENT_VERSION: u32 = 1;
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";
pub const DEFAULT_CONNECTION_URI_VARIABLE: &str = "SQL_QUERYABLE_CONNECTION_URI";

/// Initial configuration, just enough to connect to a database and compile plans over
/// its base queries.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    // Which version of the configuration format are we using
    pub version: u32,
    // Connection string for a MySQL-compatible database
    pub connection_uri: ConnectionUri,
    #[serde(skip_serializing_if = "PoolSettings::is_default")]
    #[serde(default)]
    pub pool_settings: PoolSettings,
    #[serde(default)]
    pub metadata: metadata::Metadata,
}

impl ParsedConfiguration {
    pub fn initial() -> Self {
        ParsedConfiguration::empty()
    }

    pub fn empty() -> Self {
        Self {
            version: CURRENT_VERSION,
            connection_uri: ConnectionUri(Secret::FromEnvironment {
                variable: Variable::from(DEFAULT_CONNECTION_URI_VARIABLE),
            }),
            pool_settings: PoolSettings::default(),
            metadata: metadata::Metadata::empty(),
        }
    }
}

/// Parse the configuration format from a directory.
pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents =
        fs::read_to_string(&configuration_file)
            .await
            .map_err(|err| {
                ParseConfigurationError::IoErrorButStringified(format!(
                    "{}: {}",
                    &configuration_file.display(),
                    err
                ))
            })?;

    let mut parsed_config: ParsedConfiguration = serde_json::from_str(&configuration_file_contents)
        .map_err(|error| ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        })?;

    if parsed_config.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion(
            parsed_config.version,
            CURRENT_VERSION,
        ));
    }

    // look for native query sql file references and read from disk.
    for native_query in parsed_config.metadata.native_queries.0.values_mut() {
        if let metadata::NativeQuerySql::FromFile { file, sql } = &mut native_query.sql {
            let native_query_file = configuration_dir.as_ref().join(&*file);
            let contents = fs::read_to_string(&native_query_file)
                .await
                .map_err(|err| {
                    ParseConfigurationError::IoErrorButStringified(format!(
                        "{}: {}",
                        native_query_file.display(),
                        err
                    ))
                })?;
            *sql = Some(contents);
        }
    }

    tracing::debug!(
        native_queries = parsed_config.metadata.native_queries.0.len(),
        "Parsed configuration from {}",
        configuration_file.display()
    );
    Ok(parsed_config)
}

/// Write the parsed configuration into a directory on disk, along with the sql files of
/// its native queries and the JSON schema of the format.
pub async fn write_parsed_configuration(
    parsed_config: ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let configuration_file = out_dir.as_ref().to_owned().join(CONFIGURATION_FILENAME);
    fs::create_dir_all(out_dir.as_ref()).await?;

    // create the configuration file
    fs::write(
        configuration_file,
        serde_json::to_string_pretty(&parsed_config)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    // look for native query sql file references and write them to disk.
    for native_query in parsed_config.metadata.native_queries.0.values() {
        if let metadata::NativeQuerySql::FromFile { file, sql } = &native_query.sql {
            if file.is_absolute() || file.starts_with("..") {
                Err(
                    WriteParsedConfigurationError::WritingOutsideDestinationDir {
                        dir: out_dir.as_ref().to_owned(),
                        file: file.clone(),
                    },
                )?;
            };
            let Some(sql) = sql else {
                return Err(WriteParsedConfigurationError::MissingNativeQuerySql(
                    file.clone(),
                ));
            };

            let native_query_file = out_dir.as_ref().to_owned().join(file);
            if let Some(native_query_sql_dir) = native_query_file.parent() {
                fs::create_dir_all(native_query_sql_dir).await?;
            };
            fs::write(native_query_file, sql).await?;
        };
    }

    // create the jsonschema file
    let configuration_jsonschema_file_path = out_dir
        .as_ref()
        .to_owned()
        .join(CONFIGURATION_JSONSCHEMA_FILENAME);

    let output = crate::configuration::configuration_jsonschema();
    fs::write(
        &configuration_jsonschema_file_path,
        serde_json::to_string_pretty(&output)
            .map_err(|e| WriteParsedConfigurationError::IoError(e.into()))?
            + "\n",
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_empty_configuration_reads_the_connection_from_the_environment() {
        let value = serde_json::to_value(ParsedConfiguration::empty()).unwrap();
        similar_asserts::assert_eq!(
            value,
            serde_json::json!({
                "version": 1,
                "connectionUri": { "variable": "SQL_QUERYABLE_CONNECTION_URI" },
                "metadata": { "nativeQueries": {} }
            })
        );
    }

    #[tokio::test]
    async fn other_versions_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIGURATION_FILENAME),
            r#"{ "version": 2, "connectionUri": "mysql://localhost" }"#,
        )
        .await
        .unwrap();
        let error = parse_configuration(dir.path()).await.unwrap_err();
        assert!(matches!(
            error,
            ParseConfigurationError::UnsupportedVersion(2, 1)
        ));
    }

    #[tokio::test]
    async fn parse_errors_point_at_the_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIGURATION_FILENAME), "{\n  \"version\": }")
            .await
            .unwrap();
        match parse_configuration(dir.path()).await {
            Err(ParseConfigurationError::ParseError { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn sql_files_must_stay_in_the_directory() {
        let mut configuration = ParsedConfiguration::empty();
        configuration.metadata.native_queries.0.insert(
            "escape".to_string(),
            metadata::NativeQueryInfo {
                sql: metadata::NativeQuerySql::FromFile {
                    file: "../escape.sql".into(),
                    sql: Some("SELECT 1".to_string()),
                },
                fields: metadata::RecordInfo::empty(),
                column_mappings: metadata::ColumnMappings::empty(),
                ensure_all_columns_mapped: false,
                additional_commands: vec![],
                description: None,
            },
        );
        let dir = tempfile::tempdir().unwrap();
        let error = write_parsed_configuration(configuration, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            WriteParsedConfigurationError::WritingOutsideDestinationDir { .. }
        ));
    }
}
