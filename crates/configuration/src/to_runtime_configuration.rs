//! Convert the parsed configuration metadata to internal engine metadata
//! That can be used by the engine to compile and run plans.

use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::values::Secret;
use crate::version1::ParsedConfiguration;

/// Convert the parsed configuration metadata to internal engine metadata
/// That can be used by the engine to compile and run plans.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let connection_uri = parsed_config
        .connection_uri
        .0
        .resolve(&environment)
        .map_err(|error| MakeRuntimeConfigurationError::MissingEnvironmentVariable {
            variable: match &parsed_config.connection_uri.0 {
                Secret::FromEnvironment { variable } => variable.to_string(),
                Secret::Plain(_) => String::new(),
            },
            message: error.to_string(),
        })?;
    Ok(Configuration {
        metadata: parsed_config.metadata,
        pool_settings: parsed_config.pool_settings,
        connection_uri,
    })
}
