//! Read values from the environment the configuration is interpreted in.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The name of an environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Variable(String);

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        Variable(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Variable {
    fn from(value: &str) -> Self {
        Variable(value.to_string())
    }
}

impl From<String> for Variable {
    fn from(value: String) -> Self {
        Variable(value)
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where environment variables are read from.
pub trait Environment {
    fn read(&self, variable: &Variable) -> Result<String, Error>;
}

impl<E: Environment> Environment for &E {
    fn read(&self, variable: &Variable) -> Result<String, Error> {
        (*self).read(variable)
    }
}

/// The environment of the running process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn read(&self, variable: &Variable) -> Result<String, Error> {
        std::env::var(variable.as_str()).map_err(|error| match error {
            std::env::VarError::NotPresent => Error::VariableNotPresent(variable.clone()),
            std::env::VarError::NotUnicode(_) => Error::NonUnicodeValue(variable.clone()),
        })
    }
}

/// A fixed set of variables, for tests and for tools that do not read the process
/// environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedEnvironment(HashMap<Variable, String>);

impl FixedEnvironment {
    pub fn empty() -> Self {
        FixedEnvironment(HashMap::new())
    }
}

impl From<HashMap<Variable, String>> for FixedEnvironment {
    fn from(variables: HashMap<Variable, String>) -> Self {
        FixedEnvironment(variables)
    }
}

impl<const N: usize> From<[(Variable, String); N]> for FixedEnvironment {
    fn from(variables: [(Variable, String); N]) -> Self {
        FixedEnvironment(HashMap::from(variables))
    }
}

impl Environment for FixedEnvironment {
    fn read(&self, variable: &Variable) -> Result<String, Error> {
        self.0.read(variable)
    }
}

impl Environment for HashMap<Variable, String> {
    fn read(&self, variable: &Variable) -> Result<String, Error> {
        self.get(variable)
            .cloned()
            .ok_or_else(|| Error::VariableNotPresent(variable.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("environment variable {0} is not present")]
    VariableNotPresent(Variable),
    #[error("environment variable {0} is not valid unicode")]
    NonUnicodeValue(Variable),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_environments_only_know_their_variables() {
        let environment = FixedEnvironment::from([("A".into(), "1".to_string())]);
        assert_eq!(environment.read(&"A".into()), Ok("1".to_string()));
        assert_eq!(
            environment.read(&"B".into()),
            Err(Error::VariableNotPresent("B".into()))
        );
    }
}
