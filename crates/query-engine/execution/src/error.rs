//! Errors for query execution.

use query_engine_translation::translation;

/// Query planning or execution error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{message}\n---Error in plan:\n{plan}\n---Generated query:\n{sql}\n---Inner error:\n{source}")]
    Query {
        message: String,
        sql: String,
        plan: String,
        source: sqlx::Error,
    },
    #[error(transparent)]
    Translation(#[from] translation::error::Error),
    #[error("Parameter '{0}' is used by the statement but has no value.")]
    UnboundParameter(String),
    #[error("Parameter '{0}' cannot be bound: {1}")]
    UnsupportedParameter(String, String),
}
