//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

/// The errors that can be thrown when parsing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },
    #[error("unsupported configuration version {0}, expected {1}")]
    UnsupportedVersion(u32, u32),
    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

/// The errors that can be thrown when turning a parsed configuration into a runtime one.
#[derive(Debug, thiserror::Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("invalid configuration environment variable '{variable}': {message}")]
    MissingEnvironmentVariable { variable: String, message: String },
}

/// The errors that can be thrown when writing a configuration directory.
#[derive(Debug, thiserror::Error)]
pub enum WriteParsedConfigurationError {
    #[error("file {file} is outside the destination directory {dir}")]
    WritingOutsideDestinationDir { dir: PathBuf, file: PathBuf },
    #[error("native query sql file {0} was never read")]
    MissingNativeQuerySql(PathBuf),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
