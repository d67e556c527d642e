//! Errors that can be thrown when processing configuration.

use std::path::PathBuf;

use query_engine_metadata::metadata::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unsupported configuration version: {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

#[derive(Debug, Error)]
pub enum WriteParsedConfigurationError {
    #[error("directory is not present: {0}")]
    DirectoryIsNotPresent(PathBuf),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("missing environment variable when processing {attempted_to_resolve}: {message}")]
    MissingEnvironmentVariable {
        attempted_to_resolve: String,
        message: String,
    },

    #[error("the cursor encryption key must not be empty")]
    EmptyCursorKey,

    #[error("defaultPageSize ({default_page_size}) must not exceed maxPageSize ({max_page_size})")]
    InvalidPageSizes {
        default_page_size: u32,
        max_page_size: u32,
    },

    #[error("'{setting}' must not be empty")]
    EmptySetting { setting: &'static str },

    #[error("the parameter name '{name}' is configured for more than one purpose")]
    DuplicateParameterName { name: String },

    #[error("'{name}' is not a valid header name")]
    InvalidHeaderName { name: String },

    #[error("entity '{0}' is configured twice")]
    DuplicateEntity(String),

    #[error("entity '{entity}' has a field named '{name}', which is a reserved parameter name")]
    ReservedParameterName { entity: String, name: String },

    #[error("entity '{entity}' has a field named '{name}', which cannot be addressed because it contains '{marker}'")]
    UnaddressableFieldName {
        entity: String,
        name: String,
        marker: String,
    },

    #[error("entity '{entity}': {source}")]
    Schema {
        entity: String,
        #[source]
        source: SchemaError,
    },
}
