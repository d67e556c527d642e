//! Version 1 of the configuration format.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use query_engine_metadata::metadata::EntityDescription;
use query_engine_sql::sql::string::Dialect;

use crate::environment::Variable;
use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};
use crate::settings::{HeaderNames, PaginationSettings, SearchSettings, SortSettings};
use crate::values::{CursorKey, Secret};

const CURRENT_VERSION: u32 = 1;
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";
pub const DEFAULT_CURSOR_KEY_VARIABLE: &str = "RESTQL_CURSOR_KEY";

/// The configuration file, as written by users.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    // Which version of the configuration format are we using
    pub version: u32,
    #[serde(default)]
    pub dialect: Dialect,
    /// Cursors are plain base64 when no key is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_encryption_key: Option<CursorKey>,
    #[serde(default)]
    pub sort: SortSettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub headers: HeaderNames,
    #[serde(default)]
    pub entities: Vec<EntityDescription>,
}

impl ParsedConfiguration {
    /// A configuration with every default, reading the cursor key from the environment.
    pub fn initial() -> Self {
        ParsedConfiguration {
            cursor_encryption_key: Some(CursorKey(Secret::FromEnvironment {
                variable: Variable::from(DEFAULT_CURSOR_KEY_VARIABLE),
            })),
            ..ParsedConfiguration::empty()
        }
    }

    pub fn empty() -> Self {
        ParsedConfiguration {
            version: CURRENT_VERSION,
            dialect: Dialect::default(),
            cursor_encryption_key: None,
            sort: SortSettings::default(),
            pagination: PaginationSettings::default(),
            search: SearchSettings::default(),
            headers: HeaderNames::default(),
            entities: vec![],
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

    let parsed_config: ParsedConfiguration = serde_json::from_str(&configuration_file_contents)
        .map_err(|error| ParseConfigurationError::ParseError {
            file_path: configuration_file.clone(),
            line: error.line(),
            column: error.column(),
            message: error.to_string(),
        })?;

    if parsed_config.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion(
            parsed_config.version,
        ));
    }

    tracing::debug!(
        file = %configuration_file.display(),
        entities = parsed_config.entities.len(),
        "parsed configuration"
    );

    Ok(parsed_config)
}

/// Write the parsed configuration, and its JSON schema, into a directory on disk.
pub async fn write_parsed_configuration(
    parsed_config: ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let out_dir = out_dir.as_ref();
    if !out_dir.is_dir() {
        return Err(WriteParsedConfigurationError::DirectoryIsNotPresent(
            out_dir.to_owned(),
        ));
    }

    let configuration_file = out_dir.join(CONFIGURATION_FILENAME);
    fs::write(
        &configuration_file,
        serde_json::to_string_pretty(&parsed_config)? + "\n",
    )
    .await?;

    let schema = schemars::schema_for!(ParsedConfiguration);
    fs::write(
        out_dir.join(CONFIGURATION_JSONSCHEMA_FILENAME),
        serde_json::to_string_pretty(&schema)? + "\n",
    )
    .await?;

    Ok(())
}
