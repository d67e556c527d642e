//! Convert a parsed configuration into the runtime configuration.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use crate::configuration::Configuration;
use crate::environment::Environment;
use crate::error::MakeRuntimeConfigurationError;
use crate::settings::RequestSettings;
use crate::values::{CursorKey, Secret};
use crate::version1::ParsedConfiguration;

/// Check the parsed configuration, resolve its secrets and build every entity schema.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
    environment: impl Environment,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    let cursor_key = parsed_config
        .cursor_encryption_key
        .map(|key| resolve_cursor_key(key, &environment))
        .transpose()?;

    let request = RequestSettings {
        sort: parsed_config.sort,
        pagination: parsed_config.pagination,
        search: parsed_config.search,
        headers: parsed_config.headers,
        cursor_key,
    };
    validate_request_settings(&request)?;

    let mut entities = BTreeMap::new();
    for description in parsed_config.entities {
        let entity = description.name.clone();
        let schema = description
            .build()
            .map_err(|source| MakeRuntimeConfigurationError::Schema {
                entity: entity.clone(),
                source,
            })?;

        if let Some(name) = request
            .special_parameter_names()
            .into_iter()
            .find(|name| schema.field(name).is_some())
        {
            return Err(MakeRuntimeConfigurationError::ReservedParameterName {
                entity,
                name: name.to_string(),
            });
        }

        if let Some(marker) = request.search.name_attribute_marker() {
            if let Some(name) = schema.json_names().find(|name| name.contains(marker)) {
                return Err(MakeRuntimeConfigurationError::UnaddressableFieldName {
                    entity,
                    name: name.to_string(),
                    marker: marker.to_string(),
                });
            }
        }

        if entities.insert(entity.clone(), Arc::new(schema)).is_some() {
            return Err(MakeRuntimeConfigurationError::DuplicateEntity(entity));
        }
    }

    tracing::info!(
        entities = entities.len(),
        dialect = ?parsed_config.dialect,
        encrypted_cursors = request.cursor_key.is_some(),
        "runtime configuration ready"
    );

    Ok(Configuration {
        dialect: parsed_config.dialect,
        request,
        entities,
    })
}

fn resolve_cursor_key(
    key: CursorKey,
    environment: &impl Environment,
) -> Result<String, MakeRuntimeConfigurationError> {
    let key = match key.0 {
        Secret::Plain(value) => value,
        Secret::FromEnvironment { variable } => environment.read(&variable).map_err(|error| {
            MakeRuntimeConfigurationError::MissingEnvironmentVariable {
                attempted_to_resolve: "cursorEncryptionKey".to_string(),
                message: error.to_string(),
            }
        })?,
    };
    if key.is_empty() {
        return Err(MakeRuntimeConfigurationError::EmptyCursorKey);
    }
    Ok(key)
}

fn validate_request_settings(request: &RequestSettings) -> Result<(), MakeRuntimeConfigurationError> {
    let pagination = &request.pagination;
    if pagination.max_page_size > 0 && pagination.default_page_size > pagination.max_page_size {
        return Err(MakeRuntimeConfigurationError::InvalidPageSizes {
            default_page_size: pagination.default_page_size,
            max_page_size: pagination.max_page_size,
        });
    }

    let settings: [(&'static str, &str); 10] = [
        ("sort.parameterName", &request.sort.parameter_name),
        ("sort.fieldSeparator", &request.sort.field_separator),
        ("sort.directionSeparator", &request.sort.direction_separator),
        ("sort.ascendingName", &request.sort.ascending_name),
        ("sort.descendingName", &request.sort.descending_name),
        ("pagination.pageSizeName", &pagination.page_size_name),
        ("pagination.cursorName", &pagination.cursor_name),
        ("pagination.indexCursorName", &pagination.index_cursor_name),
        ("search.attributeSeparator", &request.search.attribute_separator),
        ("search.enumSplit", &request.search.enum_split),
    ];
    if let Some((setting, _)) = settings.iter().find(|(_, value)| value.is_empty()) {
        return Err(MakeRuntimeConfigurationError::EmptySetting { setting: *setting });
    }

    let mut seen = HashSet::new();
    for name in request
        .special_parameter_names()
        .into_iter()
        .chain(pagination.reserved_parameters.iter().map(String::as_str))
    {
        if !seen.insert(name) {
            return Err(MakeRuntimeConfigurationError::DuplicateParameterName {
                name: name.to_string(),
            });
        }
    }

    for name in request.headers.all() {
        if http::HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(MakeRuntimeConfigurationError::InvalidHeaderName {
                name: name.to_string(),
            });
        }
    }

    Ok(())
}
