use similar_asserts::assert_eq;

use query_engine_metadata::metadata::{
    EntityDescription, FieldDescription, FieldType, SchemaError, TableRef,
};
use restql_configuration::environment::{FixedEnvironment, Variable};
use restql_configuration::error::MakeRuntimeConfigurationError;
use restql_configuration::values::{CursorKey, Secret};
use restql_configuration::version1::{CONFIGURATION_FILENAME, CONFIGURATION_JSONSCHEMA_FILENAME};
use restql_configuration::{
    make_runtime_configuration, parse_configuration, write_parsed_configuration,
    AttributeHandling, ParsedConfiguration,
};

fn field(json_name: &str, column: &str) -> FieldDescription {
    serde_json::from_value(serde_json::json!({
        "jsonName": json_name,
        "column": column,
        "type": "string",
    }))
    .unwrap()
}

fn entity(name: &str, fields: Vec<FieldDescription>) -> EntityDescription {
    EntityDescription {
        name: name.to_string(),
        table: TableRef::new(&name.to_lowercase()),
        alias: None,
        joins: vec![],
        fields,
        json_aliases: Default::default(),
        distinct: false,
    }
}

#[test]
fn a_minimal_file_gets_every_default() {
    let parsed: ParsedConfiguration = serde_json::from_str(r#"{ "version": 1 }"#).unwrap();

    assert_eq!(parsed, ParsedConfiguration::empty());
    assert_eq!(parsed.sort.parameter_name, "sort");
    assert_eq!(parsed.pagination.page_size_name, "limit");
    assert_eq!(parsed.pagination.cursor_name, "cursor");
    assert_eq!(parsed.pagination.index_cursor_name, "|Offset|");
    assert_eq!(
        parsed.search.attribute_handling,
        AttributeHandling::ParameterNameSuffix
    );
    assert_eq!(parsed.headers.next_page, "Next-Page");
}

#[test]
fn cursor_keys_are_plain_strings_or_variables() {
    let parsed: ParsedConfiguration = serde_json::from_str(
        r#"{ "version": 1, "cursorEncryptionKey": { "variable": "MY_KEY" } }"#,
    )
    .unwrap();
    assert_eq!(
        parsed.cursor_encryption_key,
        Some(CursorKey(Secret::FromEnvironment {
            variable: Variable::from("MY_KEY")
        }))
    );

    let parsed: ParsedConfiguration =
        serde_json::from_str(r#"{ "version": 1, "cursorEncryptionKey": "hunter2" }"#).unwrap();
    assert_eq!(
        parsed.cursor_encryption_key,
        Some(CursorKey(Secret::Plain("hunter2".to_string())))
    );
}

#[test]
fn cursor_key_is_read_from_the_environment() {
    let environment = FixedEnvironment::from([(
        Variable::from("RESTQL_CURSOR_KEY"),
        "passphrase".to_string(),
    )]);

    let configuration =
        make_runtime_configuration(ParsedConfiguration::initial(), environment).unwrap();

    assert_eq!(configuration.request.cursor_key.as_deref(), Some("passphrase"));
}

#[test]
fn a_missing_cursor_key_variable_is_an_error() {
    let error = make_runtime_configuration(
        ParsedConfiguration::initial(),
        FixedEnvironment::default(),
    )
    .unwrap_err();

    assert!(matches!(
        error,
        MakeRuntimeConfigurationError::MissingEnvironmentVariable { .. }
    ));
    assert!(error.to_string().contains("RESTQL_CURSOR_KEY"));
}

#[test]
fn an_empty_cursor_key_is_rejected() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.cursor_encryption_key = Some(CursorKey(Secret::from("")));

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert!(matches!(error, MakeRuntimeConfigurationError::EmptyCursorKey));
}

#[test]
fn default_page_size_must_fit_the_maximum() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.pagination.default_page_size = 50;
    parsed.pagination.max_page_size = 20;

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert_eq!(
        error.to_string(),
        "defaultPageSize (50) must not exceed maxPageSize (20)"
    );
}

#[test]
fn parameter_names_must_be_distinct() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.pagination.index_cursor_name = "limit".to_string();

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert!(matches!(
        error,
        MakeRuntimeConfigurationError::DuplicateParameterName { name } if name == "limit"
    ));
}

#[test]
fn reserved_parameters_must_not_shadow_special_ones() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.pagination.reserved_parameters = vec!["fields".to_string(), "sort".to_string()];

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert!(matches!(
        error,
        MakeRuntimeConfigurationError::DuplicateParameterName { name } if name == "sort"
    ));
}

#[test]
fn empty_separators_are_rejected() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.search.enum_split = String::new();

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert_eq!(error.to_string(), "'search.enumSplit' must not be empty");
}

#[test]
fn header_names_must_be_valid() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.headers.next_page = "Next Page".to_string();

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert!(matches!(
        error,
        MakeRuntimeConfigurationError::InvalidHeaderName { name } if name == "Next Page"
    ));
}

#[test]
fn fields_cannot_be_named_like_the_offset_key() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.pagination.index_cursor_name = "offset".to_string();
    parsed.entities = vec![entity(
        "Order",
        vec![field("id", "id"), field("offset", "offset")],
    )];

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert!(matches!(
        error,
        MakeRuntimeConfigurationError::ReservedParameterName { entity, name }
            if entity == "Order" && name == "offset"
    ));
}

#[test]
fn schema_errors_name_the_entity() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.entities = vec![entity("Order", vec![field("id", "id"), field("id", "other_id")])];

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    match error {
        MakeRuntimeConfigurationError::Schema { entity, source } => {
            assert_eq!(entity, "Order");
            assert!(matches!(source, SchemaError::FieldClash { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn entities_are_built_once_and_looked_up_by_name() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.entities = vec![
        entity("Order", vec![field("id", "id")]),
        entity("Customer", vec![field("id", "id"), field("name", "name")]),
    ];

    let configuration = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap();

    let customer = configuration.entity("Customer").unwrap();
    assert_eq!(customer.fields().count(), 2);
    assert_eq!(customer.field("name").unwrap().field_type, FieldType::String);
    assert!(configuration.entity("Invoice").is_none());
}

#[test]
fn duplicate_entities_are_rejected() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.entities = vec![
        entity("Order", vec![field("id", "id")]),
        entity("Order", vec![field("id", "id")]),
    ];

    let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

    assert!(matches!(
        error,
        MakeRuntimeConfigurationError::DuplicateEntity(name) if name == "Order"
    ));
}

#[test]
fn field_names_must_be_addressable_as_parameters() {
    for (attribute_handling, name, marker) in [
        (AttributeHandling::ParameterNameSuffix, "line:no", ":"),
        (AttributeHandling::ParameterNameArrayNotation, "line[no]", "["),
    ] {
        let mut parsed = ParsedConfiguration::empty();
        parsed.search.attribute_handling = attribute_handling;
        parsed.entities = vec![entity("Order", vec![field("id", "id"), field(name, "line_no")])];

        let error = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap_err();

        assert!(
            matches!(
                &error,
                MakeRuntimeConfigurationError::UnaddressableFieldName { entity, name: found, marker: found_marker }
                    if entity == "Order" && found == name && found_marker == marker
            ),
            "{error}"
        );
    }

    let mut aliased = entity("Order", vec![field("id", "id")]);
    aliased.json_aliases.insert("order:id".to_string(), "id".to_string());
    let mut parsed = ParsedConfiguration::empty();
    parsed.entities = vec![aliased];
    assert!(matches!(
        make_runtime_configuration(parsed, FixedEnvironment::default()),
        Err(MakeRuntimeConfigurationError::UnaddressableFieldName { .. })
    ));

    // names are free when the operator is given in the value
    let mut parsed = ParsedConfiguration::empty();
    parsed.search.attribute_handling = AttributeHandling::ParameterValuePrefix;
    parsed.entities = vec![entity("Order", vec![field("line:no", "line_no")])];
    assert!(make_runtime_configuration(parsed, FixedEnvironment::default()).is_ok());
}

#[test]
fn entities_can_select_distinct_rows() {
    let mut parsed: ParsedConfiguration = serde_json::from_value(serde_json::json!({
        "version": 1,
        "entities": [{
            "name": "Order",
            "table": { "name": "order" },
            "distinct": true,
            "fields": [{ "jsonName": "id", "column": "id", "type": "long" }],
        }],
    }))
    .unwrap();
    assert!(parsed.entities[0].distinct);
    parsed.entities.push(entity("Customer", vec![field("id", "id")]));

    let configuration = make_runtime_configuration(parsed, FixedEnvironment::default()).unwrap();

    assert!(configuration.entity("Order").unwrap().is_distinct());
    assert!(!configuration.entity("Customer").unwrap().is_distinct());
}

#[tokio::test]
async fn written_configuration_parses_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut parsed = ParsedConfiguration::initial();
    parsed.pagination.default_page_size = 20;
    parsed.entities = vec![entity("Order", vec![field("id", "id")])];

    write_parsed_configuration(parsed.clone(), dir.path())
        .await
        .unwrap();

    assert!(dir.path().join(CONFIGURATION_JSONSCHEMA_FILENAME).is_file());
    assert_eq!(parse_configuration(dir.path()).await.unwrap(), parsed);
}

#[tokio::test]
async fn unsupported_versions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        dir.path().join(CONFIGURATION_FILENAME),
        r#"{ "version": 2 }"#,
    )
    .await
    .unwrap();

    let error = parse_configuration(dir.path()).await.unwrap_err();

    assert_eq!(error.to_string(), "unsupported configuration version: 2");
}

#[tokio::test]
async fn parse_errors_carry_a_position() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(
        dir.path().join(CONFIGURATION_FILENAME),
        "{\n  \"version\": 1,\n  \"dialect\": \"oracle\"\n}",
    )
    .await
    .unwrap();

    let error = parse_configuration(dir.path()).await.unwrap_err();

    assert!(
        matches!(
            error,
            restql_configuration::error::ParseConfigurationError::ParseError { line: 3, .. }
        ),
        "{error}"
    );
}

#[test]
fn the_written_schema_accepts_the_initial_configuration() {
    let schema = serde_json::to_value(schemars::schema_for!(ParsedConfiguration)).unwrap();
    let compiled = jsonschema::JSONSchema::compile(&schema).unwrap();

    let instance = serde_json::to_value(ParsedConfiguration::initial()).unwrap();

    assert!(compiled.is_valid(&instance));
}
