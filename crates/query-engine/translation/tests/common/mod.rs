use std::fs;
use std::path::PathBuf;

use query_engine_metadata::metadata::EntitySchema;
use query_engine_sql::sql::execution_plan::{ExecutionPlan, PreparedStatement};
use query_engine_sql::sql::string::Dialect;
use query_engine_translation::translation;
use query_engine_translation::translation::cursor::CursorCodec;
use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::parameters::QueryParameters;
use query_engine_translation::translation::request::{ParameterParser, ParsedRequest};
use restql_configuration::RequestSettings;

/// Translate `tests/goldenfiles/<testname>/request.txt` against the configuration next to
/// it. The request is `<Entity>?<query>`.
pub async fn test_translation(testname: &str) -> anyhow::Result<String> {
    let directory = PathBuf::from("tests/goldenfiles").join(testname);
    let configuration = tests_common::configuration::load(&directory).await?;

    let request = fs::read_to_string(directory.join("request.txt"))?;
    let (entity, query) = request.trim().split_once('?').unwrap_or((request.trim(), ""));
    let schema = configuration
        .entity(entity)
        .ok_or_else(|| anyhow::anyhow!("unknown entity {entity}"))?;

    let codec = CursorCodec::new(&configuration.request);
    let parsed = ParameterParser::new(schema, &configuration.request, &codec)
        .parse(&QueryParameters::from_query_string(query))?;
    let plan = translation::query::translate(schema, &parsed)?;

    let count = plan.count_statement(configuration.dialect)?;
    let rows = plan.rows_statement(configuration.dialect)?;
    Ok(format!(
        "{}\n\n{}\n\n{}",
        count.sql,
        rows.sql,
        describe_params(&rows)
    ))
}

pub fn describe_params(statement: &PreparedStatement) -> String {
    statement
        .params
        .iter()
        .enumerate()
        .map(|(index, (name, value))| format!("${} {name} = {value}", index + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn parse(
    schema: &EntitySchema,
    settings: &RequestSettings,
    query: &str,
) -> Result<ParsedRequest, Error> {
    let codec = CursorCodec::new(settings);
    ParameterParser::new(schema, settings, &codec).parse(&QueryParameters::from_query_string(query))
}

pub fn plan(schema: &EntitySchema, settings: &RequestSettings, query: &str) -> ExecutionPlan {
    let request = parse(schema, settings, query).expect("the request is valid");
    translation::query::translate(schema, &request).expect("the request translates")
}

pub fn rows_sql(plan: &ExecutionPlan) -> String {
    plan.rows_statement(Dialect::Generic)
        .expect("every placeholder is bound")
        .sql
}

pub fn join_aliases(plan: &ExecutionPlan) -> Vec<String> {
    plan.rows
        .joins
        .iter()
        .map(|join| join.alias().name.clone())
        .collect()
}
