//! Serve a query: parse the request, count and fetch the rows, and link the other pages.

use http::{HeaderMap, Request, Response, Uri};
use tracing::info_span;

use query_engine_execution::query::execute;
use query_engine_translation::translation::error::Error as TranslationError;
use query_engine_translation::translation::pagination::PaginationController;
use query_engine_translation::translation::parameters::QueryParameters;
use query_engine_translation::translation::query::translate;
use query_engine_translation::translation::request::ParameterParser;

use crate::error::{Error, ErrorResponse};
use crate::headers::pagination_headers;
use crate::state::State;

/// The rows of a page and the headers that lead to the other pages.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResponse {
    pub total: u64,
    pub rows: Vec<serde_json::Value>,
    pub headers: HeaderMap,
}

/// Run the query of `entity` described by the query string of `uri`.
pub async fn query(state: &State, entity: &str, uri: &Uri) -> Result<QueryResponse, Error> {
    let configuration = &state.configuration;
    let settings = &configuration.request;
    let schema = configuration
        .entity(entity)
        .ok_or_else(|| Error::UnknownEntity(entity.to_string()))?;

    let parameters = QueryParameters::from_query_string(uri.query().unwrap_or_default());

    let request = info_span!("Parse parameters", entity).in_scope(|| {
        ParameterParser::new(schema, settings, &state.codec)
            .parse(&parameters)
            .inspect_err(|error| {
                if matches!(
                    error,
                    TranslationError::InvalidCursor { .. } | TranslationError::EncryptionFailure { .. }
                ) {
                    tracing::warn!(%error, "rejected cursor");
                }
            })
    })?;

    let plan = translate(schema, &request)?;
    let result = execute(state.database.as_ref(), &state.metrics, &plan).await?;

    let links = PaginationController::new(&state.codec, &settings.headers)
        .links(&request, result.total)?;
    let headers = pagination_headers(uri, &links)?;

    Ok(QueryResponse {
        total: result.total,
        rows: result.rows,
        headers,
    })
}

/// Answer a request with the rows as a JSON array, or with an error body.
pub async fn respond<B>(
    state: &State,
    entity: &str,
    request: &Request<B>,
) -> Response<serde_json::Value> {
    match query(state, entity, request.uri()).await {
        Ok(response) => {
            let mut http_response = Response::new(serde_json::Value::Array(response.rows));
            *http_response.headers_mut() = response.headers;
            http_response
        }
        Err(error) => {
            if error.status().is_server_error() {
                tracing::error!(
                    meta.signal_type = "log",
                    event.domain = "restql",
                    event.name = "Query error",
                    name = "Query error",
                    body = %error,
                    error = true,
                );
            }
            let body = ErrorResponse::new(request.method(), request.uri(), &error);
            let mut http_response = Response::new(
                serde_json::to_value(&body).unwrap_or(serde_json::Value::Null),
            );
            *http_response.status_mut() = error.status();
            http_response
        }
    }
}

