//! Errors of the query service, and the body they are reported with.

use chrono::{DateTime, Utc};
use http::{Method, StatusCode, Uri};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use query_engine_execution::error::Error as ExecutionError;
use query_engine_translation::translation::error::Error as TranslationError;

/// Anything that can go wrong while serving a query.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),
    #[error(transparent)]
    Translation(#[from] TranslationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("invalid pagination header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
    #[error("invalid pagination header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::UnknownEntity(_) => StatusCode::NOT_FOUND,
            Error::Translation(error) if error.is_client_error() => StatusCode::BAD_REQUEST,
            Error::Translation(_)
            | Error::Execution(_)
            | Error::InvalidHeaderName(_)
            | Error::InvalidHeaderValue(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// A short machine readable reason.
    pub fn reason(&self) -> &'static str {
        match self.status() {
            StatusCode::NOT_FOUND => "notFound",
            StatusCode::BAD_REQUEST => "invalidQuery",
            _ => "internalError",
        }
    }

    /// The message shown to the client. Internal faults are not described.
    pub fn client_message(&self) -> String {
        if self.status().is_server_error() {
            "the request could not be processed".to_string()
        } else {
            self.to_string()
        }
    }

    /// The request parameter at fault, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Error::Translation(error) if error.is_client_error() => error.parameter(),
            _ => None,
        }
    }
}

/// The JSON body of a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub http_method: String,
    pub request_uri: String,
    pub status_code: u16,
    pub status_code_text: String,
    pub errors: Vec<ErrorMessage>,
    pub error_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub reason: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl ErrorResponse {
    pub fn new(method: &Method, uri: &Uri, error: &Error) -> Self {
        Self::at(method, uri, error, Utc::now())
    }

    pub fn at(method: &Method, uri: &Uri, error: &Error, error_date_time: DateTime<Utc>) -> Self {
        let status = error.status();
        ErrorResponse {
            http_method: method.to_string(),
            request_uri: uri.to_string(),
            status_code: status.as_u16(),
            status_code_text: status.canonical_reason().unwrap_or_default().to_string(),
            errors: vec![ErrorMessage {
                reason: error.reason().to_string(),
                message: error.client_message(),
                parameter: error.parameter().map(ToString::to_string),
            }],
            error_date_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    #[test]
    fn client_errors_are_bad_requests() {
        let error = Error::from(TranslationError::UnknownParameter {
            parameter: "colour".to_string(),
        });
        let uri: Uri = "http://localhost/orders?colour=red".parse().unwrap();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let response = ErrorResponse::at(&Method::GET, &uri, &error, at);

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "httpMethod": "GET",
                "requestUri": "http://localhost/orders?colour=red",
                "statusCode": 400,
                "statusCodeText": "Bad Request",
                "errors": [{
                    "reason": "invalidQuery",
                    "message": "unknown parameter 'colour'",
                    "parameter": "colour"
                }],
                "errorDateTime": "2024-05-01T12:00:00Z"
            })
        );
    }

    #[test]
    fn internal_errors_are_not_described() {
        let error = Error::from(TranslationError::UnboundParameter(
            query_engine_sql::sql::execution_plan::UnboundParameter("id".to_string()),
        ));
        let uri: Uri = "/orders".parse().unwrap();

        let response = ErrorResponse::new(&Method::GET, &uri, &error);

        assert_eq!(response.status_code, 500);
        assert_eq!(response.errors[0].reason, "internalError");
        assert_eq!(response.errors[0].message, "the request could not be processed");
        assert_eq!(response.errors[0].parameter, None);
    }

    #[test]
    fn unknown_entities_are_not_found() {
        let error = Error::UnknownEntity("Ship".to_string());
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert_eq!(error.reason(), "notFound");
    }
}
