//! Errors for request translation.

use query_engine_metadata::metadata::JoinClosureMismatch;
use query_engine_sql::sql::execution_plan::UnboundParameter;
use thiserror::Error;

use super::comparison::ComparisonType;
use super::request::parse_state::ParseState;

/// A type for translation errors.
///
/// Everything but the last three variants is caused by the request and should be
/// reported to the client as such.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown parameter '{parameter}'")]
    UnknownParameter { parameter: String },

    #[error("'{parameter}' cannot be used in a request: {reason}")]
    IgnoredFieldFilter {
        parameter: String,
        reason: &'static str,
    },

    #[error("'{value}' is not a valid {expected} value for '{parameter}'")]
    TypeCoercionFailure {
        parameter: String,
        value: String,
        expected: String,
    },

    #[error("{operator} cannot be used on '{parameter}': {reason}")]
    UnsupportedOperatorForType {
        parameter: String,
        operator: ComparisonType,
        reason: &'static str,
    },

    #[error("'{attribute}' is not a known operator (used on '{parameter}')")]
    UnknownOperator {
        parameter: String,
        attribute: String,
    },

    #[error("'{parameter}' does not take an operator")]
    AttributeNotAllowed { parameter: String },

    #[error("NULL cannot be used with {operator} on '{parameter}'")]
    InvalidNullUsage {
        parameter: String,
        operator: ComparisonType,
    },

    #[error("'{parameter}' needs a value")]
    EmptyValue { parameter: String },

    #[error("'{value}' is not allowed for '{parameter}'")]
    RestrictedValue { parameter: String, value: String },

    #[error("invalid sort '{value}': {reason}")]
    InvalidSort {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("invalid page size '{value}': {reason}")]
    InvalidPageSize {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("'{parameter}' cannot be combined with '{cursor}', the cursor already holds the query")]
    CursorConflict { parameter: String, cursor: String },

    #[error("Cannot have '{parameter}' twice: Feature is not implemented")]
    DuplicateParameterUnsupported { parameter: String },

    #[error("invalid cursor '{parameter}': {reason}")]
    InvalidCursor { parameter: String, reason: String },

    #[error("cursor '{parameter}' cannot be read: {reason}")]
    EncryptionFailure { parameter: String, reason: String },

    #[error("cannot {action} while in state {state:?}")]
    InvalidStateTransition {
        state: ParseState,
        action: &'static str,
    },

    #[error(transparent)]
    JoinClosureMismatch(#[from] JoinClosureMismatch),

    #[error(transparent)]
    UnboundParameter(#[from] UnboundParameter),
}

impl Error {
    /// The request parameter the error is about, if any.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Error::UnknownParameter { parameter }
            | Error::IgnoredFieldFilter { parameter, .. }
            | Error::TypeCoercionFailure { parameter, .. }
            | Error::UnsupportedOperatorForType { parameter, .. }
            | Error::UnknownOperator { parameter, .. }
            | Error::AttributeNotAllowed { parameter }
            | Error::InvalidNullUsage { parameter, .. }
            | Error::EmptyValue { parameter }
            | Error::RestrictedValue { parameter, .. }
            | Error::InvalidSort { parameter, .. }
            | Error::InvalidPageSize { parameter, .. }
            | Error::CursorConflict { parameter, .. }
            | Error::DuplicateParameterUnsupported { parameter }
            | Error::InvalidCursor { parameter, .. }
            | Error::EncryptionFailure { parameter, .. } => Some(parameter),
            Error::InvalidStateTransition { .. }
            | Error::JoinClosureMismatch(_)
            | Error::UnboundParameter(_) => None,
        }
    }

    /// Whether the request is at fault, rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Error::InvalidStateTransition { .. }
                | Error::JoinClosureMismatch(_)
                | Error::UnboundParameter(_)
        )
    }
}
