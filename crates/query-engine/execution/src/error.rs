//! Errors for query execution.

use query_engine_sql::sql::execution_plan::UnboundParameter;
use thiserror::Error;

/// Query execution error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    UnboundParameter(#[from] UnboundParameter),
    #[error("the count query returned {0} rows")]
    InvalidCount(i64),
    #[error("database error: {0}")]
    DB(#[from] sqlx::Error),
}
