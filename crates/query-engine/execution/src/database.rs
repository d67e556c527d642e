//! The database a plan runs against.

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Postgres, Row};

use query_engine_sql::sql::execution_plan::{
    BindValue, ExecutionPlan, PreparedStatement, UnboundParameter,
};
use query_engine_sql::sql::string::Dialect;

use crate::error::Error;

/// Runs prepared statements. Implemented for Postgres, and by fakes in tests.
#[async_trait]
pub trait Database: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// The statement that fetches the rows of a page, each as a json object.
    fn rows_statement(&self, plan: &ExecutionPlan) -> Result<PreparedStatement, UnboundParameter> {
        plan.rows_statement(self.dialect())
    }

    /// Run a `SELECT COUNT(*)` statement.
    async fn count(&self, statement: &PreparedStatement) -> Result<i64, Error>;

    async fn fetch(&self, statement: &PreparedStatement) -> Result<Vec<serde_json::Value>, Error>;
}

/// Settings for the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    /// Seconds to wait for a free connection.
    pub pool_timeout: u64,
    pub idle_timeout: Option<u64>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_connections: 50,
            pool_timeout: 30,
            idle_timeout: Some(180),
        }
    }
}

/// A Postgres database behind a connection pool.
#[derive(Debug, Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    /// Create a connection pool with the given settings.
    /// - <https://docs.rs/sqlx/latest/sqlx/pool/struct.PoolOptions.html>
    pub async fn connect(url: &str, settings: PoolSettings) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(std::time::Duration::from_secs(settings.pool_timeout))
            .idle_timeout(settings.idle_timeout.map(std::time::Duration::from_secs))
            .connect(url)
            .await?;
        Ok(PostgresDatabase { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        PostgresDatabase { pool }
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn rows_statement(&self, plan: &ExecutionPlan) -> Result<PreparedStatement, UnboundParameter> {
        plan.json_rows_statement()
    }

    async fn count(&self, statement: &PreparedStatement) -> Result<i64, Error> {
        let row = build_query(statement).fetch_one(&self.pool).await?;
        Ok(row.try_get(0)?)
    }

    async fn fetch(&self, statement: &PreparedStatement) -> Result<Vec<serde_json::Value>, Error> {
        let rows: Vec<PgRow> = build_query(statement).fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| row.try_get::<serde_json::Value, _>(0).map_err(Error::from))
            .collect()
    }
}

/// Bind the parameters of a statement in placeholder order.
fn build_query(statement: &PreparedStatement) -> Query<'_, Postgres, PgArguments> {
    let mut query = sqlx::query(&statement.sql);
    for (_, value) in &statement.params {
        query = match value.clone() {
            BindValue::Text(text) => query.bind(text),
            BindValue::Boolean(boolean) => query.bind(boolean),
            BindValue::Integer(integer) => query.bind(integer),
            BindValue::BigInt(integer) => query.bind(integer),
            BindValue::Decimal(decimal) => query.bind(decimal),
            BindValue::Uuid(uuid) => query.bind(uuid),
            BindValue::Date(date) => query.bind(date),
            BindValue::Timestamp(timestamp) => query.bind(timestamp),
            BindValue::TimestampTz(timestamp) => query.bind(timestamp),
        };
    }
    query
}
