//! Execute an execution plan against the database.

use tracing::{info_span, Instrument};

use query_engine_sql::sql::execution_plan::{ExecutionPlan, PreparedStatement};

use crate::database::Database;
use crate::error::Error;
use crate::metrics;

/// The rows of one page, and how many rows match the query in total.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub total: u64,
    pub rows: Vec<serde_json::Value>,
}

/// Count the matching rows, then fetch the rows of the page.
/// Pages past the last row are not fetched.
pub async fn execute(
    database: &dyn Database,
    metrics: &metrics::Metrics,
    plan: &ExecutionPlan,
) -> Result<QueryResult, Error> {
    let timer = metrics.query_duration_seconds.start_timer();
    let result = execute_plan(database, plan).await;
    timer.observe_duration();

    match &result {
        Ok(_) => metrics.query_total.inc(),
        Err(_) => metrics.query_errors_total.inc(),
    }
    result
}

async fn execute_plan(database: &dyn Database, plan: &ExecutionPlan) -> Result<QueryResult, Error> {
    let count = plan.count_statement(database.dialect())?;
    log_statement("count", &count);
    let total = database
        .count(&count)
        .instrument(info_span!("Count rows"))
        .await?;
    let total = u64::try_from(total).map_err(|_| Error::InvalidCount(total))?;

    if plan.window.offset >= total {
        tracing::debug!(total, offset = plan.window.offset, "page is past the last row");
        return Ok(QueryResult {
            total,
            rows: vec![],
        });
    }

    let rows = database.rows_statement(plan)?;
    log_statement("rows", &rows);
    let rows = database
        .fetch(&rows)
        .instrument(info_span!("Fetch rows", total))
        .await?;

    Ok(QueryResult { total, rows })
}

fn log_statement(statement: &str, prepared: &PreparedStatement) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        tracing::debug!(
            statement,
            sql = pretty_sql(&prepared.sql),
            params = prepared.params.len(),
            "running statement"
        );
    }
}

/// Format SQL for logs and the command line.
pub fn pretty_sql(sql: &str) -> String {
    sqlformat::format(
        sql,
        &sqlformat::QueryParams::None,
        sqlformat::FormatOptions::default(),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use similar_asserts::assert_eq;

    use query_engine_sql::sql::execution_plan::{BindValue, PreparedStatement};
    use query_engine_sql::sql::string::Dialect;
    use query_engine_translation::translation::cursor::CursorCodec;
    use query_engine_translation::translation::parameters::QueryParameters;
    use query_engine_translation::translation::query::translate;
    use query_engine_translation::translation::request::ParameterParser;

    use super::*;

    /// Answers with fixed results and remembers the statements it ran.
    struct FakeDatabase {
        total: i64,
        rows: Vec<serde_json::Value>,
        statements: Mutex<Vec<PreparedStatement>>,
    }

    impl FakeDatabase {
        fn new(total: i64, rows: Vec<serde_json::Value>) -> Self {
            FakeDatabase {
                total,
                rows,
                statements: Mutex::new(vec![]),
            }
        }

        fn statements(&self) -> Vec<PreparedStatement> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Database for FakeDatabase {
        fn dialect(&self) -> Dialect {
            Dialect::Postgres
        }

        async fn count(&self, statement: &PreparedStatement) -> Result<i64, Error> {
            self.statements.lock().unwrap().push(statement.clone());
            Ok(self.total)
        }

        async fn fetch(
            &self,
            statement: &PreparedStatement,
        ) -> Result<Vec<serde_json::Value>, Error> {
            self.statements.lock().unwrap().push(statement.clone());
            Ok(self.rows.clone())
        }
    }

    fn plan(query: &str) -> ExecutionPlan {
        let schema = tests_common::schemas::order_schema();
        let settings = tests_common::settings::paged(20, 100);
        let codec = CursorCodec::new(&settings);
        let request = ParameterParser::new(&schema, &settings, &codec)
            .parse(&QueryParameters::from_query_string(query))
            .unwrap();
        translate(&schema, &request).unwrap()
    }

    fn metrics() -> metrics::Metrics {
        metrics::Metrics::initialize(&mut prometheus::Registry::new()).unwrap()
    }

    #[tokio::test]
    async fn counts_before_fetching() {
        let database = FakeDatabase::new(3, vec![serde_json::json!({"id": 1})]);
        let metrics = metrics();

        let result = execute(&database, &metrics, &plan("customerId=42"))
            .await
            .unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.rows, vec![serde_json::json!({"id": 1})]);

        let statements = database.statements();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].sql.starts_with("SELECT COUNT(*)"));
        assert!(statements[1].sql.ends_with(" LIMIT 20"));
        assert_eq!(
            statements[1].params,
            vec![("customerId".to_string(), BindValue::BigInt(42))]
        );
        assert_eq!(metrics.query_total.get(), 1);
    }

    #[tokio::test]
    async fn pages_past_the_end_are_not_fetched() {
        let database = FakeDatabase::new(0, vec![serde_json::json!({"id": 1})]);

        let result = execute(&database, &metrics(), &plan("customerId=42"))
            .await
            .unwrap();

        assert_eq!(result.rows, Vec::<serde_json::Value>::new());
        assert_eq!(database.statements().len(), 1);
    }

    #[tokio::test]
    async fn negative_counts_are_errors() {
        let database = FakeDatabase::new(-1, vec![]);
        let metrics = metrics();

        let error = execute(&database, &metrics, &plan("")).await.unwrap_err();

        assert!(matches!(error, Error::InvalidCount(-1)));
        assert_eq!(metrics.query_errors_total.get(), 1);
    }

    #[test]
    fn sql_is_formatted_for_logs() {
        let sql = pretty_sql("SELECT \"o\".\"id\" FROM \"order\" AS \"o\" LIMIT 20");
        assert!(sql.starts_with("SELECT\n"));
        assert!(sql.contains("\nFROM\n"));
    }
}
