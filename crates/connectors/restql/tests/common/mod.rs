//! Common functions used across test cases.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use query_engine_execution::database::Database;
use query_engine_execution::error::Error;
use query_engine_metadata::metadata::EntitySchema;
use query_engine_sql::sql::execution_plan::PreparedStatement;
use query_engine_sql::sql::string::Dialect;
use restql::state::State;
use restql_configuration::{Configuration, RequestSettings};

/// Counts `total` rows and returns `rows` for any statement, remembering the SQL it was given.
#[derive(Debug, Default)]
pub struct FakeDatabase {
    pub total: i64,
    pub rows: Vec<serde_json::Value>,
    statements: Mutex<Vec<String>>,
}

impl FakeDatabase {
    pub fn new(total: i64, rows: Vec<serde_json::Value>) -> Self {
        FakeDatabase {
            total,
            rows,
            statements: Mutex::default(),
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Database for FakeDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn count(&self, statement: &PreparedStatement) -> Result<i64, Error> {
        self.statements.lock().unwrap().push(statement.sql.clone());
        Ok(self.total)
    }

    async fn fetch(&self, statement: &PreparedStatement) -> Result<Vec<serde_json::Value>, Error> {
        self.statements.lock().unwrap().push(statement.sql.clone());
        Ok(self.rows.clone())
    }
}

/// A state serving the `Order` entity from `database`.
pub fn create_state(settings: RequestSettings, database: Arc<FakeDatabase>) -> State {
    create_state_for(tests_common::schemas::order_schema(), settings, database)
}

/// A state serving `schema` as the `Order` entity.
pub fn create_state_for(
    schema: EntitySchema,
    settings: RequestSettings,
    database: Arc<FakeDatabase>,
) -> State {
    tests_common::init_tracing();
    let configuration = Configuration {
        dialect: Dialect::Postgres,
        request: settings,
        entities: BTreeMap::from([(
            "Order".to_string(),
            Arc::new(schema),
        )]),
    };
    State::new(
        Arc::new(configuration),
        database,
        &mut prometheus::Registry::new(),
    )
    .unwrap()
}
