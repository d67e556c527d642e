//! Transient state used by the service.
//!
//! This is initialized on startup.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info_span, Instrument};

use query_engine_execution::database::{Database, PoolSettings, PostgresDatabase};
use query_engine_execution::metrics;
use query_engine_sql::sql::string::Dialect;
use query_engine_translation::translation::cursor::CursorCodec;
use restql_configuration::environment::{self, Environment, Variable};
use restql_configuration::Configuration;

/// The environment variable the database connection string is read from.
pub const DATABASE_URL_VARIABLE: &str = "RESTQL_DATABASE_URL";

/// State shared by every request.
#[derive(Clone)]
pub struct State {
    pub configuration: Arc<Configuration>,
    pub codec: CursorCodec,
    pub metrics: metrics::Metrics,
    pub database: Arc<dyn Database>,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("configuration", &self.configuration)
            .field("codec", &self.codec)
            .finish_non_exhaustive()
    }
}

impl State {
    /// Wrap an existing database, registering the metrics.
    pub fn new(
        configuration: Arc<Configuration>,
        database: Arc<dyn Database>,
        metrics_registry: &mut prometheus::Registry,
    ) -> Result<State, InitializationError> {
        let metrics = metrics::Metrics::initialize(metrics_registry)
            .map_err(InitializationError::MetricsError)?;
        Ok(State {
            codec: CursorCodec::new(&configuration.request),
            configuration,
            metrics,
            database,
        })
    }
}

/// Create a connection pool and wrap it inside a State.
pub async fn create_state(
    configuration: Arc<Configuration>,
    environment: &impl Environment,
    metrics_registry: &mut prometheus::Registry,
) -> Result<State, InitializationError> {
    if configuration.dialect != Dialect::Postgres {
        return Err(InitializationError::UnsupportedDialect(configuration.dialect));
    }

    let url = environment
        .read(&Variable::from(DATABASE_URL_VARIABLE))
        .map_err(InitializationError::MissingConnectionUri)?;

    let database = PostgresDatabase::connect(&url, PoolSettings::default())
        .instrument(info_span!("Create connection pool"))
        .await
        .map_err(InitializationError::UnableToCreatePool)?;

    let _span = info_span!("Setup metrics").entered();
    State::new(configuration, Arc::new(database), metrics_registry)
}

/// State initialization error.
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("unable to initialize connection pool: {0}")]
    UnableToCreatePool(sqlx::Error),
    #[error("error initializing metrics: {0}")]
    MetricsError(prometheus::Error),
    #[error("the database connection string is missing: {0}")]
    MissingConnectionUri(environment::Error),
    #[error("queries can only be run against Postgres, not {0:?}")]
    UnsupportedDialect(Dialect),
}
