//! Configuration for the query engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use query_engine_metadata::metadata::EntitySchema;
use query_engine_sql::sql::string::Dialect;

use crate::settings::RequestSettings;

/// The 'Configuration' type collects all the information necessary to serve queries at runtime.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration'. Entity schemas are built once here and shared.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub dialect: Dialect,
    pub request: RequestSettings,
    pub entities: BTreeMap<String, Arc<EntitySchema>>,
}

impl Configuration {
    pub fn entity(&self, name: &str) -> Option<&Arc<EntitySchema>> {
        self.entities.get(name)
    }
}
