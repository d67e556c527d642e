//! Load configuration directories the way the service does.

use std::path::Path;

use restql_configuration::environment::FixedEnvironment;
use restql_configuration::{make_runtime_configuration, parse_configuration, Configuration};

use crate::settings::CURSOR_KEY;

/// Parse and resolve the configuration in `directory`. `RESTQL_CURSOR_KEY` is set
/// to [`CURSOR_KEY`].
pub async fn load(directory: impl AsRef<Path>) -> anyhow::Result<Configuration> {
    let parsed = parse_configuration(directory).await?;
    let configuration = make_runtime_configuration(
        parsed,
        FixedEnvironment::from([("RESTQL_CURSOR_KEY".into(), CURSOR_KEY.to_string())]),
    )?;
    Ok(configuration)
}
