//! The CLI can do a few things. This provides a central point where those things are routed and
//! then done, making it easier to test this crate deterministically.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context as _};
use clap::Subcommand;
use tokio::fs;

use query_engine_sql::sql::string::Dialect;
use query_engine_translation::translation::cursor::CursorCodec;
use query_engine_translation::translation::parameters::QueryParameters;
use query_engine_translation::translation::query::translate;
use query_engine_translation::translation::request::ParameterParser;
use restql_configuration::environment::Environment;
use restql_configuration::version1::CONFIGURATION_FILENAME;
use restql_configuration::{self as configuration, Configuration, ParsedConfiguration};

/// The various contextual bits and bobs we need to run.
pub struct Context<Env: Environment> {
    pub context_path: PathBuf,
    pub environment: Env,
}

/// The command invoked by the user.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write an initial configuration and its JSON schema into the context directory.
    Initialize,
    /// Print the JSON schema of the configuration file.
    PrintSchema,
    /// Print the SQL a request for an entity translates to.
    Translate {
        /// The entity to query.
        entity: String,
        /// The query string of the request, without the leading `?`.
        #[arg(default_value = "")]
        query: String,
        /// Render for another dialect than the configured one.
        #[arg(long, value_enum)]
        dialect: Option<DialectArg>,
        /// Lay the SQL out over several lines.
        #[arg(long)]
        pretty: bool,
    },
    /// Print the parameters a cursor holds.
    DecodeCursor { token: String },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum DialectArg {
    Postgres,
    Mysql,
    Sqlite,
    Generic,
}

impl From<DialectArg> for Dialect {
    fn from(value: DialectArg) -> Self {
        match value {
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Generic => Dialect::Generic,
        }
    }
}

/// Run a command in a given directory, returning what it prints.
pub async fn run(command: Command, context: Context<impl Environment>) -> anyhow::Result<String> {
    match command {
        Command::Initialize => initialize(&context.context_path).await,
        Command::PrintSchema => print_schema(),
        Command::Translate {
            entity,
            query,
            dialect,
            pretty,
        } => {
            let configuration = load(&context).await?;
            translate_request(
                &configuration,
                &entity,
                &query,
                dialect.map_or(configuration.dialect, Dialect::from),
                pretty,
            )
        }
        Command::DecodeCursor { token } => {
            let configuration = load(&context).await?;
            decode_cursor(&configuration, &token)
        }
    }
}

/// Initialize an empty directory with an initial configuration.
async fn initialize(context_path: &Path) -> anyhow::Result<String> {
    if fs::try_exists(context_path.join(CONFIGURATION_FILENAME)).await? {
        bail!("A configuration already exists in {}", context_path.display());
    }
    fs::create_dir_all(context_path).await?;
    configuration::write_parsed_configuration(ParsedConfiguration::initial(), context_path)
        .await?;
    Ok(format!("Wrote a configuration to {}\n", context_path.display()))
}

fn print_schema() -> anyhow::Result<String> {
    let schema = schemars::schema_for!(ParsedConfiguration);
    Ok(serde_json::to_string_pretty(&schema)? + "\n")
}

async fn load(context: &Context<impl Environment>) -> anyhow::Result<Configuration> {
    let parsed = configuration::parse_configuration(&context.context_path)
        .await
        .context("cannot read the configuration")?;
    configuration::make_runtime_configuration(parsed, &context.environment)
        .context("the configuration is invalid")
}

fn translate_request(
    configuration: &Configuration,
    entity: &str,
    query: &str,
    dialect: Dialect,
    pretty: bool,
) -> anyhow::Result<String> {
    let schema = configuration
        .entity(entity)
        .ok_or_else(|| anyhow!("unknown entity '{entity}'"))?;
    let codec = CursorCodec::new(&configuration.request);
    let parameters = QueryParameters::from_query_string(query.trim_start_matches('?'));

    let request = ParameterParser::new(schema, &configuration.request, &codec).parse(&parameters)?;
    let plan = translate(schema, &request)?;
    let count = plan.count_statement(dialect)?;
    let rows = plan.rows_statement(dialect)?;

    let layout = |sql: &str| {
        if pretty {
            sqlformat::format(sql, &sqlformat::QueryParams::None, sqlformat::FormatOptions::default())
        } else {
            sql.to_string()
        }
    };

    let mut output = format!("{}\n\n{}\n", layout(&count.sql), layout(&rows.sql));
    if !rows.params.is_empty() {
        output.push('\n');
    }
    for (name, value) in &rows.params {
        output.push_str(&format!("{name} = {value}\n"));
    }
    Ok(output)
}

fn decode_cursor(configuration: &Configuration, token: &str) -> anyhow::Result<String> {
    let codec = CursorCodec::new(&configuration.request);
    let parameters = codec.decode(token)?;
    Ok(parameters
        .pairs()
        .map(|(key, value)| format!("{key} = {value}\n"))
        .collect())
}
