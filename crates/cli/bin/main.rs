//! The restql command line. Logs go to stderr, filtered by `RUST_LOG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use restql_cli::{run, Command, Context};
use restql_configuration::environment::ProcessEnvironment;

/// The command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "restql-cli",
    version,
    about = "Inspect restql configurations, requests and cursors"
)]
struct Args {
    /// The directory holding configuration.json.
    #[arg(
        long = "context",
        env = "RESTQL_CONFIGURATION_DIRECTORY",
        value_name = "DIRECTORY",
        default_value = "."
    )]
    context_path: PathBuf,
    /// The command to invoke.
    #[command(subcommand)]
    subcommand: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let context = Context {
        context_path: args.context_path,
        environment: ProcessEnvironment,
    };
    match run(args.subcommand, context).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
