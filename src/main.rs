// ABOUTME: Entry point for the rowkeep binary.
// ABOUTME: Loads .env, initializes tracing on stderr, parses CLI arguments, and runs one command.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use rowkeep_cli::{Cli, RowkeepConfig};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // A missing .env file is the common case.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rowkeep=warn,rowkeep_store=warn,rowkeep_cli=warn"));
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();

    match execute(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn execute(cli: Cli) -> anyhow::Result<bool> {
    let config = RowkeepConfig::from_env().context("loading ROWKEEP_* configuration")?;
    tracing::debug!("rowkeep starting with {:?}", config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let found = rowkeep_cli::run(cli, config, stdin.lock(), stdout.lock())?;
    Ok(found)
}
