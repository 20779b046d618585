// ABOUTME: Top-level driver that applies configuration and CLI flags, then runs one subcommand.
// ABOUTME: Output goes to a caller-supplied writer so whole invocations can be tested in memory.

use std::io::{BufRead, Write};
use std::path::Path;

use rowkeep_core::{Command, Header, Record, ValidationError};
use rowkeep_store::{EnsureOutcome, HeaderPolicy, StoreError, TableStore};
use thiserror::Error;

use crate::args::{Cli, CliCommand};
use crate::config::{ConfigError, RowkeepConfig, parse_delimiter};
use crate::dispatch::{Outcome, dispatch, split_fields};
use crate::shell::Shell;

/// Errors surfaced by a rowkeep invocation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no table path given")]
    EmptyPath,
}

/// Fold command-line overrides into the environment configuration.
pub fn apply_overrides(cli: &Cli, mut config: RowkeepConfig) -> Result<RowkeepConfig, CliError> {
    if let Some(raw) = &cli.delimiter {
        config.delimiter = parse_delimiter(raw)?;
    }
    if cli.strict_header {
        config.header_policy = HeaderPolicy::Strict;
    }
    Ok(config)
}

/// Run one invocation. Returns `Ok(false)` when an update or delete matched
/// nothing, so the caller can pick an exit status.
pub fn run<R: BufRead, W: Write>(
    cli: Cli,
    config: RowkeepConfig,
    input: R,
    mut output: W,
) -> Result<bool, CliError> {
    let config = apply_overrides(&cli, config)?;
    let options = config.store_options();
    let delimiter = config.delimiter;

    let (path, command) = match cli.command {
        CliCommand::Init { path, header } => {
            let store = TableStore::new(path, options);
            let header = Header::new(split_fields(&header, delimiter))?;
            let message = match store.ensure_exists(&header)? {
                EnsureOutcome::Created => format!(
                    "{} created with headers: {}",
                    store.path().display(),
                    header
                ),
                EnsureOutcome::AlreadyExists => {
                    format!("{} already exists.", store.path().display())
                }
            };
            writeln!(output, "{}", message)?;
            return Ok(true);
        }
        CliCommand::Shell { path } => {
            let mut shell = Shell::new(input, output, options);
            shell.run(path)?;
            return Ok(true);
        }
        CliCommand::Show { path, json: true } => {
            let table = TableStore::new(path, options).read_table()?;
            writeln!(output, "{}", serde_json::to_string(&table)?)?;
            return Ok(true);
        }
        CliCommand::Show { path, json: false } => (path, Command::Show),
        CliCommand::Append { path, fields } => (
            path,
            Command::Write {
                record: record(&fields, delimiter),
            },
        ),
        CliCommand::Update { path, old, new } => (
            path,
            Command::Update {
                old: record(&old, delimiter),
                new: record(&new, delimiter),
            },
        ),
        CliCommand::Delete { path, fields } => (
            path,
            Command::Delete {
                record: record(&fields, delimiter),
            },
        ),
    };

    let store = TableStore::new(path, options);
    let outcome = dispatch(&store, command)?;
    report(&mut output, store.path(), &outcome)?;
    Ok(outcome.is_success())
}

fn record(text: &str, delimiter: char) -> Record {
    Record::new(split_fields(text, delimiter))
}

fn report<W: Write>(output: &mut W, path: &Path, outcome: &Outcome) -> Result<(), CliError> {
    writeln!(output, "{}", outcome.render(path))?;
    Ok(())
}
