// ABOUTME: Command-line front end for rowkeep: configuration, arguments, dispatch, and shell.
// ABOUTME: Turns user input into table commands and reports their outcomes.

pub mod app;
pub mod args;
pub mod config;
pub mod dispatch;
pub mod shell;

pub use app::{CliError, apply_overrides, run};
pub use args::{Cli, CliCommand};
pub use config::{ConfigError, RowkeepConfig};
pub use dispatch::{Outcome, dispatch, split_fields};
pub use shell::Shell;
