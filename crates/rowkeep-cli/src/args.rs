// ABOUTME: Command-line argument definitions for the rowkeep binary, using clap derive.
// ABOUTME: One subcommand per table operation plus an interactive shell.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// rowkeep - keep records in a header-first delimited text file
#[derive(Parser, Debug)]
#[command(name = "rowkeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Field delimiter, overriding ROWKEEP_DELIMITER (`tab` for a tab)
    #[arg(long, global = true)]
    pub delimiter: Option<String>,

    /// Fail when an existing file's header differs from --header
    #[arg(long, global = true)]
    pub strict_header: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Create the table file with a header if it does not exist
    Init {
        path: PathBuf,
        /// Comma-separated field names
        #[arg(long)]
        header: String,
    },

    /// Append one record
    Append {
        path: PathBuf,
        /// Comma-separated field values
        fields: String,
    },

    /// Replace the first record equal to --old with --new
    Update {
        path: PathBuf,
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },

    /// Delete every record equal to the given one
    Delete { path: PathBuf, fields: String },

    /// Print the header and all records
    Show {
        path: PathBuf,
        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prompt for operations interactively (or from piped input)
    Shell { path: Option<PathBuf> },
}
