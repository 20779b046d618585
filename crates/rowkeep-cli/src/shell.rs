// ABOUTME: Prompt-driven session over any input/output pair, for terminals and piped scripts.
// ABOUTME: Asks for a path and header when needed, then loops over write/update/delete/show/exit.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use rowkeep_core::{Command, Header, Record, ValidationError};
use rowkeep_store::{StoreError, StoreOptions, TableStore};

use crate::app::CliError;
use crate::dispatch::{Outcome, dispatch, split_fields};

const OPERATION_PROMPT: &str = "Choose operation: write, update, delete, show, or exit: ";

/// An interactive session. End of input ends the session like `exit` does.
pub struct Shell<R, W> {
    input: R,
    output: W,
    options: StoreOptions,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, output: W, options: StoreOptions) -> Self {
        Self {
            input,
            output,
            options,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the session against `path`, prompting for it when `None`.
    pub fn run(&mut self, path: Option<PathBuf>) -> Result<(), CliError> {
        let path = match path {
            Some(path) => path,
            None => match self.prompt("Enter the path to the CSV file: ")? {
                Some(answer) => PathBuf::from(answer.trim()),
                None => return Ok(()),
            },
        };
        if path.as_os_str().is_empty() {
            return Err(CliError::EmptyPath);
        }
        let store = TableStore::new(path, self.options.clone());

        if !store.exists()? {
            let Some(answer) =
                self.prompt("Enter the headers for the CSV file (comma-separated): ")?
            else {
                return Ok(());
            };
            let header = Header::new(split_fields(&answer, self.options.delimiter))?;
            store.ensure_exists(&header)?;
            writeln!(
                self.output,
                "{} created with headers: {}",
                store.path().display(),
                header
            )?;
        } else {
            // Surfaces an empty or unreadable file before the first prompt.
            store.read_header()?;
        }

        loop {
            let Some(operation) = self.prompt(OPERATION_PROMPT)? else {
                break;
            };
            let command = match operation.trim().to_lowercase().as_str() {
                "write" => match self.record("Enter the record to write (comma-separated): ")? {
                    Some(record) => Command::Write { record },
                    None => break,
                },
                "update" => {
                    let Some(old) =
                        self.record("Enter the old record to update (comma-separated): ")?
                    else {
                        break;
                    };
                    let Some(new) = self.record("Enter the new record (comma-separated): ")?
                    else {
                        break;
                    };
                    Command::Update { old, new }
                }
                "delete" => match self.record("Enter the record to delete (comma-separated): ")? {
                    Some(record) => Command::Delete { record },
                    None => break,
                },
                "show" => Command::Show,
                "exit" => Command::Exit,
                _ => {
                    writeln!(
                        self.output,
                        "Invalid operation. Please choose 'write', 'update', 'delete', 'show', or 'exit'."
                    )?;
                    continue;
                }
            };

            match dispatch(&store, command) {
                Ok(Outcome::Exit) => {
                    writeln!(self.output, "{}", Outcome::Exit.render(store.path()))?;
                    break;
                }
                Ok(outcome) => writeln!(self.output, "{}", outcome.render(store.path()))?,
                Err(StoreError::Validation(ValidationError::ArityMismatch { .. })) => {
                    writeln!(
                        self.output,
                        "Error: Record length does not match headers length."
                    )?;
                }
                Err(e) => {
                    tracing::warn!("command failed on {}: {}", store.path().display(), e);
                    writeln!(self.output, "Error: {}", e)?;
                }
            }
        }

        Ok(())
    }

    /// Print `text` and read one line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>, CliError> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn record(&mut self, text: &str) -> Result<Option<Record>, CliError> {
        Ok(self
            .prompt(text)?
            .map(|line| Record::new(split_fields(&line, self.options.delimiter))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn session(input: &str, path: Option<PathBuf>) -> String {
        let mut shell = Shell::new(
            Cursor::new(input.to_string()),
            Vec::new(),
            StoreOptions::default(),
        );
        shell.run(path).unwrap();
        String::from_utf8(shell.into_output()).unwrap()
    }

    #[test]
    fn empty_path_is_rejected_before_touching_disk() {
        for (input, path) in [("\n", None), ("   \n", None), ("", Some(PathBuf::new()))] {
            let mut shell = Shell::new(Cursor::new(input), Vec::new(), StoreOptions::default());

            let err = shell.run(path).unwrap_err();

            assert!(matches!(err, CliError::EmptyPath));
        }
        assert!(!std::path::Path::new("table.lock").exists());
        assert!(!std::path::Path::new("table.tmp").exists());
    }

    #[test]
    fn new_table_is_created_from_prompted_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");

        let out = session("name, age\nwrite\nAnn, 30\nexit\n", Some(path.clone()));

        assert!(out.contains("created with headers: ['name', 'age']"));
        assert!(out.contains("Record ['Ann', '30'] added to"));
        assert!(out.ends_with("Exiting.\n"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nAnn,30\n");
    }

    #[test]
    fn path_is_prompted_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");

        let input = format!("{}\nid\nexit\n", path.display());
        let out = session(&input, None);

        assert!(out.starts_with("Enter the path to the CSV file: "));
        assert_eq!(fs::read_to_string(&path).unwrap(), "id\n");
    }

    #[test]
    fn arity_mismatch_is_reported_and_loop_continues() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "name,age\n").unwrap();

        let out = session("write\nAnn\nwrite\nBob, 41\n", Some(path.clone()));

        assert!(out.contains("Error: Record length does not match headers length."));
        assert_eq!(fs::read_to_string(&path).unwrap(), "name,age\nBob,41\n");
    }

    #[test]
    fn unknown_operation_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "name\n").unwrap();

        let out = session("WRITE\nAnn\nfrobnicate\nexit\n", Some(path.clone()));

        assert!(out.contains("Invalid operation."));
        assert!(out.contains("Record ['Ann'] added to"));
    }

    #[test]
    fn update_and_delete_report_outcomes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "name,age\nAnn,30\nBob,41\nAnn,30\n").unwrap();

        let out = session(
            "update\nAnn,30\nAnn,31\nupdate\nZed,1\nZed,2\ndelete\nAnn,30\nshow\n",
            Some(path.clone()),
        );

        assert!(out.contains("Record ['Ann', '30'] updated to ['Ann', '31'] in"));
        assert!(out.contains("Record ['Zed', '1'] not found in"));
        assert!(out.contains("(1 removed)."));
        assert!(out.contains("1: ['Ann', '31']\n2: ['Bob', '41']"));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "name,age\nAnn,31\nBob,41\n"
        );
    }

    #[test]
    fn empty_existing_file_fails_before_prompting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();

        let mut shell = Shell::new(Cursor::new("exit\n"), Vec::new(), StoreOptions::default());
        let err = shell.run(Some(path)).unwrap_err();
        assert!(matches!(err, CliError::Store(StoreError::MissingHeader(_))));
    }
}
