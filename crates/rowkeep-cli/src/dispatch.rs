// ABOUTME: Routes Commands to the table store and turns results into reportable outcomes.
// ABOUTME: Also holds the input rule for turning comma-separated text into trimmed fields.

use std::path::Path;

use rowkeep_core::{Command, Record, Table};
use rowkeep_store::{StoreError, TableStore};

/// Split user text into fields: trim the whole input, split on `delimiter`,
/// trim each piece. Embedded delimiters cannot be expressed this way.
pub fn split_fields(text: &str, delimiter: char) -> Vec<String> {
    text.trim()
        .split(delimiter)
        .map(|field| field.trim().to_string())
        .collect()
}

/// The result of applying one command, ready to be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Written { record: Record },
    Updated { old: Record, new: Record },
    NotFound { record: Record },
    Deleted { record: Record, removed: usize },
    Table(Table),
    Exit,
}

impl Outcome {
    /// Whether the command found what it was looking for.
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::NotFound { .. })
    }

    /// Human-readable report for a table at `path`.
    pub fn render(&self, path: &Path) -> String {
        let path = path.display();
        match self {
            Outcome::Written { record } => format!("Record {} added to {}.", record, path),
            Outcome::Updated { old, new } => {
                format!("Record {} updated to {} in {}.", old, new, path)
            }
            Outcome::NotFound { record } => format!("Record {} not found in {}.", record, path),
            Outcome::Deleted { record, removed } => format!(
                "Record {} deleted from {} ({} removed).",
                record, path, removed
            ),
            Outcome::Table(table) => {
                let mut out = table.header.to_string();
                for (i, record) in table.records.iter().enumerate() {
                    out.push_str(&format!("\n{}: {}", i + 1, record));
                }
                out
            }
            Outcome::Exit => "Exiting.".to_string(),
        }
    }
}

/// Apply `command` to `store`. A missed update or delete is a normal
/// `Outcome::NotFound`, not an error.
pub fn dispatch(store: &TableStore, command: Command) -> Result<Outcome, StoreError> {
    tracing::debug!(
        mutation = command.is_mutation(),
        "dispatching {:?} on {}",
        command,
        store.path().display()
    );

    match command {
        Command::Write { record } => {
            store.append(&record)?;
            Ok(Outcome::Written { record })
        }
        Command::Update { old, new } => {
            if store.update_first_match(&old, &new)? {
                Ok(Outcome::Updated { old, new })
            } else {
                Ok(Outcome::NotFound { record: old })
            }
        }
        Command::Delete { record } => match store.delete_all_matches(&record)? {
            0 => Ok(Outcome::NotFound { record }),
            removed => Ok(Outcome::Deleted { record, removed }),
        },
        Command::Show => Ok(Outcome::Table(store.read_table()?)),
        Command::Exit => Ok(Outcome::Exit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkeep_core::Header;
    use rowkeep_store::StoreOptions;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> TableStore {
        let store = TableStore::new(dir.path().join("people.csv"), StoreOptions::default());
        store
            .ensure_exists(&Header::new(split_fields("name, age", ',')).unwrap())
            .unwrap();
        store
    }

    #[test]
    fn split_fields_trims_input_and_each_field() {
        assert_eq!(split_fields("  Ann ,  30 ", ','), vec!["Ann", "30"]);
        assert_eq!(split_fields("a,,b", ','), vec!["a", "", "b"]);
        assert_eq!(split_fields("", ','), vec![""]);
        assert_eq!(split_fields("a; b", ';'), vec!["a", "b"]);
    }

    #[test]
    fn write_then_show() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let outcome = dispatch(
            &store,
            Command::Write {
                record: Record::from(["Ann", "30"]),
            },
        )
        .unwrap();
        assert_eq!(
            outcome.render(Path::new("people.csv")),
            "Record ['Ann', '30'] added to people.csv."
        );

        let shown = dispatch(&store, Command::Show).unwrap();
        assert_eq!(
            shown.render(Path::new("people.csv")),
            "['name', 'age']\n1: ['Ann', '30']"
        );
    }

    #[test]
    fn missed_update_and_delete_are_not_found() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let ghost = Record::from(["Zed", "1"]);

        let updated = dispatch(
            &store,
            Command::Update {
                old: ghost.clone(),
                new: Record::from(["Zed", "2"]),
            },
        )
        .unwrap();
        let deleted = dispatch(
            &store,
            Command::Delete {
                record: ghost.clone(),
            },
        )
        .unwrap();

        assert_eq!(updated, Outcome::NotFound { record: ghost.clone() });
        assert_eq!(deleted, Outcome::NotFound { record: ghost });
        assert!(!updated.is_success());
    }

    #[test]
    fn delete_reports_count() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let ann = Record::from(["Ann", "30"]);
        store.append(&ann).unwrap();
        store.append(&ann).unwrap();

        let outcome = dispatch(&store, Command::Delete { record: ann.clone() }).unwrap();

        assert_eq!(
            outcome,
            Outcome::Deleted {
                record: ann,
                removed: 2
            }
        );
        assert!(outcome.render(Path::new("p.csv")).ends_with("(2 removed)."));
    }

    #[test]
    fn arity_errors_propagate() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let err = dispatch(
            &store,
            Command::Write {
                record: Record::from(["only-one"]),
            },
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
