// ABOUTME: Defines the Command enum representing every request a front end can make of a table.
// ABOUTME: Commands are transport-neutral; prompts, CLI arguments, or JSON can all produce them.

use serde::{Deserialize, Serialize};

use crate::model::Record;

/// A request against a single table. Commands carry already-split field
/// lists; arity is checked by the store when the command is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    Write { record: Record },
    Update { old: Record, new: Record },
    Delete { record: Record },
    Show,
    Exit,
}

impl Command {
    /// Whether applying this command may change the table file.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Write { .. } | Command::Update { .. } | Command::Delete { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_json_uses_type_tag() {
        let cmd = Command::Update {
            old: Record::from(["Ann", "30"]),
            new: Record::from(["Ann", "31"]),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "Update");
        assert_eq!(json["old"], serde_json::json!(["Ann", "30"]));

        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn unit_commands_parse_from_json() {
        let cmd: Command = serde_json::from_str(r#"{"type":"Exit"}"#).unwrap();
        assert_eq!(cmd, Command::Exit);
    }

    #[test]
    fn only_write_update_delete_mutate() {
        assert!(
            Command::Delete {
                record: Record::from(["x"])
            }
            .is_mutation()
        );
        assert!(!Command::Show.is_mutation());
        assert!(!Command::Exit.is_mutation());
    }
}
