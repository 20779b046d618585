// ABOUTME: Core library for rowkeep, containing the table model, validation, and codec.
// ABOUTME: This crate defines the shared types used by the store and the command-line front end.

pub mod codec;
pub mod command;
pub mod model;
pub mod validate;

pub use codec::{DEFAULT_DELIMITER, DecodeError, RowReader, RowWriter, encode_row};
pub use command::Command;
pub use model::{Header, Record, Table};
pub use validate::{ValidationError, validate_record};
