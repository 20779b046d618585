// ABOUTME: Defines Header, Record, and Table, the in-memory shape of a delimited text table.
// ABOUTME: A header fixes the table's arity; records are opaque text compared field by field.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;

/// The ordered field names of a table. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Header(Vec<String>);

impl Header {
    /// Build a header from field names. Rejects an empty list, since a table
    /// with zero columns has no valid serialization.
    pub fn new(fields: Vec<String>) -> Result<Self, ValidationError> {
        if fields.is_empty() {
            return Err(ValidationError::EmptyHeader);
        }
        Ok(Self(fields))
    }

    /// Number of fields every record of this table must carry.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.0)
    }
}

/// One data row. Two records are equal iff their fields are equal
/// element-wise, in order, with no normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Vec<String>);

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        Self(fields)
    }
}

impl<const N: usize> From<[&str; N]> for Record {
    fn from(fields: [&str; N]) -> Self {
        Self(fields.iter().map(|f| f.to_string()).collect())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, &self.0)
    }
}

/// A header plus its records in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub header: Header,
    pub records: Vec<Record>,
}

impl Table {
    /// Create an empty table with the given header.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            records: Vec::new(),
        }
    }

    /// Replace the first record equal to `old` with `new`. Later duplicates
    /// are left alone. Returns whether a replacement happened.
    pub fn replace_first(&mut self, old: &Record, new: Record) -> bool {
        match self.records.iter_mut().find(|r| *r == old) {
            Some(slot) => {
                *slot = new;
                true
            }
            None => false,
        }
    }

    /// Remove every record equal to `target` and return how many were removed.
    pub fn remove_all(&mut self, target: &Record) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r != target);
        before - self.records.len()
    }
}

// Renders as ['a', 'b'] so messages read the same for headers and records.
fn write_list(f: &mut fmt::Formatter<'_>, fields: &[String]) -> fmt::Result {
    write!(f, "[")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "'{}'", field)?;
    }
    write!(f, "]")
}
