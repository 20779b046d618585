// ABOUTME: Arity validation shared by every mutating table operation.
// ABOUTME: Rejects records whose field count differs from the table header before any write happens.

use thiserror::Error;

use crate::model::{Header, Record};

/// Shape violations in headers, records, or rows read back from disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("header must contain at least one field")]
    EmptyHeader,

    #[error("record has {found} fields but the header has {expected}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("line {line}: row has {found} fields but the header has {expected}")]
    MalformedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Check that `record` carries exactly one value per header field.
pub fn validate_record(record: &Record, header: &Header) -> Result<(), ValidationError> {
    if record.arity() != header.arity() {
        return Err(ValidationError::ArityMismatch {
            expected: header.arity(),
            found: record.arity(),
        });
    }
    Ok(())
}
