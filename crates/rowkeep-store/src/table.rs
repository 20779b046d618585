// ABOUTME: File-backed table store: header bootstrap, append, first-match update, all-match delete.
// ABOUTME: Every mutation validates arity first; rewrites go through an atomic temp-file rename.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use rowkeep_core::{
    DecodeError, Header, Record, RowReader, RowWriter, Table, ValidationError, encode_row,
    validate_record,
};
use thiserror::Error;

use crate::atomic::replace_file;
use crate::lock::TableLock;
use crate::options::{HeaderPolicy, StoreOptions};

/// Errors that can occur during table store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("decode error: {0}")]
    Decode(DecodeError),

    #[error("{0} has no header line")]
    MissingHeader(PathBuf),

    #[error("existing header {found} does not match requested header {expected}")]
    HeaderMismatch { expected: Header, found: Header },
}

impl From<DecodeError> for StoreError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io(e) => StoreError::Io(e),
            other => StoreError::Decode(other),
        }
    }
}

/// Result of `TableStore::ensure_exists`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    Created,
    AlreadyExists,
}

/// A delimited text table stored in a single file: line 1 is the header,
/// every following line is one record.
///
/// Update and delete read the whole file and rewrite it. The advisory lock
/// (when enabled) only serializes writers that also go through a store.
#[derive(Debug, Clone)]
pub struct TableStore {
    path: PathBuf,
    options: StoreOptions,
}

impl TableStore {
    /// Bind a store to `path`. Does not touch the filesystem.
    pub fn new(path: impl Into<PathBuf>, options: StoreOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Returns the path to the underlying table file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn exists(&self) -> Result<bool, StoreError> {
        Ok(self.path.try_exists()?)
    }

    /// Create the table with `header` as its only line if the file is missing.
    ///
    /// An existing file is left untouched. Under `HeaderPolicy::Strict` its
    /// header must equal `header`; under `Tolerate` it is not inspected.
    /// The parent directory is not created.
    pub fn ensure_exists(&self, header: &Header) -> Result<EnsureOutcome, StoreError> {
        let _lock = self.lock()?;

        if self.exists()? {
            if self.options.header_policy == HeaderPolicy::Strict {
                let found = self.read_header()?;
                if found != *header {
                    return Err(StoreError::HeaderMismatch {
                        expected: header.clone(),
                        found,
                    });
                }
            }
            tracing::debug!("table {} already exists", self.path.display());
            return Ok(EnsureOutcome::AlreadyExists);
        }

        let line = encode_row(header.fields(), self.options.delimiter);
        replace_file(&self.path, line.as_bytes(), self.options.sync)?;
        tracing::info!("created table {} with header {}", self.path.display(), header);
        Ok(EnsureOutcome::Created)
    }

    /// Decode only the first row of the file.
    pub fn read_header(&self) -> Result<Header, StoreError> {
        let file = File::open(&self.path)?;
        let mut rows = RowReader::new(BufReader::new(file), self.options.delimiter);
        match rows.next() {
            Some(row) => {
                let (_, fields) = row?;
                Ok(Header::new(fields)?)
            }
            None => Err(StoreError::MissingHeader(self.path.clone())),
        }
    }

    /// Read and validate the whole table. A data row whose arity differs
    /// from the header fails with `ValidationError::MalformedRow`.
    pub fn read_table(&self) -> Result<Table, StoreError> {
        let file = File::open(&self.path)?;
        let mut rows = RowReader::new(BufReader::new(file), self.options.delimiter);

        let header = match rows.next() {
            Some(row) => Header::new(row?.1)?,
            None => return Err(StoreError::MissingHeader(self.path.clone())),
        };

        let mut table = Table::new(header);
        for row in rows {
            let (line, fields) = row?;
            if fields.len() != table.header.arity() {
                return Err(ValidationError::MalformedRow {
                    line,
                    expected: table.header.arity(),
                    found: fields.len(),
                }
                .into());
            }
            table.records.push(Record::new(fields));
        }

        Ok(table)
    }

    /// Add `record` as the new last line. Existing content is never rewritten;
    /// only the header line is read, to check arity.
    pub fn append(&self, record: &Record) -> Result<(), StoreError> {
        let _lock = self.lock()?;

        let header = self.read_header()?;
        validate_record(record, &header)?;

        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        let mut line = String::new();
        if !ends_with_newline(&mut file)? {
            line.push('\n');
        }
        line.push_str(&encode_row(record.fields(), self.options.delimiter));
        file.write_all(line.as_bytes())?;
        if self.options.sync {
            file.sync_all()?;
        }

        tracing::info!("appended record {} to {}", record, self.path.display());
        Ok(())
    }

    /// Replace the first record equal to `old` with `new`, then rewrite the
    /// file. Later duplicates of `old` are left in place. Returns `false` and
    /// leaves the file byte-for-byte unchanged when nothing matches.
    pub fn update_first_match(&self, old: &Record, new: &Record) -> Result<bool, StoreError> {
        let _lock = self.lock()?;

        let mut table = self.read_table()?;
        validate_record(old, &table.header)?;
        validate_record(new, &table.header)?;

        if !table.replace_first(old, new.clone()) {
            tracing::debug!("no record {} in {}", old, self.path.display());
            return Ok(false);
        }

        self.rewrite(&table)?;
        tracing::info!("updated record {} to {} in {}", old, new, self.path.display());
        Ok(true)
    }

    /// Remove every record equal to `record` and rewrite the file. Returns the
    /// number removed; with zero matches the file is not rewritten.
    pub fn delete_all_matches(&self, record: &Record) -> Result<usize, StoreError> {
        let _lock = self.lock()?;

        let mut table = self.read_table()?;
        validate_record(record, &table.header)?;

        let removed = table.remove_all(record);
        if removed == 0 {
            tracing::debug!("no record {} in {}", record, self.path.display());
            return Ok(0);
        }

        self.rewrite(&table)?;
        tracing::info!(
            "deleted {} copies of record {} from {}",
            removed,
            record,
            self.path.display()
        );
        Ok(removed)
    }

    fn lock(&self) -> Result<Option<TableLock>, StoreError> {
        if !self.options.lock {
            return Ok(None);
        }
        Ok(Some(TableLock::acquire(&self.path)?))
    }

    fn rewrite(&self, table: &Table) -> Result<(), StoreError> {
        let mut writer = RowWriter::new(Vec::new(), self.options.delimiter);
        writer.write_row(table.header.fields())?;
        for record in &table.records {
            writer.write_row(record.fields())?;
        }
        replace_file(&self.path, &writer.into_inner(), self.options.sync)?;
        Ok(())
    }
}

// Empty files count as terminated; there is no previous line to glue onto.
fn ends_with_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
