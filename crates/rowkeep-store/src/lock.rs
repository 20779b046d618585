// ABOUTME: Cross-process advisory lock held for the duration of a table mutation.
// ABOUTME: Locks a sidecar `<file>.lock` since the table itself is replaced by rename.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;

/// Exclusive advisory lock on a table. Released on drop.
///
/// Only cooperating writers are serialized; a process that never takes the
/// lock can still race a read-modify-write cycle.
#[derive(Debug)]
pub struct TableLock {
    file: File,
    path: PathBuf,
}

impl TableLock {
    /// Sidecar lock path for a table, e.g. `people.csv.lock`.
    pub fn path_for(table_path: &Path) -> PathBuf {
        let mut name = table_path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("table"));
        name.push(".lock");
        table_path.with_file_name(name)
    }

    /// Block until the exclusive lock for `table_path` is held.
    pub fn acquire(table_path: &Path) -> io::Result<Self> {
        let path = Self::path_for(table_path);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        FileExt::lock_exclusive(&file)?;
        tracing::debug!("acquired table lock {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TableLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!("failed to release table lock {}: {}", self.path.display(), e);
        }
    }
}
