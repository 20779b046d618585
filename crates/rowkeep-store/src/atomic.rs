// ABOUTME: Whole-file replacement via temp file, fsync, and rename.
// ABOUTME: Readers see either the old table or the new one, never a partial write.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Sibling temp path used while rewriting `path`, e.g. `people.csv.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("table"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_temp(tmp_path: &Path, contents: &[u8], sync: bool) -> io::Result<()> {
    let mut tmp_file = File::create(tmp_path)?;
    tmp_file.write_all(contents)?;
    if sync {
        tmp_file.sync_all()?;
    }
    Ok(())
}

/// Resolve `path` through any symlinks so the rename lands on the real file.
/// A path that does not exist yet is used as given.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}

/// Permissions of the file being replaced, if it is a regular file.
fn existing_permissions(target: &Path) -> io::Result<Option<fs::Permissions>> {
    match fs::metadata(target) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.permissions())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replace the contents of `path` with `contents`.
///
/// Writes to a sibling `.tmp` file, optionally fsyncs it, then renames it over
/// the original. A symlinked `path` is followed, so the file it points at is
/// replaced and the link survives. The replaced file's permissions carry over
/// to the new one. When `sync` is set the parent directory is fsynced as well
/// so the rename itself survives a crash. On any error before or during the
/// rename the original file is untouched and the temp file is removed.
pub fn replace_file(path: &Path, contents: &[u8], sync: bool) -> io::Result<()> {
    let target = resolve_target(path)?;
    let permissions = existing_permissions(&target)?;
    let tmp_path = temp_path(&target);

    let staged = write_temp(&tmp_path, contents, sync).and_then(|()| match permissions {
        Some(perms) => fs::set_permissions(&tmp_path, perms),
        None => Ok(()),
    });
    if let Err(e) = staged.and_then(|()| fs::rename(&tmp_path, &target)) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    // Best-effort: the rename already happened, so a failed directory fsync
    // does not leave the table inconsistent.
    if sync && let Some(parent) = target.parent() {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn replaces_existing_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        fs::write(&path, "old\n").unwrap();

        replace_file(&path, b"new\n", true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
        assert!(!dir.path().join("people.csv.tmp").exists());
    }

    #[test]
    fn creates_file_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fresh.csv");

        replace_file(&path, b"a,b\n", false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("t.csv");

        let err = replace_file(&path, b"x\n", true).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        fs::create_dir(&path).unwrap();

        assert!(replace_file(&path, b"x\n", false).is_err());

        assert!(path.is_dir());
        assert!(!dir.path().join("people.csv.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_target_is_written_through() {
        use std::os::unix::fs::symlink;

        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.csv");
        let link = dir.path().join("link.csv");
        fs::write(&real, "old\n").unwrap();
        symlink(&real, &link).unwrap();

        replace_file(&link, b"new\n", true).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "new\n");
        assert!(!dir.path().join("real.csv.tmp").exists());
        assert!(!dir.path().join("link.csv.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn permissions_survive_replacement() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secret.csv");
        fs::write(&path, "old\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        replace_file(&path, b"new\n", false).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/data/people.csv")),
            PathBuf::from("/data/people.csv.tmp")
        );
    }
}
