use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::ExportError;

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let data = serde_json::to_vec_pretty(value)?;
    write_bytes_atomic(path, &data)
}

/// Replace `path` with `data` so readers see either the old file or the new
/// one, never a partial write.
///
/// The bytes land in a sibling `<name>.tmp` first; it is removed again if the
/// write fails before the rename.
pub fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<(), ExportError> {
    let staging = staging_path(path)?;
    let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir)?;
    }

    if let Err(err) = stage(&staging, data).and_then(|()| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(err.into());
    }
    if let Some(dir) = dir {
        sync_dir(dir)?;
    }
    Ok(())
}

fn stage(staging: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(staging)?;
    file.write_all(data)?;
    file.sync_all()
}

fn staging_path(path: &Path) -> Result<PathBuf, ExportError> {
    let name = path.file_name().ok_or_else(|| {
        ExportError::Invalid(format!("{} does not name a file", path.display()))
    })?;
    let mut staged = name.to_os_string();
    staged.push(".tmp");
    Ok(path.with_file_name(staged))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file_and_leaves_no_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("batch.json");
        write_bytes_atomic(&path, b"first").expect("first write");
        write_json_atomic(&path, &vec!["8001015009087"]).expect("second write");

        let content = fs::read_to_string(&path).expect("read");
        assert!(content.contains("8001015009087"));
        assert!(!dir.path().join("nested").join("batch.json.tmp").exists());
    }

    #[test]
    fn rejects_paths_without_a_file_name() {
        let err = write_bytes_atomic(Path::new("/"), b"x").expect_err("no file name");
        assert!(matches!(err, ExportError::Invalid(_)));
    }

    #[test]
    fn failed_rename_removes_staging_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A non-empty directory cannot be replaced by a file.
        let target = dir.path().join("occupied");
        fs::create_dir_all(target.join("child")).expect("dirs");

        let err = write_bytes_atomic(&target, b"data").expect_err("rename onto a directory");
        assert!(matches!(err, ExportError::Io(_)));
        assert!(!dir.path().join("occupied.tmp").exists());
    }
}
