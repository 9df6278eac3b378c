use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("directory missing or not writable: {0}")]
    Dir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure a directory exists; create if missing.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::Dir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::Dir(format!("{} is not a directory", dir.display())));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::Dir(e.to_string()))?;
    }
    Ok(())
}

/// Copy `path` to `path.bak` unless that backup already exists.
///
/// Returns the backup path when a copy was made.
pub fn backup_once(path: &Path) -> Result<Option<PathBuf>, PersistError> {
    let mut backup = OsString::from(path.as_os_str());
    backup.push(".bak");
    let backup = PathBuf::from(backup);

    if !path.exists() || backup.exists() {
        return Ok(None);
    }
    fs::copy(path, &backup)?;
    Ok(Some(backup))
}

/// Atomically replace a file by writing a sibling temp file then renaming it.
pub struct AtomicFileWriter {
    target: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }

    pub fn write(&self, content: &[u8]) -> Result<PathBuf, PersistError> {
        self.stage(content)?.commit()
    }

    /// Write `content` next to the target without touching the target yet.
    ///
    /// Dropping the returned [`StagedFile`] without committing deletes it.
    pub fn stage(&self, content: &[u8]) -> Result<StagedFile, PersistError> {
        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_dir(&dir)?;

        // Same directory as the target so the final rename never crosses filesystems.
        let mut tmp = tempfile::Builder::new()
            .prefix(".poster-")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        Ok(StagedFile {
            tmp,
            target: self.target.clone(),
        })
    }
}

/// Fully written temp file waiting to replace its target.
pub struct StagedFile {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    pub fn commit(self) -> Result<PathBuf, PersistError> {
        self.tmp
            .persist(&self.target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(self.target)
    }
}
